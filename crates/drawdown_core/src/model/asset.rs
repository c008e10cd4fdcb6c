//! Asset statistics and the universe of assets known to a run

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::correlation::CorrelationMatrix;
use super::ids::AssetId;
use crate::error::{ConfigError, StatsError};

/// Trading days used to annualise daily statistics
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Largest accepted annual mean log return, in either direction
pub const MAX_ANNUAL_MEAN_RETURN: f64 = 2.0;

/// Largest accepted annual volatility of log returns
pub const MAX_ANNUAL_VOLATILITY: f64 = 3.0;

/// Annualised return statistics of one asset class.
///
/// `mean_return` is the annual mean of log returns and `volatility` the annual
/// standard deviation of log returns. Monthly draws use `mean / 12` and
/// `volatility / sqrt(12)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetStats {
    pub mean_return: f64,
    pub volatility: f64,
}

impl AssetStats {
    /// Statistics assumed for `cash` when no data is supplied for it
    pub const CASH_DEFAULT: AssetStats = AssetStats {
        mean_return: 0.02,
        volatility: 0.001,
    };

    #[must_use]
    pub const fn new(mean_return: f64, volatility: f64) -> Self {
        Self {
            mean_return,
            volatility,
        }
    }

    #[must_use]
    pub fn monthly_mean(&self) -> f64 {
        self.mean_return / 12.0
    }

    #[must_use]
    pub fn monthly_volatility(&self) -> f64 {
        self.volatility / 12f64.sqrt()
    }

    pub fn validate(&self, asset: &AssetId) -> Result<(), ConfigError> {
        let invalid = |reason| ConfigError::InvalidAssetStats {
            asset: asset.clone(),
            mean: self.mean_return,
            volatility: self.volatility,
            reason,
        };
        if !self.mean_return.is_finite() {
            return Err(invalid("mean return must be finite"));
        }
        if !self.volatility.is_finite() {
            return Err(invalid("volatility must be finite"));
        }
        if self.volatility < 0.0 {
            return Err(invalid("volatility must be non-negative"));
        }
        // keeps compounded monthly draws far from f64 overflow
        if self.mean_return.abs() > MAX_ANNUAL_MEAN_RETURN {
            return Err(invalid("mean return must be within +/-2.0 per year"));
        }
        if self.volatility > MAX_ANNUAL_VOLATILITY {
            return Err(invalid("volatility must be at most 3.0 per year"));
        }
        Ok(())
    }

    /// Derive annualised statistics from a price series.
    ///
    /// Uses log returns between consecutive prices; the mean is scaled by
    /// `periods_per_year` and the sample standard deviation by its square root.
    pub fn from_prices(
        prices: &[f64],
        periods_per_year: f64,
    ) -> Result<PriceStatistics, StatsError> {
        if !(periods_per_year.is_finite() && periods_per_year > 0.0) {
            return Err(StatsError::InvalidPeriodsPerYear(periods_per_year));
        }
        if prices.len() < 2 {
            return Err(StatsError::TooFewObservations {
                count: prices.len(),
            });
        }
        if let Some((index, &price)) = prices
            .iter()
            .enumerate()
            .find(|(_, p)| !(p.is_finite() && **p > 0.0))
        {
            return Err(StatsError::InvalidPrice { index, price });
        }

        let log_returns: Vec<f64> = prices.windows(2).map(|w| (w[1] / w[0]).ln()).collect();
        let n = log_returns.len() as f64;
        let mean = log_returns.iter().sum::<f64>() / n;
        let variance = if log_returns.len() > 1 {
            log_returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0)
        } else {
            0.0
        };

        let stats = AssetStats::new(
            mean * periods_per_year,
            variance.sqrt() * periods_per_year.sqrt(),
        );
        let sharpe_ratio = if stats.volatility > 0.0 {
            stats.mean_return / stats.volatility
        } else {
            0.0
        };

        Ok(PriceStatistics {
            stats,
            sharpe_ratio,
            observations: log_returns.len(),
        })
    }
}

/// Statistics derived from a price series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceStatistics {
    pub stats: AssetStats,
    pub sharpe_ratio: f64,
    /// Number of returns the statistics were computed from
    pub observations: usize,
}

/// Every asset a run knows about, with an optional correlation structure.
///
/// Without a correlation matrix, monthly returns are drawn independently
/// across assets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetUniverse {
    assets: BTreeMap<AssetId, AssetStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    correlation: Option<CorrelationMatrix>,
}

impl AssetUniverse {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_asset(mut self, id: impl Into<AssetId>, stats: AssetStats) -> Self {
        self.insert(id, stats);
        self
    }

    #[must_use]
    pub fn with_correlation(mut self, correlation: CorrelationMatrix) -> Self {
        self.correlation = Some(correlation);
        self
    }

    pub fn insert(&mut self, id: impl Into<AssetId>, stats: AssetStats) -> Option<AssetStats> {
        self.assets.insert(id.into(), stats)
    }

    pub fn set_correlation(&mut self, correlation: Option<CorrelationMatrix>) {
        self.correlation = correlation;
    }

    #[must_use]
    pub fn get(&self, id: &AssetId) -> Option<&AssetStats> {
        self.assets.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &AssetId) -> bool {
        self.assets.contains_key(id)
    }

    #[must_use]
    pub fn correlation(&self) -> Option<&CorrelationMatrix> {
        self.correlation.as_ref()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AssetId, &AssetStats)> {
        self.assets.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Add the default cash statistics if `cash` is not already present
    pub fn ensure_cash(&mut self) {
        self.assets
            .entry(AssetId::cash())
            .or_insert(AssetStats::CASH_DEFAULT);
    }

    /// Apply `f` to every asset's statistics, keeping the correlation structure
    #[must_use]
    pub fn map_stats(&self, f: impl Fn(&AssetId, AssetStats) -> AssetStats) -> Self {
        Self {
            assets: self
                .assets
                .iter()
                .map(|(id, stats)| (id.clone(), f(id, *stats)))
                .collect(),
            correlation: self.correlation.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (id, stats) in &self.assets {
            stats.validate(id)?;
        }
        if let Some(correlation) = &self.correlation {
            correlation.validate()?;
        }
        Ok(())
    }
}
