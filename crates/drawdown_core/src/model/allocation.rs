//! Target allocations and per-trial holdings

use serde::Serialize;

use super::ids::AssetId;
use crate::error::ConfigError;
use crate::rebalance::RebalanceStrategy;

/// Tolerance when checking that target weights sum to one
pub const WEIGHT_TOLERANCE: f64 = 1e-9;

/// A named portfolio: target weights per asset plus the rule used to return
/// to them.
///
/// Assets are kept sorted by id; `Holdings` vectors use the same order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioAllocation {
    name: String,
    assets: Vec<AssetId>,
    weights: Vec<f64>,
    rebalance: RebalanceStrategy,
}

impl PortfolioAllocation {
    /// Build and validate an allocation.
    ///
    /// Fails if the allocation is empty, any weight is negative or non-finite,
    /// an asset is listed twice, or the weights do not sum to 1 within
    /// `WEIGHT_TOLERANCE`.
    pub fn new<I, A>(
        name: impl Into<String>,
        weights: I,
        rebalance: RebalanceStrategy,
    ) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (A, f64)>,
        A: Into<AssetId>,
    {
        let name = name.into();
        let mut pairs: Vec<(AssetId, f64)> =
            weights.into_iter().map(|(a, w)| (a.into(), w)).collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));

        if pairs.is_empty() {
            return Err(ConfigError::EmptyAllocation { portfolio: name });
        }
        if let Some(pair) = pairs.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(ConfigError::DuplicateName {
                kind: "allocation asset",
                name: pair[0].0.to_string(),
            });
        }
        for (asset, weight) in &pairs {
            if !weight.is_finite() {
                return Err(ConfigError::NonFiniteWeight {
                    portfolio: name,
                    asset: asset.clone(),
                });
            }
            if *weight < 0.0 {
                return Err(ConfigError::NegativeWeight {
                    portfolio: name,
                    asset: asset.clone(),
                    weight: *weight,
                });
            }
        }

        let sum: f64 = pairs.iter().map(|(_, w)| w).sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ConfigError::WeightsDoNotSumToOne {
                portfolio: name,
                sum,
            });
        }

        rebalance.validate()?;

        let (assets, weights) = pairs.into_iter().unzip();
        Ok(Self {
            name,
            assets,
            weights,
            rebalance,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn assets(&self) -> &[AssetId] {
        &self.assets
    }

    /// Target weights in the order of `assets()`
    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    #[must_use]
    pub fn weight(&self, asset: &AssetId) -> Option<f64> {
        self.assets
            .iter()
            .position(|a| a == asset)
            .map(|i| self.weights[i])
    }

    #[must_use]
    pub fn rebalance(&self) -> RebalanceStrategy {
        self.rebalance
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AssetId, f64)> {
        self.assets.iter().zip(self.weights.iter().copied())
    }
}

/// Current value held in each asset of a portfolio, aligned with
/// `PortfolioAllocation::assets()`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holdings(Vec<f64>);

impl Holdings {
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        Holdings(values)
    }

    /// Split `capital` across assets by target weight
    #[must_use]
    pub fn from_allocation(allocation: &PortfolioAllocation, capital: f64) -> Self {
        Holdings(allocation.weights().iter().map(|w| capital * w).collect())
    }

    #[must_use]
    pub fn zeroed(len: usize) -> Self {
        Holdings(vec![0.0; len])
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Current weight of each asset; all zero when the portfolio is empty
    #[must_use]
    pub fn weights(&self) -> Vec<f64> {
        let total = self.total();
        if total > 0.0 {
            self.0.iter().map(|v| v / total).collect()
        } else {
            vec![0.0; self.0.len()]
        }
    }

    /// Multiply each log return into the matching holding
    pub fn apply_log_returns(&mut self, log_returns: &[f64]) {
        for (value, r) in self.0.iter_mut().zip(log_returns) {
            *value *= r.exp();
        }
    }

    /// Move the total to `new_total`, keeping current proportions.
    ///
    /// An empty portfolio takes the new total at `fallback_weights`.
    pub fn rescale(&mut self, new_total: f64, fallback_weights: &[f64]) {
        let total = self.total();
        if total > 0.0 {
            let factor = new_total / total;
            for value in &mut self.0 {
                *value *= factor;
            }
        } else {
            for (value, w) in self.0.iter_mut().zip(fallback_weights) {
                *value = new_total * w;
            }
        }
    }

    pub fn clear(&mut self) {
        self.0.iter_mut().for_each(|v| *v = 0.0);
    }
}
