//! Economic scenarios: named adjustments of the base market assumptions

use serde::{Deserialize, Serialize};

use super::asset::{AssetStats, AssetUniverse};
use crate::error::ConfigError;

fn default_volatility_scale() -> f64 {
    1.0
}

/// A named economic regime.
///
/// `return_shift` is added to every asset's annual mean return and
/// `volatility_scale` multiplies every volatility. `inflation_rate` indexes
/// withdrawals and `transaction_cost` is charged on rebalanced turnover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicScenario {
    pub name: String,
    #[serde(default)]
    pub inflation_rate: f64,
    #[serde(default)]
    pub transaction_cost: f64,
    #[serde(default)]
    pub return_shift: f64,
    #[serde(default = "default_volatility_scale")]
    pub volatility_scale: f64,
}

impl EconomicScenario {
    /// Scenario that leaves the base statistics untouched and has no
    /// inflation or trading costs
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inflation_rate: 0.0,
            transaction_cost: 0.0,
            return_shift: 0.0,
            volatility_scale: default_volatility_scale(),
        }
    }

    #[must_use]
    pub fn inflation(mut self, rate: f64) -> Self {
        self.inflation_rate = rate;
        self
    }

    #[must_use]
    pub fn transaction_cost(mut self, rate: f64) -> Self {
        self.transaction_cost = rate;
        self
    }

    #[must_use]
    pub fn return_shift(mut self, shift: f64) -> Self {
        self.return_shift = shift;
        self
    }

    #[must_use]
    pub fn volatility_scale(mut self, scale: f64) -> Self {
        self.volatility_scale = scale;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |reason: &str| ConfigError::InvalidScenario {
            scenario: self.name.clone(),
            reason: reason.to_string(),
        };
        if !self.inflation_rate.is_finite() || self.inflation_rate <= -1.0 {
            return Err(fail("inflation rate must be finite and greater than -100%"));
        }
        if !self.transaction_cost.is_finite() || !(0.0..1.0).contains(&self.transaction_cost) {
            return Err(fail("transaction cost must lie in [0, 1)"));
        }
        if !self.return_shift.is_finite() {
            return Err(fail("return shift must be finite"));
        }
        if !self.volatility_scale.is_finite() || self.volatility_scale < 0.0 {
            return Err(fail("volatility scale must be finite and non-negative"));
        }
        Ok(())
    }

    /// Base statistics adjusted for this scenario
    #[must_use]
    pub fn apply(&self, base: &AssetUniverse) -> AssetUniverse {
        base.map_stats(|_, stats| {
            AssetStats::new(
                stats.mean_return + self.return_shift,
                stats.volatility * self.volatility_scale,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AssetId;

    #[test]
    fn test_apply_adjusts_every_asset() {
        let base = AssetUniverse::new()
            .with_asset("stocks", AssetStats::new(0.08, 0.16))
            .with_asset("bonds", AssetStats::new(0.03, 0.05));
        let pessimistic = EconomicScenario::new("pessimistic")
            .return_shift(-0.02)
            .volatility_scale(1.5);

        let adjusted = pessimistic.apply(&base);
        let stocks = adjusted.get(&AssetId::from("stocks")).unwrap();
        assert!((stocks.mean_return - 0.06).abs() < 1e-12);
        assert!((stocks.volatility - 0.24).abs() < 1e-12);
        let bonds = adjusted.get(&AssetId::from("bonds")).unwrap();
        assert!((bonds.mean_return - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_neutral_scenario_is_identity() {
        let base = AssetUniverse::new().with_asset("gold", AssetStats::new(0.05, 0.2));
        assert_eq!(EconomicScenario::new("base").apply(&base), base);
    }

    #[test]
    fn test_validate() {
        assert!(EconomicScenario::new("ok").inflation(0.03).transaction_cost(0.002).validate().is_ok());
        assert!(EconomicScenario::new("cost").transaction_cost(1.5).validate().is_err());
        assert!(EconomicScenario::new("vol").volatility_scale(-1.0).validate().is_err());
        assert!(EconomicScenario::new("infl").inflation(f64::NAN).validate().is_err());
    }
}
