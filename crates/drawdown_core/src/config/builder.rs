//! Study Builder
//!
//! Fluent API for assembling a `Study` in code. Portfolios are resolved and
//! every (portfolio, scenario) pair is validated in `build`, so errors surface
//! in one place.
//!
//! # Example
//!
//! ```ignore
//! use drawdown_core::config::StudyBuilder;
//! use drawdown_core::cash_flow::BonusSchedule;
//! use drawdown_core::model::{AssetStats, EconomicScenario};
//! use drawdown_core::rebalance::RebalanceStrategy;
//!
//! let study = StudyBuilder::new()
//!     .start(2025, 1, 1)
//!     .years(10)
//!     .initial_capital(100_000.0)
//!     .monthly_withdrawal(1_200.0)
//!     .bonus(1_200.0, BonusSchedule::semiannual())
//!     .inflation_indexed(true)
//!
//!     .asset("stocks", AssetStats::new(0.07, 0.15))
//!     .asset("bonds", AssetStats::new(0.03, 0.05))
//!
//!     .portfolio("60/40", [("stocks", 0.6), ("bonds", 0.4)], RebalanceStrategy::ANNUAL)
//!     .scenario(EconomicScenario::new("base").inflation(0.02).transaction_cost(0.001))
//!     .build()?;
//! ```

use super::{SimulationConfig, Study};
use crate::cash_flow::{BonusSchedule, BonusWithdrawal};
use crate::error::ConfigError;
use crate::model::{
    AssetStats, AssetUniverse, CorrelationMatrix, EconomicScenario, PortfolioAllocation,
};
use crate::rebalance::RebalanceStrategy;

/// Builder for a `Study`
#[derive(Debug, Clone)]
pub struct StudyBuilder {
    config: SimulationConfig,
    universe: AssetUniverse,
    scenarios: Vec<EconomicScenario>,

    // Resolved during build
    pending_portfolios: Vec<PendingPortfolio>,
}

#[derive(Debug, Clone)]
struct PendingPortfolio {
    name: String,
    weights: Vec<(String, f64)>,
    rebalance: RebalanceStrategy,
}

impl Default for StudyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StudyBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: SimulationConfig::default(),
            universe: AssetUniverse::new(),
            scenarios: Vec::new(),
            pending_portfolios: Vec::new(),
        }
    }

    // =========================================================================
    // Run parameters
    // =========================================================================

    #[must_use]
    pub fn start_date(mut self, date: jiff::civil::Date) -> Self {
        self.config.start_date = Some(date);
        self
    }

    /// Set the date of the first simulated month from year, month, day
    #[must_use]
    pub fn start(self, year: i16, month: i8, day: i8) -> Self {
        self.start_date(jiff::civil::date(year, month, day))
    }

    #[must_use]
    pub fn initial_capital(mut self, capital: f64) -> Self {
        self.config.initial_capital = capital;
        self
    }

    #[must_use]
    pub fn horizon_months(mut self, months: usize) -> Self {
        self.config.horizon_months = months;
        self
    }

    #[must_use]
    pub fn years(self, years: usize) -> Self {
        self.horizon_months(years.saturating_mul(12))
    }

    #[must_use]
    pub fn trials(mut self, num_trials: usize) -> Self {
        self.config.num_trials = num_trials;
        self
    }

    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    // =========================================================================
    // Cash flows
    // =========================================================================

    #[must_use]
    pub fn monthly_withdrawal(mut self, amount: f64) -> Self {
        self.config.cash_flows.monthly_withdrawal = amount;
        self
    }

    #[must_use]
    pub fn monthly_contribution(mut self, amount: f64) -> Self {
        self.config.cash_flows.monthly_contribution = amount;
        self
    }

    #[must_use]
    pub fn bonus(mut self, amount: f64, schedule: BonusSchedule) -> Self {
        self.config.cash_flows.bonus = Some(BonusWithdrawal { amount, schedule });
        self
    }

    #[must_use]
    pub fn inflation_indexed(mut self, indexed: bool) -> Self {
        self.config.cash_flows.inflation_indexed = indexed;
        self
    }

    // =========================================================================
    // Market, portfolios and scenarios
    // =========================================================================

    #[must_use]
    pub fn asset(mut self, name: &str, stats: AssetStats) -> Self {
        self.universe.insert(name, stats);
        self
    }

    #[must_use]
    pub fn correlation(mut self, correlation: CorrelationMatrix) -> Self {
        self.universe.set_correlation(Some(correlation));
        self
    }

    #[must_use]
    pub fn portfolio<'a>(
        mut self,
        name: &str,
        weights: impl IntoIterator<Item = (&'a str, f64)>,
        rebalance: RebalanceStrategy,
    ) -> Self {
        self.pending_portfolios.push(PendingPortfolio {
            name: name.to_string(),
            weights: weights
                .into_iter()
                .map(|(asset, w)| (asset.to_string(), w))
                .collect(),
            rebalance,
        });
        self
    }

    #[must_use]
    pub fn scenario(mut self, scenario: EconomicScenario) -> Self {
        self.scenarios.push(scenario);
        self
    }

    /// Resolve portfolios and validate every pair.
    ///
    /// Without any scenario, a neutral `base` scenario is used.
    pub fn build(self) -> Result<Study, ConfigError> {
        let portfolios = self
            .pending_portfolios
            .into_iter()
            .map(|p| PortfolioAllocation::new(p.name, p.weights, p.rebalance))
            .collect::<Result<Vec<_>, _>>()?;

        let scenarios = if self.scenarios.is_empty() {
            vec![EconomicScenario::new("base")]
        } else {
            self.scenarios
        };

        let study = Study {
            config: self.config,
            universe: self.universe,
            portfolios,
            scenarios,
        };
        study.plans()?;
        Ok(study)
    }
}
