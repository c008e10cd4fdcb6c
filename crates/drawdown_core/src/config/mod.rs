//! Run configuration
//!
//! `SimulationConfig` holds the parameters shared by every trial. A
//! `SimulationPlan` binds it to one portfolio and one economic scenario and is
//! only constructed once every input has been validated, so the engine never
//! sees an invalid allocation or non-finite statistics. A `Study` is the full
//! cross product of portfolios and scenarios.
//!
//! ```ignore
//! use drawdown_core::config::StudyBuilder;
//! use drawdown_core::model::{AssetStats, EconomicScenario};
//! use drawdown_core::rebalance::RebalanceStrategy;
//!
//! let study = StudyBuilder::new()
//!     .initial_capital(500_000.0)
//!     .horizon_months(120)
//!     .monthly_withdrawal(2_500.0)
//!     .asset("stocks", AssetStats::new(0.08, 0.16))
//!     .asset("bonds", AssetStats::new(0.03, 0.05))
//!     .portfolio("60/40", [("stocks", 0.6), ("bonds", 0.4)], RebalanceStrategy::ANNUAL)
//!     .scenario(EconomicScenario::new("base").inflation(0.02))
//!     .build()?;
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cash_flow::{CashFlowModel, CashFlowSchedule};
use crate::error::ConfigError;
use crate::model::{AssetId, AssetUniverse, EconomicScenario, PortfolioAllocation};
use crate::returns::ReturnModel;

pub mod builder;

pub use builder::StudyBuilder;

/// Longest accepted horizon (100 years)
pub const MAX_HORIZON_MONTHS: usize = 1_200;

fn default_horizon_months() -> usize {
    120
}

fn default_num_trials() -> usize {
    10_000
}

fn default_seed() -> u64 {
    42
}

/// Parameters shared by every (portfolio, scenario) pair of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub initial_capital: f64,

    #[serde(default = "default_horizon_months")]
    pub horizon_months: usize,

    #[serde(default = "default_num_trials")]
    pub num_trials: usize,

    /// Base seed; identical seeds reproduce identical results
    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default)]
    pub cash_flows: CashFlowSchedule,

    /// Calendar date of the first simulated month, used to label output rows
    #[serde(default)]
    pub start_date: Option<jiff::civil::Date>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_capital: 100_000.0,
            horizon_months: default_horizon_months(),
            num_trials: default_num_trials(),
            seed: default_seed(),
            cash_flows: CashFlowSchedule::default(),
            start_date: None,
        }
    }
}

impl SimulationConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return Err(ConfigError::parameter(
                "initial capital",
                "positive and finite",
                self.initial_capital,
            ));
        }
        if self.horizon_months == 0 {
            return Err(ConfigError::parameter("horizon", "at least one month", 0.0));
        }
        if self.horizon_months > MAX_HORIZON_MONTHS {
            return Err(ConfigError::parameter(
                "horizon",
                "at most 1200 months",
                self.horizon_months as f64,
            ));
        }
        if self.num_trials == 0 {
            return Err(ConfigError::parameter(
                "number of trials",
                "at least one",
                0.0,
            ));
        }
        self.cash_flows.validate()
    }

    /// Whether the first base withdrawal is larger than the initial capital
    /// plus the first contribution, before any returns
    #[must_use]
    pub fn withdrawal_exceeds_first_month_balance(&self) -> bool {
        self.cash_flows.monthly_withdrawal
            > self.initial_capital + self.cash_flows.monthly_contribution
    }

    // === Sweep helpers ===

    /// Copy of this config with a different base monthly withdrawal
    #[must_use]
    pub fn with_monthly_withdrawal(&self, amount: f64) -> Self {
        let mut config = self.clone();
        config.cash_flows.monthly_withdrawal = amount;
        config
    }

    /// Copy of this config with a different trial count
    #[must_use]
    pub fn with_num_trials(&self, num_trials: usize) -> Self {
        let mut config = self.clone();
        config.num_trials = num_trials;
        config
    }
}

/// Validated inputs for one (portfolio, scenario) pair
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    config: SimulationConfig,
    allocation: PortfolioAllocation,
    scenario: EconomicScenario,
    returns: ReturnModel,
    cash_flows: CashFlowModel,
}

impl SimulationPlan {
    /// Validate everything the engine depends on.
    ///
    /// `base` holds unadjusted statistics; the scenario adjustment is applied
    /// here. A portfolio holding `cash` without cash statistics gets
    /// `AssetStats::CASH_DEFAULT`.
    pub fn new(
        config: SimulationConfig,
        allocation: PortfolioAllocation,
        base: &AssetUniverse,
        scenario: EconomicScenario,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        scenario.validate()?;
        base.validate()?;

        let mut universe = base.clone();
        if allocation.assets().iter().any(AssetId::is_cash) && !universe.contains(&AssetId::cash())
        {
            debug!(
                portfolio = allocation.name(),
                "no statistics for cash, using default"
            );
            universe.ensure_cash();
        }

        if let Some(asset) = allocation.assets().iter().find(|a| !universe.contains(a)) {
            return Err(ConfigError::UnknownAsset {
                portfolio: allocation.name().to_string(),
                asset: asset.clone(),
            });
        }

        let adjusted = scenario.apply(&universe);
        adjusted.validate()?;
        let returns = ReturnModel::from_universe(&adjusted, allocation.assets())?;

        for asset in allocation.assets() {
            if let Some(stats) = adjusted.get(asset)
                && stats.volatility == 0.0
            {
                warn!(asset = %asset, scenario = %scenario.name, "asset has zero volatility");
            }
        }
        if config.withdrawal_exceeds_first_month_balance() {
            warn!(
                portfolio = allocation.name(),
                withdrawal = config.cash_flows.monthly_withdrawal,
                capital = config.initial_capital,
                contribution = config.cash_flows.monthly_contribution,
                "monthly withdrawal exceeds the initial capital plus contribution; \
                 trials are likely to deplete in the first month"
            );
        }

        let cash_flows = CashFlowModel::new(config.cash_flows.clone(), scenario.inflation_rate);

        Ok(Self {
            config,
            allocation,
            scenario,
            returns,
            cash_flows,
        })
    }

    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[must_use]
    pub fn allocation(&self) -> &PortfolioAllocation {
        &self.allocation
    }

    #[must_use]
    pub fn scenario(&self) -> &EconomicScenario {
        &self.scenario
    }

    #[must_use]
    pub fn returns(&self) -> &ReturnModel {
        &self.returns
    }

    #[must_use]
    pub fn cash_flows(&self) -> &CashFlowModel {
        &self.cash_flows
    }
}

/// Every portfolio crossed with every scenario
#[derive(Debug, Clone, PartialEq)]
pub struct Study {
    pub config: SimulationConfig,
    pub universe: AssetUniverse,
    pub portfolios: Vec<PortfolioAllocation>,
    pub scenarios: Vec<EconomicScenario>,
}

impl Study {
    /// Validate the study and build one plan per (portfolio, scenario) pair,
    /// portfolio-major.
    pub fn plans(&self) -> Result<Vec<SimulationPlan>, ConfigError> {
        if self.portfolios.is_empty() {
            return Err(ConfigError::MissingComponent("portfolio"));
        }
        if self.scenarios.is_empty() {
            return Err(ConfigError::MissingComponent("scenario"));
        }
        check_unique("portfolio", self.portfolios.iter().map(PortfolioAllocation::name))?;
        check_unique("scenario", self.scenarios.iter().map(|s| s.name.as_str()))?;

        let mut plans = Vec::with_capacity(self.portfolios.len() * self.scenarios.len());
        for portfolio in &self.portfolios {
            for scenario in &self.scenarios {
                plans.push(SimulationPlan::new(
                    self.config.clone(),
                    portfolio.clone(),
                    &self.universe,
                    scenario.clone(),
                )?);
            }
        }
        Ok(plans)
    }
}

fn check_unique<'a>(
    kind: &'static str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(ConfigError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}
