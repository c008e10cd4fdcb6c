//! YAML run configuration
//!
//! `RunConfig` mirrors the settings file layout. It is deserialised as-is and
//! then converted into a validated `Study`; nothing here is read by the engine
//! directly.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{WrapErr, bail, eyre};
use serde::{Deserialize, Serialize};

use drawdown_core::cash_flow::{BonusSchedule, BonusWithdrawal, CashFlowSchedule};
use drawdown_core::config::{SimulationConfig, Study};
use drawdown_core::model::{
    AssetId, AssetStats, AssetUniverse, CorrelationMatrix, EconomicScenario, PortfolioAllocation,
    TRADING_DAYS_PER_YEAR,
};
use drawdown_core::rebalance::RebalanceStrategy;

fn default_output_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_seed() -> u64 {
    42
}

fn default_iterations() -> usize {
    10_000
}

fn default_bonus_cycle() -> u32 {
    12
}

fn default_threshold() -> f64 {
    0.05
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub project: ProjectConfig,
    #[serde(default)]
    pub withdrawals: WithdrawalConfig,
    #[serde(default)]
    pub contributions: ContributionConfig,
    #[serde(default)]
    pub withdrawal_changes: WithdrawalChangesConfig,
    #[serde(default)]
    pub simulation: SimulationSettings,
    pub assets: BTreeMap<String, AssetConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation: Option<CorrelationConfig>,
    pub portfolios: BTreeMap<String, PortfolioConfig>,
    pub economic_scenarios: BTreeMap<String, ScenarioConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<SensitivityConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub initial_capital: f64,
    /// Horizon in months; takes precedence over `simulation_horizon_years`
    #[serde(default)]
    pub horizon_months: Option<usize>,
    #[serde(default)]
    pub simulation_horizon_years: Option<usize>,
    #[serde(default = "default_seed")]
    pub random_seed: u64,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub start_date: Option<jiff::civil::Date>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalConfig {
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub inflation_adjustment: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContributionConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub periodic_contribution: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusScheduleKind {
    /// Months are positions within each cycle
    #[default]
    Recurring,
    /// Months are absolute months of the horizon
    Fixed,
}

/// Extra "13th/14th month" withdrawals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalChangesConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub thirteenth_payment_months: Vec<u32>,
    /// Defaults to the base withdrawal
    #[serde(default)]
    pub thirteenth_payment_amount: Option<f64>,
    #[serde(default)]
    pub schedule: BonusScheduleKind,
    #[serde(default = "default_bonus_cycle")]
    pub cycle_months: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    #[serde(default = "default_iterations")]
    pub montecarlo_iterations: usize,
    /// Overrides `withdrawals.inflation_adjustment` when set
    #[serde(default)]
    pub inflation_adjustment: Option<bool>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            montecarlo_iterations: default_iterations(),
            inflation_adjustment: None,
        }
    }
}

/// Either explicit annual statistics or a price series to derive them from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetConfig {
    #[serde(default)]
    pub mean_return: Option<f64>,
    #[serde(default, alias = "std_dev")]
    pub volatility: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prices: Vec<f64>,
    #[serde(default)]
    pub periods_per_year: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationConfig {
    pub assets: Vec<String>,
    pub matrix: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Monthly,
    Quarterly,
    Semiannual,
    Annual,
}

impl Frequency {
    #[must_use]
    pub fn months(self) -> u32 {
        match self {
            Frequency::Monthly => 1,
            Frequency::Quarterly => 3,
            Frequency::Semiannual => 6,
            Frequency::Annual => 12,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RebalanceConfig {
    /// Calendar rebalancing; `months` wins over `frequency`, default annual
    Time {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        frequency: Option<Frequency>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        months: Option<u32>,
    },
    Threshold {
        #[serde(default = "default_threshold")]
        threshold: f64,
    },
    Never,
}

impl Default for RebalanceConfig {
    fn default() -> Self {
        RebalanceConfig::Time {
            frequency: Some(Frequency::Annual),
            months: None,
        }
    }
}

impl RebalanceConfig {
    #[must_use]
    pub fn strategy(&self) -> RebalanceStrategy {
        match self {
            RebalanceConfig::Time { frequency, months } => RebalanceStrategy::Periodic {
                months: months.unwrap_or_else(|| frequency.unwrap_or(Frequency::Annual).months()),
            },
            RebalanceConfig::Threshold { threshold } => RebalanceStrategy::Threshold {
                threshold: *threshold,
            },
            RebalanceConfig::Never => RebalanceStrategy::Never,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioConfig {
    /// Display name; defaults to the map key
    #[serde(default)]
    pub name: Option<String>,
    pub allocation: BTreeMap<String, f64>,
    #[serde(default)]
    pub rebalance: RebalanceConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub inflation_rate: f64,
    #[serde(default)]
    pub transaction_cost: f64,
    #[serde(default)]
    pub return_shift: f64,
    #[serde(default)]
    pub volatility_scale: Option<f64>,
}

/// Withdrawal levels to sweep for every (portfolio, scenario) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityConfig {
    pub withdrawals: Vec<f64>,
    /// Trials per sweep point; defaults to the run's trial count
    #[serde(default)]
    pub trials: Option<usize>,
}

impl RunConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_saphyr::Error> {
        serde_saphyr::from_str(yaml)
    }

    pub fn load(path: &Path) -> color_eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml(&content)
            .wrap_err_with(|| format!("Failed to parse config {}", path.display()))
    }

    fn horizon_months(&self) -> color_eyre::Result<usize> {
        match (self.project.horizon_months, self.project.simulation_horizon_years) {
            (Some(months), _) => Ok(months),
            (None, Some(years)) => years
                .checked_mul(12)
                .ok_or_else(|| eyre!("simulation_horizon_years is too large: {years}")),
            (None, None) => bail!("project needs horizon_months or simulation_horizon_years"),
        }
    }

    fn cash_flows(&self) -> CashFlowSchedule {
        let changes = &self.withdrawal_changes;
        let bonus = (changes.enabled && !changes.thirteenth_payment_months.is_empty()).then(|| {
            let months = changes.thirteenth_payment_months.clone();
            BonusWithdrawal {
                amount: changes
                    .thirteenth_payment_amount
                    .unwrap_or(self.withdrawals.amount),
                schedule: match changes.schedule {
                    BonusScheduleKind::Recurring => BonusSchedule::Recurring {
                        months,
                        cycle: changes.cycle_months,
                    },
                    BonusScheduleKind::Fixed => BonusSchedule::Fixed { months },
                },
            }
        });

        CashFlowSchedule {
            monthly_withdrawal: self.withdrawals.amount,
            monthly_contribution: if self.contributions.enabled {
                self.contributions.periodic_contribution
            } else {
                0.0
            },
            bonus,
            inflation_indexed: self
                .simulation
                .inflation_adjustment
                .unwrap_or(self.withdrawals.inflation_adjustment),
        }
    }

    /// Run parameters shared by every pair
    pub fn simulation_config(&self) -> color_eyre::Result<SimulationConfig> {
        Ok(SimulationConfig {
            initial_capital: self.project.initial_capital,
            horizon_months: self.horizon_months()?,
            num_trials: self.simulation.montecarlo_iterations,
            seed: self.project.random_seed,
            cash_flows: self.cash_flows(),
            start_date: self.project.start_date,
        })
    }

    pub fn universe(&self) -> color_eyre::Result<AssetUniverse> {
        let mut universe = AssetUniverse::new();
        for (name, asset) in &self.assets {
            let stats = asset
                .stats()
                .wrap_err_with(|| format!("Invalid statistics for asset '{name}'"))?;
            universe.insert(name.as_str(), stats);
        }

        if let Some(correlation) = &self.correlation {
            let ids = correlation.assets.iter().map(AssetId::new).collect();
            let matrix = CorrelationMatrix::new(ids, correlation.matrix.clone())
                .wrap_err("Invalid correlation matrix")?;
            universe.set_correlation(Some(matrix));
        }
        Ok(universe)
    }

    pub fn portfolios(&self) -> color_eyre::Result<Vec<PortfolioAllocation>> {
        self.portfolios
            .iter()
            .map(|(key, portfolio)| {
                let name = portfolio.name.clone().unwrap_or_else(|| key.clone());
                PortfolioAllocation::new(
                    name,
                    portfolio.allocation.iter().map(|(a, w)| (a.as_str(), *w)),
                    portfolio.rebalance.strategy(),
                )
                .wrap_err_with(|| format!("Invalid portfolio '{key}'"))
            })
            .collect()
    }

    #[must_use]
    pub fn scenarios(&self) -> Vec<EconomicScenario> {
        self.economic_scenarios
            .iter()
            .map(|(name, s)| {
                let scenario = EconomicScenario::new(name.as_str())
                    .inflation(s.inflation_rate)
                    .transaction_cost(s.transaction_cost)
                    .return_shift(s.return_shift);
                match s.volatility_scale {
                    Some(scale) => scenario.volatility_scale(scale),
                    None => scenario,
                }
            })
            .collect()
    }

    /// Convert into a validated study; every pair is checked before returning
    pub fn to_study(&self) -> color_eyre::Result<Study> {
        let study = Study {
            config: self.simulation_config()?,
            universe: self.universe()?,
            portfolios: self.portfolios()?,
            scenarios: self.scenarios(),
        };
        study.plans().wrap_err("Invalid simulation configuration")?;
        Ok(study)
    }
}

impl AssetConfig {
    pub fn stats(&self) -> color_eyre::Result<AssetStats> {
        match (self.mean_return, self.volatility, self.prices.is_empty()) {
            (Some(mean), Some(volatility), true) => Ok(AssetStats::new(mean, volatility)),
            (None, None, false) => {
                let periods = self.periods_per_year.unwrap_or(TRADING_DAYS_PER_YEAR);
                let derived = AssetStats::from_prices(&self.prices, periods)?;
                tracing::debug!(
                    mean = derived.stats.mean_return,
                    volatility = derived.stats.volatility,
                    sharpe = derived.sharpe_ratio,
                    observations = derived.observations,
                    "derived asset statistics from prices"
                );
                Ok(derived.stats)
            }
            (_, _, false) => Err(eyre!(
                "give either mean_return and volatility or prices, not both"
            )),
            _ => Err(eyre!("needs both mean_return and volatility")),
        }
    }
}
