//! Retirement drawdown simulation library
//!
//! This crate provides a Monte Carlo engine for portfolio drawdown studies.
//! It supports:
//! - Multi-asset portfolios with target weights and a rebalance rule
//!   (periodic, drift threshold, or buy and hold) with transaction costs
//! - Monthly withdrawals, contributions and recurring or one-off bonus
//!   withdrawals, optionally indexed to inflation
//! - Normal monthly log returns, independent or correlated through a
//!   Cholesky factor
//! - Economic scenarios that shift returns, scale volatility and set inflation
//! - Survival rates, monthly percentile bands, final value statistics and
//!   scenario/portfolio comparison tables
//!
//! # Builder DSL
//!
//! ```ignore
//! use drawdown_core::config::StudyBuilder;
//! use drawdown_core::model::{AssetStats, EconomicScenario};
//! use drawdown_core::rebalance::RebalanceStrategy;
//!
//! let study = StudyBuilder::new()
//!     .initial_capital(100_000.0)
//!     .horizon_months(120)
//!     .monthly_withdrawal(1_200.0)
//!     .asset("stocks", AssetStats::new(0.07, 0.15))
//!     .asset("bonds", AssetStats::new(0.03, 0.05))
//!     .portfolio("60/40", [("stocks", 0.6), ("bonds", 0.4)], RebalanceStrategy::ANNUAL)
//!     .scenario(EconomicScenario::new("base").inflation(0.02))
//!     .build()?;
//!
//! for result in study.run(None)? {
//!     println!("{} / {}: {:.1}%", result.portfolio, result.scenario, result.survival_rate() * 100.0);
//! }
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod analysis;
pub mod cash_flow;
pub mod error;
pub mod rebalance;
pub mod returns;
pub mod simulation;
pub mod simulation_state;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use analysis::{
    ComparisonRow, MonteCarloSummary, MonthBand, TrialRow, compare_portfolios, compare_scenarios,
};
pub use config::{SimulationConfig, SimulationPlan, Study, StudyBuilder};
pub use error::{ConfigError, SimulationError, StatsError};
pub use model::{
    AssetId, AssetStats, AssetUniverse, EconomicScenario, MonteCarloProgress, MonteCarloResult,
    PortfolioAllocation, TrialResult, TrialStatus,
};
pub use rebalance::RebalanceStrategy;
pub use simulation::{monte_carlo_simulate, monte_carlo_simulate_with_progress, simulate_trial};
