//! Integration tests for the drawdown simulation engine
//!
//! Tests are organized by topic:
//! - `depletion` - Month-by-month value evolution, depletion and closed forms
//! - `cash_flows` - Bonus withdrawals, contributions and inflation indexing
//! - `rebalancing` - Rebalance frequency and transaction costs inside trials
//! - `monte_carlo` - Determinism, progress, cancellation and studies

mod cash_flows;

use crate::cash_flow::CashFlowSchedule;
use crate::config::{SimulationConfig, SimulationPlan};
use crate::model::{AssetStats, AssetUniverse, EconomicScenario, PortfolioAllocation};
use crate::rebalance::RebalanceStrategy;

/// Config with the given capital, horizon, trials and flat monthly withdrawal
fn config(
    capital: f64,
    withdrawal: f64,
    horizon_months: usize,
    num_trials: usize,
) -> SimulationConfig {
    SimulationConfig {
        initial_capital: capital,
        horizon_months,
        num_trials,
        seed: 42,
        cash_flows: CashFlowSchedule {
            monthly_withdrawal: withdrawal,
            ..Default::default()
        },
        start_date: None,
    }
}

/// Plan holding 100% of a single asset
fn single_asset_plan(config: SimulationConfig, mean: f64, volatility: f64) -> SimulationPlan {
    let universe = AssetUniverse::new().with_asset("fund", AssetStats::new(mean, volatility));
    let allocation =
        PortfolioAllocation::new("all-in", [("fund", 1.0)], RebalanceStrategy::ANNUAL).unwrap();
    SimulationPlan::new(config, allocation, &universe, EconomicScenario::new("base")).unwrap()
}

/// Two-asset universe with stocks outgrowing bonds deterministically
fn drifting_universe() -> AssetUniverse {
    AssetUniverse::new()
        .with_asset("stocks", AssetStats::new(0.08, 0.0))
        .with_asset("bonds", AssetStats::new(0.02, 0.0))
}

fn sixty_forty(rebalance: RebalanceStrategy) -> PortfolioAllocation {
    PortfolioAllocation::new("60/40", [("stocks", 0.6), ("bonds", 0.4)], rebalance).unwrap()
}
