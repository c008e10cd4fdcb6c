//! Tests for cash flows inside trials
//!
//! These tests verify that:
//! - Bonus months withdraw base plus bonus
//! - Contributions are added before the withdrawal and are not indexed
//! - Inflation indexing grows withdrawals with the scenario's inflation rate

use super::config;
use crate::cash_flow::{BonusSchedule, BonusWithdrawal};
use crate::config::SimulationPlan;
use crate::model::{AssetStats, AssetUniverse, EconomicScenario, PortfolioAllocation};
use crate::rebalance::RebalanceStrategy;
use crate::simulation::monte_carlo_simulate;

fn flat_plan(config: crate::config::SimulationConfig, scenario: EconomicScenario) -> SimulationPlan {
    let universe = AssetUniverse::new().with_asset("cash", AssetStats::new(0.0, 0.0));
    let allocation =
        PortfolioAllocation::new("cash", [("cash", 1.0)], RebalanceStrategy::Never).unwrap();
    SimulationPlan::new(config, allocation, &universe, scenario).unwrap()
}

#[test]
fn test_semiannual_bonus_withdrawals() {
    let mut config = config(100_000.0, 1_000.0, 24, 1);
    config.cash_flows.bonus = Some(BonusWithdrawal {
        amount: 1_000.0,
        schedule: BonusSchedule::semiannual(),
    });
    let result = monte_carlo_simulate(&flat_plan(config, EconomicScenario::new("base")));
    let trial = &result.trials[0];

    // 24 base payments and 4 bonuses
    assert!((trial.total_withdrawals - 28_000.0).abs() < 1e-6);
    // end of month 5: five base payments; month 6 adds a bonus
    assert!((trial.values[4] - 95_000.0).abs() < 1e-6);
    assert!((trial.values[5] - 93_000.0).abs() < 1e-6);
    assert!((trial.values[6] - 92_000.0).abs() < 1e-6);
}

#[test]
fn test_fixed_bonus_withdrawals() {
    let mut config = config(10_000.0, 0.0, 12, 1);
    config.cash_flows.bonus = Some(BonusWithdrawal {
        amount: 2_500.0,
        schedule: BonusSchedule::Fixed { months: vec![3, 9] },
    });
    let result = monte_carlo_simulate(&flat_plan(config, EconomicScenario::new("base")));
    let values = &result.trials[0].values;

    assert!((values[1] - 10_000.0).abs() < 1e-9);
    assert!((values[2] - 7_500.0).abs() < 1e-9);
    assert!((values[11] - 5_000.0).abs() < 1e-9);
}

#[test]
fn test_contribution_offsets_withdrawal() {
    let mut config = config(100_000.0, 1_200.0, 120, 1);
    config.cash_flows.monthly_contribution = 1_200.0;
    let result = monte_carlo_simulate(&flat_plan(config, EconomicScenario::new("base")));
    let trial = &result.trials[0];

    assert!(trial.survived());
    assert!(trial.values.iter().all(|v| (*v - 100_000.0).abs() < 1e-6));
    assert!((trial.total_contributions - 144_000.0).abs() < 1e-6);
    assert!(trial.net_flow().abs() < 1e-6);
}

#[test]
fn test_negative_contribution_acts_as_fee() {
    let mut config = config(10_000.0, 0.0, 12, 1);
    config.cash_flows.monthly_contribution = -100.0;
    let result = monte_carlo_simulate(&flat_plan(config, EconomicScenario::new("base")));
    assert!((result.trials[0].final_value() - 8_800.0).abs() < 1e-9);
}

#[test]
fn test_inflation_indexed_withdrawals() {
    let mut indexed = config(100_000.0, 1_000.0, 24, 1);
    indexed.cash_flows.inflation_indexed = true;
    let unindexed = config(100_000.0, 1_000.0, 24, 1);
    let scenario = EconomicScenario::new("inflation").inflation(0.05);

    let indexed = monte_carlo_simulate(&flat_plan(indexed, scenario.clone()));
    let unindexed = monte_carlo_simulate(&flat_plan(unindexed, scenario));

    let expected: f64 = (0..24).map(|m| 1_000.0 * 1.05f64.powf(m as f64 / 12.0)).sum();
    assert!((indexed.trials[0].total_withdrawals - expected).abs() < 1e-6);
    assert!((unindexed.trials[0].total_withdrawals - 24_000.0).abs() < 1e-9);
    assert!(indexed.trials[0].final_value() < unindexed.trials[0].final_value());
}
