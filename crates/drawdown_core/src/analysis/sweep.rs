//! Withdrawal sensitivity sweep.
//!
//! Re-runs one (portfolio, scenario) pair at a range of base monthly
//! withdrawals with the same seed, so every point sees the same return paths.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{SimulationConfig, SimulationPlan};
use crate::error::SimulationError;
use crate::model::{AssetUniverse, EconomicScenario, MonteCarloProgress, PortfolioAllocation};
use crate::simulation::{monte_carlo_simulate, monte_carlo_simulate_with_progress};

/// Outcome at one withdrawal level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub monthly_withdrawal: f64,
    pub survival_rate: f64,
    pub median_final_value: f64,
    pub mean_months_survived: f64,
}

/// Evenly spaced withdrawal levels from `min` to `max` inclusive
#[must_use]
pub fn linspace(min: f64, max: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![min],
        n => (0..n)
            .map(|i| min + (max - min) * i as f64 / (n - 1) as f64)
            .collect(),
    }
}

/// Simulate the pair once per withdrawal level, in the order given.
///
/// All plans are validated before the first simulation runs.
pub fn withdrawal_sweep(
    config: &SimulationConfig,
    allocation: &PortfolioAllocation,
    universe: &AssetUniverse,
    scenario: &EconomicScenario,
    withdrawals: &[f64],
    progress: Option<&MonteCarloProgress>,
) -> Result<Vec<SweepPoint>, SimulationError> {
    let plans = withdrawals
        .iter()
        .map(|w| {
            SimulationPlan::new(
                config.with_monthly_withdrawal(*w),
                allocation.clone(),
                universe,
                scenario.clone(),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    plans
        .iter()
        .map(|plan| {
            let result = match progress {
                Some(progress) => monte_carlo_simulate_with_progress(plan, progress)?,
                None => monte_carlo_simulate(plan),
            };
            let summary = result.summary();
            let point = SweepPoint {
                monthly_withdrawal: plan.config().cash_flows.monthly_withdrawal,
                survival_rate: summary.survival_rate,
                median_final_value: summary.final_value.median,
                mean_months_survived: summary.mean_months_survived,
            };
            debug!(
                withdrawal = point.monthly_withdrawal,
                survival_rate = point.survival_rate,
                "sweep point"
            );
            Ok(point)
        })
        .collect()
}
