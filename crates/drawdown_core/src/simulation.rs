use rand::SeedableRng;
use rand::rngs::SmallRng;
#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info};

use crate::config::{SimulationPlan, Study};
use crate::error::SimulationError;
use crate::model::{MonteCarloProgress, MonteCarloResult, TrialResult};
use crate::rebalance::RebalanceContext;
use crate::simulation_state::TrialState;

const MAX_BATCH_SIZE: usize = 100;

/// Seed used by a given trial of a run
#[must_use]
pub fn trial_seed(base_seed: u64, trial: usize) -> u64 {
    base_seed.wrapping_add(trial as u64)
}

/// Run one trial over the plan's horizon.
///
/// Each month: draw returns, apply them, add the contribution, take the
/// withdrawal, stop if the portfolio is exhausted, let the rebalance strategy
/// act, and record the value.
pub fn simulate_trial(plan: &SimulationPlan, trial: usize, seed: u64) -> TrialResult {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut state = TrialState::new(plan);

    let allocation = plan.allocation();
    let strategy = allocation.rebalance();
    let transaction_cost = plan.scenario().transaction_cost;
    let horizon = plan.config().horizon_months;

    let n = plan.returns().num_assets();
    let mut shocks = vec![0.0; n];
    let mut log_returns = vec![0.0; n];

    for month in 0..horizon {
        plan.returns()
            .sample_month(&mut rng, &mut shocks, &mut log_returns);
        state.holdings.apply_log_returns(&log_returns);

        let flow = plan.cash_flows().monthly_cashflow(month);
        if !state.apply_cash_flow(month, flow, allocation.weights()) {
            break;
        }

        state.months_since_rebalance += 1;
        let context = RebalanceContext {
            month_index: month,
            months_since_rebalance: state.months_since_rebalance,
            transaction_cost,
        };
        let outcome = strategy.maybe_rebalance(&state.holdings, allocation, &context);
        state.apply_rebalance(outcome);

        state.record();
    }

    state.into_result(trial, seed, horizon)
}

fn run_batch(
    plan: &SimulationPlan,
    batch: usize,
    progress: Option<&MonteCarloProgress>,
) -> Vec<TrialResult> {
    if progress.is_some_and(MonteCarloProgress::is_cancelled) {
        return Vec::new();
    }

    let num_trials = plan.config().num_trials;
    let base_seed = plan.config().seed;
    let start = batch * MAX_BATCH_SIZE;
    let end = (start + MAX_BATCH_SIZE).min(num_trials);

    let trials: Vec<TrialResult> = (start..end)
        .map(|trial| simulate_trial(plan, trial, trial_seed(base_seed, trial)))
        .collect();

    if let Some(progress) = progress {
        progress.add_completed(trials.len());
    }
    trials
}

/// Run every trial of a plan
pub fn monte_carlo_simulate(plan: &SimulationPlan) -> MonteCarloResult {
    let num_batches = plan.config().num_trials.div_ceil(MAX_BATCH_SIZE);

    #[cfg(feature = "parallel")]
    let trials: Vec<TrialResult> = (0..num_batches)
        .into_par_iter()
        .flat_map(|batch| run_batch(plan, batch, None))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let trials: Vec<TrialResult> = (0..num_batches)
        .flat_map(|batch| run_batch(plan, batch, None))
        .collect();

    into_result(plan, trials)
}

/// Run every trial of a plan, reporting completed trials and honouring
/// cancellation between batches
pub fn monte_carlo_simulate_with_progress(
    plan: &SimulationPlan,
    progress: &MonteCarloProgress,
) -> Result<MonteCarloResult, SimulationError> {
    let num_batches = plan.config().num_trials.div_ceil(MAX_BATCH_SIZE);

    #[cfg(feature = "parallel")]
    let trials: Vec<TrialResult> = (0..num_batches)
        .into_par_iter()
        .flat_map(|batch| run_batch(plan, batch, Some(progress)))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let trials: Vec<TrialResult> = (0..num_batches)
        .flat_map(|batch| run_batch(plan, batch, Some(progress)))
        .collect();

    if progress.is_cancelled() {
        return Err(SimulationError::Cancelled);
    }
    Ok(into_result(plan, trials))
}

fn into_result(plan: &SimulationPlan, trials: Vec<TrialResult>) -> MonteCarloResult {
    let config = plan.config();
    let result = MonteCarloResult {
        portfolio: plan.allocation().name().to_string(),
        scenario: plan.scenario().name.clone(),
        initial_capital: config.initial_capital,
        horizon_months: config.horizon_months,
        start_date: config.start_date,
        trials,
    };
    debug!(
        portfolio = %result.portfolio,
        scenario = %result.scenario,
        trials = result.num_trials(),
        survival_rate = result.survival_rate(),
        "simulated pair"
    );
    result
}

impl Study {
    /// Validate every pair, then simulate them in portfolio-major order.
    ///
    /// Configuration errors are reported before any trial runs.
    pub fn run(
        &self,
        progress: Option<&MonteCarloProgress>,
    ) -> Result<Vec<MonteCarloResult>, SimulationError> {
        let plans = self.plans()?;
        info!(
            pairs = plans.len(),
            trials = self.config.num_trials,
            horizon_months = self.config.horizon_months,
            "starting study"
        );

        plans
            .iter()
            .map(|plan| match progress {
                Some(progress) => monte_carlo_simulate_with_progress(plan, progress),
                None => Ok(monte_carlo_simulate(plan)),
            })
            .collect()
    }
}
