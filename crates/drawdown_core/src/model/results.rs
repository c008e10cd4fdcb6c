//! Simulation results
//!
//! A `TrialResult` is the month-by-month path of one Monte Carlo trial plus
//! its running totals. A `MonteCarloResult` collects every trial of one
//! (portfolio, scenario) pair in trial order.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

/// How a trial ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrialStatus {
    Survived,
    /// Portfolio value reached zero in this 1-based month
    Depleted { month: usize },
}

impl TrialStatus {
    #[must_use]
    pub fn survived(&self) -> bool {
        matches!(self, TrialStatus::Survived)
    }

    #[must_use]
    pub fn depletion_month(&self) -> Option<usize> {
        match self {
            TrialStatus::Survived => None,
            TrialStatus::Depleted { month } => Some(*month),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub trial: usize,
    pub seed: u64,
    /// End-of-month portfolio value, one entry per month of the horizon.
    /// Months after depletion hold 0.
    pub values: Vec<f64>,
    pub status: TrialStatus,
    pub total_withdrawals: f64,
    pub total_contributions: f64,
    pub total_rebalance_costs: f64,
    pub rebalance_count: u32,
}

impl TrialResult {
    #[must_use]
    pub fn final_value(&self) -> f64 {
        self.values.last().copied().unwrap_or(0.0)
    }

    #[must_use]
    pub fn survived(&self) -> bool {
        self.status.survived()
    }

    /// Months completed with a positive balance
    #[must_use]
    pub fn months_survived(&self) -> usize {
        match self.status {
            TrialStatus::Survived => self.values.len(),
            TrialStatus::Depleted { month } => month - 1,
        }
    }

    /// Contributions minus withdrawals
    #[must_use]
    pub fn net_flow(&self) -> f64 {
        self.total_contributions - self.total_withdrawals
    }

    /// Change of the final value against the initial capital, ignoring the
    /// cash that flowed in or out along the way
    #[must_use]
    pub fn total_return(&self, initial_capital: f64) -> f64 {
        if initial_capital <= 0.0 {
            return 0.0;
        }
        (self.final_value() - initial_capital) / initial_capital
    }
}

/// All trials of one (portfolio, scenario) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    pub portfolio: String,
    pub scenario: String,
    pub initial_capital: f64,
    pub horizon_months: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<jiff::civil::Date>,
    pub trials: Vec<TrialResult>,
}

impl MonteCarloResult {
    #[must_use]
    pub fn num_trials(&self) -> usize {
        self.trials.len()
    }

    /// Fraction of trials that never depleted
    #[must_use]
    pub fn survival_rate(&self) -> f64 {
        if self.trials.is_empty() {
            return 0.0;
        }
        let survived = self.trials.iter().filter(|t| t.survived()).count();
        survived as f64 / self.trials.len() as f64
    }

    #[must_use]
    pub fn final_values(&self) -> Vec<f64> {
        self.trials.iter().map(TrialResult::final_value).collect()
    }
}

/// Shared progress and cancellation for a running simulation.
///
/// Clones share the same counters, so a UI thread can hold one copy while the
/// workers update another.
#[derive(Debug, Clone, Default)]
pub struct MonteCarloProgress {
    /// Completed trials
    completed: Arc<AtomicUsize>,
    /// Cancellation flag
    cancelled: Arc<AtomicBool>,
}

impl MonteCarloProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn add_completed(&self, trials: usize) {
        self.completed.fetch_add(trials, Ordering::Relaxed);
    }

    /// Request cancellation; running batches finish, no new ones start
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.completed.store(0, Ordering::Relaxed);
        self.cancelled.store(false, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trial(values: Vec<f64>, status: TrialStatus) -> TrialResult {
        TrialResult {
            trial: 0,
            seed: 0,
            values,
            status,
            total_withdrawals: 300.0,
            total_contributions: 100.0,
            total_rebalance_costs: 0.0,
            rebalance_count: 0,
        }
    }

    #[test]
    fn test_months_survived() {
        let survived = trial(vec![1.0, 2.0, 3.0], TrialStatus::Survived);
        assert_eq!(survived.months_survived(), 3);
        assert_eq!(survived.final_value(), 3.0);

        let depleted = trial(vec![1.0, 0.0, 0.0], TrialStatus::Depleted { month: 2 });
        assert_eq!(depleted.months_survived(), 1);
        assert_eq!(depleted.final_value(), 0.0);
        assert_eq!(depleted.status.depletion_month(), Some(2));
    }

    #[test]
    fn test_net_flow_and_return() {
        let t = trial(vec![1_000.0], TrialStatus::Survived);
        assert_eq!(t.net_flow(), -200.0);
        assert!((t.total_return(800.0) - 0.25).abs() < 1e-12);
        assert!((t.total_return(1_000.0)).abs() < 1e-12);
        assert_eq!(t.total_return(0.0), 0.0);
    }

    #[test]
    fn test_progress_is_shared() {
        let progress = MonteCarloProgress::new();
        let handle = progress.clone();
        handle.add_completed(100);
        handle.cancel();
        assert_eq!(progress.completed(), 100);
        assert!(progress.is_cancelled());

        progress.reset();
        assert_eq!(handle.completed(), 0);
        assert!(!handle.is_cancelled());
    }
}
