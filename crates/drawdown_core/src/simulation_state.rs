use crate::cash_flow::MonthlyCashFlow;
use crate::config::SimulationPlan;
use crate::model::{Holdings, TrialResult, TrialStatus};
use crate::rebalance::RebalanceOutcome;

/// Runtime state of one trial, mutated month by month
#[derive(Debug, Clone)]
pub struct TrialState {
    pub holdings: Holdings,
    pub months_since_rebalance: u32,
    pub status: TrialStatus,
    pub history: TrialHistory,
    pub totals: TrialTotals,
}

/// End-of-month values recorded so far
#[derive(Debug, Clone, Default)]
pub struct TrialHistory {
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TrialTotals {
    pub withdrawals: f64,
    pub contributions: f64,
    pub rebalance_costs: f64,
    pub rebalance_count: u32,
}

impl TrialState {
    #[must_use]
    pub fn new(plan: &SimulationPlan) -> Self {
        let config = plan.config();
        Self {
            holdings: Holdings::from_allocation(plan.allocation(), config.initial_capital),
            months_since_rebalance: 0,
            status: TrialStatus::Survived,
            history: TrialHistory {
                values: Vec::with_capacity(config.horizon_months),
            },
            totals: TrialTotals::default(),
        }
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        self.holdings.total()
    }

    /// Apply the month's contribution and then its withdrawal.
    ///
    /// Returns `false` when the withdrawal exhausts the portfolio. The trial is
    /// then marked depleted in this month, only the balance actually available
    /// is counted as withdrawn, and a zero value is recorded for the month.
    pub fn apply_cash_flow(
        &mut self,
        month_index: usize,
        flow: MonthlyCashFlow,
        target_weights: &[f64],
    ) -> bool {
        let value = self.value();

        let after_contribution = value + flow.contribution;
        self.totals.contributions += flow.contribution;

        let after_withdrawal = after_contribution - flow.withdrawal;
        if after_withdrawal <= 0.0 {
            self.totals.withdrawals += after_contribution.max(0.0);
            self.holdings.clear();
            self.status = TrialStatus::Depleted {
                month: month_index + 1,
            };
            self.history.values.push(0.0);
            return false;
        }

        self.totals.withdrawals += flow.withdrawal;
        self.holdings.rescale(after_withdrawal, target_weights);
        true
    }

    pub fn apply_rebalance(&mut self, outcome: RebalanceOutcome) {
        if let RebalanceOutcome::Rebalanced { holdings, cost } = outcome {
            self.holdings = holdings;
            self.totals.rebalance_costs += cost;
            self.totals.rebalance_count += 1;
            self.months_since_rebalance = 0;
        }
    }

    /// Record the end-of-month value
    pub fn record(&mut self) {
        self.history.values.push(self.value());
    }

    /// Finish the trial, padding months after depletion with zeros
    #[must_use]
    pub fn into_result(mut self, trial: usize, seed: u64, horizon_months: usize) -> TrialResult {
        self.history.values.resize(horizon_months, 0.0);
        TrialResult {
            trial,
            seed,
            values: self.history.values,
            status: self.status,
            total_withdrawals: self.totals.withdrawals,
            total_contributions: self.totals.contributions,
            total_rebalance_costs: self.totals.rebalance_costs,
            rebalance_count: self.totals.rebalance_count,
        }
    }
}
