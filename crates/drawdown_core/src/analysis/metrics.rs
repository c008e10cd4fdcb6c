//! Aggregate metrics computed from Monte Carlo results.

use serde::{Deserialize, Serialize};

use crate::model::{MonteCarloResult, TrialResult};

/// Percentiles reported for value bands and final value statistics
pub const STANDARD_PERCENTILES: [f64; 5] = [0.05, 0.25, 0.50, 0.75, 0.95];

/// Linearly interpolated percentile of an ascending slice, `p` in [0, 1].
///
/// The rank is `p * (n - 1)`; an empty slice yields 0.
#[must_use]
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = p.clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let frac = rank - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * frac
        }
    }
}

fn sorted(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    values
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator); 0 for fewer than two values
fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

fn mean_by(trials: &[TrialResult], f: impl Fn(&TrialResult) -> f64) -> f64 {
    if trials.is_empty() {
        return 0.0;
    }
    trials.iter().map(f).sum::<f64>() / trials.len() as f64
}

/// Standard percentile set of a distribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileSet {
    pub p5: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
}

impl PercentileSet {
    #[must_use]
    pub fn from_sorted(sorted: &[f64]) -> Self {
        let [p5, p25, p50, p75, p95] = STANDARD_PERCENTILES.map(|p| percentile(sorted, p));
        Self {
            p5,
            p25,
            p50,
            p75,
            p95,
        }
    }
}

/// Distribution of final portfolio values across trials
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinalValueStats {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub p5: f64,
    pub p25: f64,
    pub p75: f64,
    pub p95: f64,
}

impl FinalValueStats {
    #[must_use]
    pub fn from_values(values: Vec<f64>) -> Self {
        let sorted = sorted(values);
        let set = PercentileSet::from_sorted(&sorted);
        Self {
            mean: mean(&sorted),
            median: set.p50,
            std_dev: std_dev(&sorted),
            min: sorted.first().copied().unwrap_or(0.0),
            max: sorted.last().copied().unwrap_or(0.0),
            p5: set.p5,
            p25: set.p25,
            p75: set.p75,
            p95: set.p95,
        }
    }
}

/// Summary statistics for one (portfolio, scenario) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloSummary {
    pub num_trials: usize,
    /// Fraction of trials that never depleted, in [0, 1]
    pub survival_rate: f64,
    pub final_value: FinalValueStats,
    /// Median 1-based depletion month among depleted trials
    pub median_depletion_month: Option<f64>,
    pub mean_months_survived: f64,
    pub mean_total_withdrawals: f64,
    pub mean_total_contributions: f64,
    pub mean_net_flow: f64,
    pub mean_rebalance_costs: f64,
    pub mean_rebalance_count: f64,
    pub mean_total_return: f64,
}

/// Percentile band of portfolio value across trials at one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthBand {
    /// 1-based month of the horizon
    pub month: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<jiff::civil::Date>,
    #[serde(flatten)]
    pub percentiles: PercentileSet,
    pub mean: f64,
    /// Trials not yet depleted at the end of this month
    pub surviving_trials: usize,
}

/// One row of the per-trial output table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRow {
    pub trial: usize,
    pub seed: u64,
    pub final_value: f64,
    pub survived: bool,
    pub depletion_month: Option<usize>,
    pub months_survived: usize,
    pub total_withdrawals: f64,
    pub total_contributions: f64,
    pub net_flow: f64,
    pub total_rebalance_costs: f64,
    pub rebalance_count: u32,
    pub total_return: f64,
}

impl TrialRow {
    #[must_use]
    pub fn new(trial: &TrialResult, initial_capital: f64) -> Self {
        Self {
            trial: trial.trial,
            seed: trial.seed,
            final_value: trial.final_value(),
            survived: trial.survived(),
            depletion_month: trial.status.depletion_month(),
            months_survived: trial.months_survived(),
            total_withdrawals: trial.total_withdrawals,
            total_contributions: trial.total_contributions,
            net_flow: trial.net_flow(),
            total_rebalance_costs: trial.total_rebalance_costs,
            rebalance_count: trial.rebalance_count,
            total_return: trial.total_return(initial_capital),
        }
    }
}

impl MonteCarloResult {
    #[must_use]
    pub fn summary(&self) -> MonteCarloSummary {
        let trials = &self.trials;
        let depletion_months = sorted(
            trials
                .iter()
                .filter_map(|t| t.status.depletion_month())
                .map(|m| m as f64)
                .collect(),
        );

        MonteCarloSummary {
            num_trials: trials.len(),
            survival_rate: self.survival_rate(),
            final_value: FinalValueStats::from_values(self.final_values()),
            median_depletion_month: (!depletion_months.is_empty())
                .then(|| percentile(&depletion_months, 0.5)),
            mean_months_survived: mean_by(trials, |t| t.months_survived() as f64),
            mean_total_withdrawals: mean_by(trials, |t| t.total_withdrawals),
            mean_total_contributions: mean_by(trials, |t| t.total_contributions),
            mean_net_flow: mean_by(trials, |t| t.net_flow()),
            mean_rebalance_costs: mean_by(trials, |t| t.total_rebalance_costs),
            mean_rebalance_count: mean_by(trials, |t| f64::from(t.rebalance_count)),
            mean_total_return: mean_by(trials, |t| t.total_return(self.initial_capital)),
        }
    }

    /// Value percentiles across trials for every month of the horizon
    #[must_use]
    pub fn percentile_bands(&self) -> Vec<MonthBand> {
        (0..self.horizon_months)
            .map(|m| {
                let values = sorted(
                    self.trials
                        .iter()
                        .map(|t| t.values.get(m).copied().unwrap_or(0.0))
                        .collect(),
                );
                let surviving_trials = self
                    .trials
                    .iter()
                    .filter(|t| t.status.depletion_month().is_none_or(|d| d > m + 1))
                    .count();
                MonthBand {
                    month: m + 1,
                    date: self.month_date(m),
                    percentiles: PercentileSet::from_sorted(&values),
                    mean: mean(&values),
                    surviving_trials,
                }
            })
            .collect()
    }

    #[must_use]
    pub fn trial_rows(&self) -> Vec<TrialRow> {
        self.trials
            .iter()
            .map(|t| TrialRow::new(t, self.initial_capital))
            .collect()
    }

    /// Calendar date of a zero-based month when a start date is configured
    #[must_use]
    pub fn month_date(&self, month_index: usize) -> Option<jiff::civil::Date> {
        use jiff::ToSpan;

        let start = self.start_date?;
        start.checked_add((month_index as i64).months()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TrialStatus;

    fn trial(values: Vec<f64>, status: TrialStatus) -> TrialResult {
        TrialResult {
            trial: 0,
            seed: 0,
            values,
            status,
            total_withdrawals: 0.0,
            total_contributions: 0.0,
            total_rebalance_costs: 0.0,
            rebalance_count: 0,
        }
    }

    fn result(trials: Vec<TrialResult>) -> MonteCarloResult {
        MonteCarloResult {
            portfolio: "p".to_string(),
            scenario: "s".to_string(),
            initial_capital: 100.0,
            horizon_months: trials.first().map_or(0, |t| t.values.len()),
            start_date: None,
            trials,
        }
    }

    #[test]
    fn test_percentile_interpolates() {
        let values = [10.0, 20.0, 30.0, 40.0, 50.0];
        assert_eq!(percentile(&values, 0.0), 10.0);
        assert_eq!(percentile(&values, 0.5), 30.0);
        assert_eq!(percentile(&values, 1.0), 50.0);
        // rank 0.05 * 4 = 0.2
        assert!((percentile(&values, 0.05) - 12.0).abs() < 1e-12);
        assert!((percentile(&values, 0.95) - 48.0).abs() < 1e-12);
        assert_eq!(percentile(&[], 0.5), 0.0);
        assert_eq!(percentile(&[7.0], 0.95), 7.0);
    }

    #[test]
    fn test_final_value_stats() {
        let stats = FinalValueStats::from_values(vec![4.0, 1.0, 3.0, 2.0]);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert_eq!(stats.mean, 2.5);
        assert_eq!(stats.median, 2.5);
        // sample variance of 1..4 is 5/3
        assert!((stats.std_dev - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_summary_survival_and_depletion() {
        let result = result(vec![
            trial(vec![100.0, 110.0], TrialStatus::Survived),
            trial(vec![50.0, 0.0], TrialStatus::Depleted { month: 2 }),
            trial(vec![0.0, 0.0], TrialStatus::Depleted { month: 1 }),
            trial(vec![90.0, 95.0], TrialStatus::Survived),
        ]);
        let summary = result.summary();

        assert_eq!(summary.num_trials, 4);
        assert_eq!(summary.survival_rate, 0.5);
        assert_eq!(summary.median_depletion_month, Some(1.5));
        // (2 + 1 + 0 + 2) / 4
        assert_eq!(summary.mean_months_survived, 1.25);
        assert_eq!(summary.final_value.max, 110.0);
    }

    #[test]
    fn test_percentile_bands() {
        let result = result(vec![
            trial(vec![100.0, 120.0], TrialStatus::Survived),
            trial(vec![0.0, 0.0], TrialStatus::Depleted { month: 1 }),
            trial(vec![80.0, 60.0], TrialStatus::Survived),
        ]);
        let bands = result.percentile_bands();

        assert_eq!(bands.len(), 2);
        assert_eq!(bands[0].month, 1);
        assert_eq!(bands[0].percentiles.p50, 80.0);
        assert_eq!(bands[0].surviving_trials, 2);
        assert_eq!(bands[1].percentiles.p50, 60.0);
        assert_eq!(bands[1].mean, 60.0);
        assert!(bands.iter().all(|b| b.date.is_none()));
    }

    #[test]
    fn test_bands_labelled_with_dates() {
        let mut result = result(vec![trial(vec![1.0, 1.0, 1.0], TrialStatus::Survived)]);
        result.start_date = Some(jiff::civil::date(2025, 11, 1));
        let bands = result.percentile_bands();

        assert_eq!(bands[0].date, Some(jiff::civil::date(2025, 11, 1)));
        assert_eq!(bands[2].date, Some(jiff::civil::date(2026, 1, 1)));
    }
}
