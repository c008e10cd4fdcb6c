//! Rebalance strategies
//!
//! A strategy decides, at the end of each month, whether a trial's holdings
//! are reset to the target weights. Strategies hold no state: the engine
//! passes in the months elapsed since the last rebalance.
//!
//! Rebalancing charges `value * turnover * transaction_cost`, where turnover is
//! half the sum of absolute weight differences, and resets every asset to
//! `(value - cost) * target_weight`.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::{Holdings, PortfolioAllocation};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RebalanceStrategy {
    /// Rebalance every `months` months regardless of drift
    Periodic { months: u32 },
    /// Rebalance when any weight drifts from its target by more than
    /// `threshold` (absolute, e.g. 0.05 = 5 percentage points)
    Threshold { threshold: f64 },
    /// Buy and hold
    Never,
}

impl RebalanceStrategy {
    pub const MONTHLY: RebalanceStrategy = RebalanceStrategy::Periodic { months: 1 };
    pub const QUARTERLY: RebalanceStrategy = RebalanceStrategy::Periodic { months: 3 };
    pub const ANNUAL: RebalanceStrategy = RebalanceStrategy::Periodic { months: 12 };

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            RebalanceStrategy::Periodic { months } if *months == 0 => Err(
                ConfigError::parameter("rebalance period", "at least one month", 0.0),
            ),
            RebalanceStrategy::Threshold { threshold }
                if !(threshold.is_finite() && *threshold > 0.0 && *threshold < 1.0) =>
            {
                Err(ConfigError::parameter(
                    "rebalance threshold",
                    "in (0, 1)",
                    *threshold,
                ))
            }
            _ => Ok(()),
        }
    }

    /// Whether this strategy rebalances given the current holdings
    #[must_use]
    pub fn should_rebalance(
        &self,
        holdings: &Holdings,
        target: &PortfolioAllocation,
        context: &RebalanceContext,
    ) -> bool {
        if holdings.total() <= 0.0 {
            return false;
        }
        match self {
            RebalanceStrategy::Periodic { months } => context.months_since_rebalance >= *months,
            RebalanceStrategy::Threshold { threshold } => holdings
                .weights()
                .iter()
                .zip(target.weights())
                .any(|(current, target)| (current - target).abs() > *threshold),
            RebalanceStrategy::Never => false,
        }
    }

    /// Rebalance if the strategy calls for it
    #[must_use]
    pub fn maybe_rebalance(
        &self,
        holdings: &Holdings,
        target: &PortfolioAllocation,
        context: &RebalanceContext,
    ) -> RebalanceOutcome {
        if self.should_rebalance(holdings, target, context) {
            let (holdings, cost) = rebalance(holdings, target, context.transaction_cost);
            RebalanceOutcome::Rebalanced { holdings, cost }
        } else {
            RebalanceOutcome::Hold
        }
    }
}

/// What the engine knows when asking a strategy to act
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RebalanceContext {
    /// Zero-based month being closed
    pub month_index: usize,
    /// Months since the last rebalance, counting the current one
    pub months_since_rebalance: u32,
    /// Cost rate applied to traded value
    pub transaction_cost: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RebalanceOutcome {
    Hold,
    Rebalanced { holdings: Holdings, cost: f64 },
}

/// Half the sum of absolute differences between current and target weights
#[must_use]
pub fn turnover(current_weights: &[f64], target_weights: &[f64]) -> f64 {
    current_weights
        .iter()
        .zip(target_weights)
        .map(|(c, t)| (t - c).abs())
        .sum::<f64>()
        / 2.0
}

/// Reset holdings to target weights, paying the transaction cost out of the
/// portfolio. Returns the new holdings and the cost.
#[must_use]
pub fn rebalance(
    holdings: &Holdings,
    target: &PortfolioAllocation,
    transaction_cost: f64,
) -> (Holdings, f64) {
    let value = holdings.total();
    let cost = value * turnover(&holdings.weights(), target.weights()) * transaction_cost;
    (Holdings::from_allocation(target, value - cost), cost)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sixty_forty(strategy: RebalanceStrategy) -> PortfolioAllocation {
        // assets sort as [bonds, stocks]
        PortfolioAllocation::new("60/40", [("stocks", 0.6), ("bonds", 0.4)], strategy).unwrap()
    }

    fn context(months_since_rebalance: u32) -> RebalanceContext {
        RebalanceContext {
            month_index: 0,
            months_since_rebalance,
            transaction_cost: 0.002,
        }
    }

    #[test]
    fn test_periodic_waits_for_period() {
        let strategy = RebalanceStrategy::QUARTERLY;
        let target = sixty_forty(strategy);
        let drifted = Holdings::new(vec![30_000.0, 70_000.0]);

        assert!(!strategy.should_rebalance(&drifted, &target, &context(1)));
        assert!(!strategy.should_rebalance(&drifted, &target, &context(2)));
        assert!(strategy.should_rebalance(&drifted, &target, &context(3)));
    }

    #[test]
    fn test_monthly_rebalances_every_month() {
        let strategy = RebalanceStrategy::MONTHLY;
        let target = sixty_forty(strategy);
        let on_target = Holdings::new(vec![40_000.0, 60_000.0]);
        assert!(strategy.should_rebalance(&on_target, &target, &context(1)));
    }

    #[test]
    fn test_threshold_detects_drift() {
        let strategy = RebalanceStrategy::Threshold { threshold: 0.05 };
        let target = sixty_forty(strategy);

        // stocks at 72%
        let far = Holdings::new(vec![28_000.0, 72_000.0]);
        assert!(strategy.should_rebalance(&far, &target, &context(1)));

        // stocks at 62%
        let near = Holdings::new(vec![38_000.0, 62_000.0]);
        assert!(!strategy.should_rebalance(&near, &target, &context(120)));
    }

    #[test]
    fn test_never_holds() {
        let strategy = RebalanceStrategy::Never;
        let target = sixty_forty(strategy);
        let drifted = Holdings::new(vec![10_000.0, 90_000.0]);
        assert_eq!(
            strategy.maybe_rebalance(&drifted, &target, &context(500)),
            RebalanceOutcome::Hold
        );
    }

    #[test]
    fn test_empty_portfolio_never_rebalances() {
        let strategy = RebalanceStrategy::MONTHLY;
        let target = sixty_forty(strategy);
        assert!(!strategy.should_rebalance(&Holdings::zeroed(2), &target, &context(1)));
    }

    #[test]
    fn test_rebalance_cost_and_conservation() {
        let target = sixty_forty(RebalanceStrategy::ANNUAL);
        let holdings = Holdings::new(vec![30_000.0, 70_000.0]);

        let (new_holdings, cost) = rebalance(&holdings, &target, 0.002);

        // 10% of the portfolio moves from stocks to bonds
        assert!((cost - 100_000.0 * 0.1 * 0.002).abs() < 1e-9);
        assert!((new_holdings.total() + cost - 100_000.0).abs() < 1e-9);
        let weights = new_holdings.weights();
        assert!((weights[0] - 0.4).abs() < 1e-12);
        assert!((weights[1] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_rebalance_on_target_is_free() {
        let target = sixty_forty(RebalanceStrategy::ANNUAL);
        let holdings = Holdings::new(vec![40_000.0, 60_000.0]);
        let (_, cost) = rebalance(&holdings, &target, 0.01);
        assert!(cost.abs() < 1e-9);
    }

    #[test]
    fn test_turnover() {
        assert!((turnover(&[0.3, 0.7], &[0.4, 0.6]) - 0.1).abs() < 1e-12);
        assert_eq!(turnover(&[0.5, 0.5], &[0.5, 0.5]), 0.0);
    }

    #[test]
    fn test_validate() {
        assert!(RebalanceStrategy::Periodic { months: 0 }.validate().is_err());
        assert!(RebalanceStrategy::Threshold { threshold: 0.0 }.validate().is_err());
        assert!(RebalanceStrategy::Threshold { threshold: 0.05 }.validate().is_ok());
        assert!(RebalanceStrategy::Never.validate().is_ok());
    }
}
