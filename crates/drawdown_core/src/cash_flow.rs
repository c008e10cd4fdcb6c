//! Monthly withdrawals and contributions

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// When bonus withdrawals are paid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BonusSchedule {
    /// At the listed 1-based positions of every `cycle`-month cycle
    /// (e.g. months 6 and 12 of each 12-month cycle)
    Recurring { months: Vec<u32>, cycle: u32 },
    /// At the listed 1-based months of the horizon
    Fixed { months: Vec<u32> },
}

impl BonusSchedule {
    /// Extra 13th and 14th monthly payments in June and December
    #[must_use]
    pub fn semiannual() -> Self {
        BonusSchedule::Recurring {
            months: vec![6, 12],
            cycle: 12,
        }
    }

    /// Whether a bonus is paid in the given zero-based month
    #[must_use]
    pub fn pays_in(&self, month_index: usize) -> bool {
        let month = month_index as u64 + 1;
        match self {
            BonusSchedule::Recurring { months, cycle } => {
                let position = (month - 1) % u64::from(*cycle) + 1;
                months.iter().any(|m| u64::from(*m) == position)
            }
            BonusSchedule::Fixed { months } => months.iter().any(|m| u64::from(*m) == month),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            BonusSchedule::Recurring { months, cycle } => {
                if *cycle == 0 {
                    return Err(ConfigError::InvalidBonusSchedule(
                        "cycle must be at least one month".to_string(),
                    ));
                }
                if let Some(m) = months.iter().find(|m| **m == 0 || **m > *cycle) {
                    return Err(ConfigError::InvalidBonusSchedule(format!(
                        "month {m} is outside a {cycle}-month cycle"
                    )));
                }
            }
            BonusSchedule::Fixed { months } => {
                if months.contains(&0) {
                    return Err(ConfigError::InvalidBonusSchedule(
                        "months are 1-based".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusWithdrawal {
    pub amount: f64,
    pub schedule: BonusSchedule,
}

/// Cash flows applied to every trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowSchedule {
    /// Base withdrawal paid every month
    #[serde(default)]
    pub monthly_withdrawal: f64,
    /// Deposit made every month; negative values model recurring outflows such
    /// as taxes
    #[serde(default)]
    pub monthly_contribution: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus: Option<BonusWithdrawal>,
    /// Grow withdrawals with the scenario's inflation rate
    #[serde(default)]
    pub inflation_indexed: bool,
}

impl Default for CashFlowSchedule {
    fn default() -> Self {
        Self {
            monthly_withdrawal: 0.0,
            monthly_contribution: 0.0,
            bonus: None,
            inflation_indexed: false,
        }
    }
}

impl CashFlowSchedule {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.monthly_withdrawal.is_finite() || self.monthly_withdrawal < 0.0 {
            return Err(ConfigError::parameter(
                "monthly withdrawal",
                "finite and non-negative",
                self.monthly_withdrawal,
            ));
        }
        if !self.monthly_contribution.is_finite() {
            return Err(ConfigError::parameter(
                "monthly contribution",
                "finite",
                self.monthly_contribution,
            ));
        }
        if let Some(bonus) = &self.bonus {
            if !bonus.amount.is_finite() || bonus.amount < 0.0 {
                return Err(ConfigError::parameter(
                    "bonus withdrawal",
                    "finite and non-negative",
                    bonus.amount,
                ));
            }
            bonus.schedule.validate()?;
        }
        Ok(())
    }
}

/// Amounts moved in one month
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyCashFlow {
    pub withdrawal: f64,
    pub contribution: f64,
}

/// Cash flow schedule bound to a scenario's inflation rate
#[derive(Debug, Clone, PartialEq)]
pub struct CashFlowModel {
    schedule: CashFlowSchedule,
    inflation_rate: f64,
}

impl CashFlowModel {
    #[must_use]
    pub fn new(schedule: CashFlowSchedule, inflation_rate: f64) -> Self {
        Self {
            schedule,
            inflation_rate,
        }
    }

    #[must_use]
    pub fn schedule(&self) -> &CashFlowSchedule {
        &self.schedule
    }

    /// Factor applied to withdrawals in the given month: `(1 + i)^(m / 12)`,
    /// or 1 when withdrawals are not indexed
    #[must_use]
    pub fn inflation_factor(&self, month_index: usize) -> f64 {
        if self.schedule.inflation_indexed {
            (1.0 + self.inflation_rate).powf(month_index as f64 / 12.0)
        } else {
            1.0
        }
    }

    #[must_use]
    pub fn monthly_cashflow(&self, month_index: usize) -> MonthlyCashFlow {
        let bonus = self
            .schedule
            .bonus
            .as_ref()
            .filter(|b| b.schedule.pays_in(month_index))
            .map_or(0.0, |b| b.amount);

        MonthlyCashFlow {
            withdrawal: (self.schedule.monthly_withdrawal + bonus)
                * self.inflation_factor(month_index),
            contribution: self.schedule.monthly_contribution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_bonus(schedule: BonusSchedule) -> CashFlowSchedule {
        CashFlowSchedule {
            monthly_withdrawal: 1_000.0,
            monthly_contribution: 0.0,
            bonus: Some(BonusWithdrawal {
                amount: 1_000.0,
                schedule,
            }),
            inflation_indexed: false,
        }
    }

    #[test]
    fn test_recurring_bonus_months() {
        let model = CashFlowModel::new(with_bonus(BonusSchedule::semiannual()), 0.0);

        let paid: Vec<usize> = (0..36)
            .filter(|m| model.monthly_cashflow(*m).withdrawal > 1_000.0)
            .map(|m| m + 1)
            .collect();
        assert_eq!(paid, vec![6, 12, 18, 24, 30, 36]);
        assert_eq!(model.monthly_cashflow(5).withdrawal, 2_000.0);
        assert_eq!(model.monthly_cashflow(6).withdrawal, 1_000.0);
    }

    #[test]
    fn test_fixed_bonus_months() {
        let model = CashFlowModel::new(
            with_bonus(BonusSchedule::Fixed {
                months: vec![12, 18],
            }),
            0.0,
        );
        assert_eq!(model.monthly_cashflow(11).withdrawal, 2_000.0);
        assert_eq!(model.monthly_cashflow(17).withdrawal, 2_000.0);
        assert_eq!(model.monthly_cashflow(23).withdrawal, 1_000.0);
    }

    #[test]
    fn test_inflation_indexing() {
        let schedule = CashFlowSchedule {
            monthly_withdrawal: 1_000.0,
            monthly_contribution: 250.0,
            bonus: None,
            inflation_indexed: true,
        };
        let model = CashFlowModel::new(schedule, 0.03);

        assert_eq!(model.monthly_cashflow(0).withdrawal, 1_000.0);
        assert!((model.monthly_cashflow(12).withdrawal - 1_030.0).abs() < 1e-9);
        // contributions are not indexed
        assert_eq!(model.monthly_cashflow(12).contribution, 250.0);
    }

    #[test]
    fn test_unindexed_ignores_inflation() {
        let model = CashFlowModel::new(
            CashFlowSchedule {
                monthly_withdrawal: 500.0,
                ..Default::default()
            },
            0.10,
        );
        assert_eq!(model.monthly_cashflow(60).withdrawal, 500.0);
    }

    #[test]
    fn test_validate() {
        assert!(with_bonus(BonusSchedule::semiannual()).validate().is_ok());
        assert!(
            with_bonus(BonusSchedule::Recurring {
                months: vec![13],
                cycle: 12
            })
            .validate()
            .is_err()
        );
        assert!(
            with_bonus(BonusSchedule::Recurring {
                months: vec![1],
                cycle: 0
            })
            .validate()
            .is_err()
        );
        assert!(with_bonus(BonusSchedule::Fixed { months: vec![0] }).validate().is_err());

        let negative = CashFlowSchedule {
            monthly_withdrawal: -1.0,
            ..Default::default()
        };
        assert!(negative.validate().is_err());
    }
}
