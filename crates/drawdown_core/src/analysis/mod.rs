//! Aggregation and comparison of Monte Carlo results.
//!
//! Metrics are computed after the fact from stored trials, so the same
//! `MonteCarloResult` can feed the summary, the monthly percentile bands and
//! the per-trial table:
//!
//! ```ignore
//! use drawdown_core::analysis::{compare_portfolios, compare_scenarios};
//!
//! let results = study.run(None)?;
//! let summary = results[0].summary();
//! let bands = results[0].percentile_bands();
//!
//! let all_pairs = compare_scenarios(&results);
//! let base_only = compare_portfolios(&results, "base");
//! ```
//!
//! `withdrawal_sweep` re-runs one pair across a range of withdrawals with
//! common random numbers.

mod comparison;
mod metrics;
mod sweep;

pub use comparison::*;
pub use metrics::*;
pub use sweep::*;
