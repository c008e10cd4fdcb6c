//! Tests for configuration loading and the end-to-end run
//!
//! - `config` - YAML parsing and conversion into a study
//! - `run` - Simulating a small study into a temporary directory

mod config;

const SAMPLE_SETTINGS: &str = include_str!("../../config/settings.yaml");

/// Small single-portfolio settings for fast end-to-end runs
const MINIMAL_SETTINGS: &str = r#"
project:
  initial_capital: 100000
  horizon_months: 120
  random_seed: 7

withdrawals:
  amount: 1200

simulation:
  montecarlo_iterations: 20

assets:
  flat:
    mean_return: 0.0
    volatility: 0.0

portfolios:
  flat:
    name: "flat/fund"
    allocation:
      flat: 1.0
    rebalance:
      type: time
      months: 3

economic_scenarios:
  base:
    inflation_rate: 0.0
    transaction_cost: 0.0
"#;
