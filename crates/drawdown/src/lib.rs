//! Command line front end for the drawdown simulator: loads a YAML settings
//! file, runs every (portfolio, scenario) pair and writes JSON result tables.

pub mod config;
pub mod logging;
pub mod output;
pub mod runner;

#[cfg(test)]
mod tests;

pub use config::RunConfig;
pub use logging::init_logging;
pub use runner::{RunOutput, run};
