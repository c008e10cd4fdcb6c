//! Comparison tables across scenarios and portfolios.

use serde::{Deserialize, Serialize};

use super::metrics::MonteCarloSummary;
use crate::model::MonteCarloResult;

/// Summary of one (portfolio, scenario) pair, flattened for tabular output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub portfolio: String,
    pub scenario: String,
    #[serde(flatten)]
    pub summary: MonteCarloSummary,
}

impl ComparisonRow {
    #[must_use]
    pub fn new(result: &MonteCarloResult) -> Self {
        Self {
            portfolio: result.portfolio.clone(),
            scenario: result.scenario.clone(),
            summary: result.summary(),
        }
    }
}

/// One row per (portfolio, scenario) pair, in result order
#[must_use]
pub fn compare_scenarios(results: &[MonteCarloResult]) -> Vec<ComparisonRow> {
    results.iter().map(ComparisonRow::new).collect()
}

/// One row per portfolio simulated under `scenario`
#[must_use]
pub fn compare_portfolios(results: &[MonteCarloResult], scenario: &str) -> Vec<ComparisonRow> {
    results
        .iter()
        .filter(|r| r.scenario == scenario)
        .map(ComparisonRow::new)
        .collect()
}

/// Distinct scenario names in order of first appearance
#[must_use]
pub fn scenario_names(results: &[MonteCarloResult]) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for result in results {
        if !names.contains(&result.scenario.as_str()) {
            names.push(&result.scenario);
        }
    }
    names
}
