//! Result files
//!
//! Every table is pretty-printed JSON written with write-then-rename, so an
//! interrupted run never leaves a truncated file behind.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{WrapErr, bail};
use serde::Serialize;

use drawdown_core::analysis::{SweepPoint, compare_portfolios, compare_scenarios, scenario_names};
use drawdown_core::config::Study;
use drawdown_core::model::MonteCarloResult;

/// Write content to a file atomically: write a sibling temp file, then rename
/// it over the target.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> color_eyre::Result<()> {
    let json = serde_json::to_vec_pretty(value)?;
    atomic_write(path, &json).wrap_err_with(|| format!("Failed to write {}", path.display()))
}

/// File-name-safe form of a portfolio or scenario name ("60/40" -> "60_40")
#[must_use]
pub fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn pair_stem(portfolio: &str, scenario: &str) -> String {
    format!("{}_{}", file_stem(portfolio), file_stem(scenario))
}

/// Fail if two pairs, or two scenarios, would be written to the same file
/// once their names are sanitised
pub fn check_file_names(study: &Study) -> color_eyre::Result<()> {
    let mut pairs: HashMap<String, (&str, &str)> = HashMap::new();
    for portfolio in &study.portfolios {
        for scenario in &study.scenarios {
            let key = (portfolio.name(), scenario.name.as_str());
            if let Some((p, s)) = pairs.insert(pair_stem(key.0, key.1), key) {
                bail!(
                    "pairs ({p}, {s}) and ({}, {}) map to the same output file name",
                    key.0,
                    key.1
                );
            }
        }
    }

    let mut scenarios: HashMap<String, &str> = HashMap::new();
    for scenario in &study.scenarios {
        if let Some(other) = scenarios.insert(file_stem(&scenario.name), &scenario.name) {
            bail!(
                "scenarios '{other}' and '{}' map to the same output file name",
                scenario.name
            );
        }
    }
    Ok(())
}

/// Per-trial table and monthly percentile bands of one pair
pub fn write_pair(dir: &Path, result: &MonteCarloResult) -> color_eyre::Result<Vec<PathBuf>> {
    let stem = pair_stem(&result.portfolio, &result.scenario);

    let trials_path = dir.join(format!("trials_{stem}.json"));
    write_json(&trials_path, &result.trial_rows())?;

    let bands_path = dir.join(format!("bands_{stem}.json"));
    write_json(&bands_path, &result.percentile_bands())?;

    Ok(vec![trials_path, bands_path])
}

/// Scenario comparison across all pairs plus one portfolio comparison per
/// scenario
pub fn write_comparisons(
    dir: &Path,
    results: &[MonteCarloResult],
) -> color_eyre::Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    let path = dir.join("scenario_comparison.json");
    write_json(&path, &compare_scenarios(results))?;
    written.push(path);

    for scenario in scenario_names(results) {
        let path = dir.join(format!("portfolio_comparison_{}.json", file_stem(scenario)));
        write_json(&path, &compare_portfolios(results, scenario))?;
        written.push(path);
    }
    Ok(written)
}

pub fn write_sensitivity(
    dir: &Path,
    portfolio: &str,
    scenario: &str,
    points: &[SweepPoint],
) -> color_eyre::Result<PathBuf> {
    let path = dir.join(format!(
        "withdrawal_sensitivity_{}.json",
        pair_stem(portfolio, scenario)
    ));
    write_json(&path, points)?;
    Ok(path)
}
