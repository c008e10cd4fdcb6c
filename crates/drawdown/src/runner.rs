use std::path::{Path, PathBuf};

use color_eyre::eyre::WrapErr;
use tracing::info;

use drawdown_core::analysis::withdrawal_sweep;
use drawdown_core::config::Study;
use drawdown_core::model::MonteCarloResult;

use crate::config::{RunConfig, SensitivityConfig};
use crate::output;

/// Everything a finished run produced
#[derive(Debug)]
pub struct RunOutput {
    pub results: Vec<MonteCarloResult>,
    pub files: Vec<PathBuf>,
}

/// Validate the configuration, simulate every pair and write all tables to
/// `output_dir`
pub fn run(config: &RunConfig, output_dir: &Path) -> color_eyre::Result<RunOutput> {
    let study = config.to_study()?;
    output::check_file_names(&study)?;
    std::fs::create_dir_all(output_dir)
        .wrap_err_with(|| format!("Failed to create {}", output_dir.display()))?;

    info!(
        portfolios = study.portfolios.len(),
        scenarios = study.scenarios.len(),
        trials = study.config.num_trials,
        months = study.config.horizon_months,
        "running simulations"
    );
    let results = study.run(None)?;

    let mut files = Vec::new();
    for result in &results {
        let summary = result.summary();
        info!(
            portfolio = %result.portfolio,
            scenario = %result.scenario,
            survival_rate = summary.survival_rate,
            median_final_value = summary.final_value.median,
            "pair finished"
        );
        files.extend(output::write_pair(output_dir, result)?);
    }
    files.extend(output::write_comparisons(output_dir, &results)?);

    if let Some(sensitivity) = &config.sensitivity {
        files.extend(run_sensitivity(&study, sensitivity, output_dir)?);
    }

    info!(files = files.len(), dir = %output_dir.display(), "results written");
    Ok(RunOutput { results, files })
}

fn run_sensitivity(
    study: &Study,
    sensitivity: &SensitivityConfig,
    output_dir: &Path,
) -> color_eyre::Result<Vec<PathBuf>> {
    let config = match sensitivity.trials {
        Some(trials) => study.config.with_num_trials(trials),
        None => study.config.clone(),
    };

    let mut files = Vec::new();
    for portfolio in &study.portfolios {
        for scenario in &study.scenarios {
            let points = withdrawal_sweep(
                &config,
                portfolio,
                &study.universe,
                scenario,
                &sensitivity.withdrawals,
                None,
            )?;
            files.push(output::write_sensitivity(
                output_dir,
                portfolio.name(),
                &scenario.name,
                &points,
            )?);
        }
    }
    Ok(files)
}
