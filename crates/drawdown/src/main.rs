use std::path::PathBuf;

use clap::{Parser, Subcommand};
use drawdown::{RunConfig, init_logging, run};

#[derive(Parser, Debug)]
#[command(name = "drawdown")]
#[command(about = "Monte Carlo retirement drawdown simulator")]
struct Args {
    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate every portfolio under every scenario and write result tables
    Run {
        /// Path to the settings file
        #[arg(short, long, default_value = "config/settings.yaml")]
        config: PathBuf,

        /// Output directory (overrides project.output_dir)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Number of Monte Carlo trials per pair
        #[arg(short, long)]
        trials: Option<usize>,

        /// Random seed
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Check a settings file without simulating
    Validate {
        #[arg(short, long, default_value = "config/settings.yaml")]
        config: PathBuf,
    },
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(&args.log_level, args.log_file.as_deref())?;

    match args.command {
        Command::Run {
            config,
            output_dir,
            trials,
            seed,
        } => {
            let mut run_config = RunConfig::load(&config)?;
            if let Some(trials) = trials {
                run_config.simulation.montecarlo_iterations = trials;
            }
            if let Some(seed) = seed {
                run_config.project.random_seed = seed;
            }
            let output_dir = output_dir.unwrap_or_else(|| run_config.project.output_dir.clone());

            let output = run(&run_config, &output_dir)?;
            for result in &output.results {
                println!(
                    "{:<20} {:<16} survival {:>6.1}%",
                    result.portfolio,
                    result.scenario,
                    result.survival_rate() * 100.0
                );
            }
            println!("Wrote {} files to {}", output.files.len(), output_dir.display());
        }
        Command::Validate { config } => {
            let run_config = RunConfig::load(&config)?;
            let study = run_config.to_study()?;
            drawdown::output::check_file_names(&study)?;
            println!(
                "{}: {} portfolios x {} scenarios, {} trials over {} months",
                config.display(),
                study.portfolios.len(),
                study.scenarios.len(),
                study.config.num_trials,
                study.config.horizon_months
            );
        }
    }

    tracing::info!("done");
    Ok(())
}
