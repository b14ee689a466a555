//! Runs every job of the sweep on this machine using a rayon pool.

use std::process::ExitCode;

use anyhow::Result;
use bifurcation_core::contract::{SweepConfig, DEFAULT_OUTPUT_DIR};
use bifurcation_sweep::logging::init_tracing;
use bifurcation_sweep::run_local_sweep;
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "sweep_local",
    about = "Run the full bifurcation sweep locally, one artifact per job"
)]
struct Cli {
    /// Number of jobs to split the sweep into
    #[arg(long, default_value_t = SweepConfig::default().total_job_count)]
    jobs: usize,
    /// Worker threads (defaults to one per core)
    #[arg(long)]
    threads: Option<usize>,
    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(&cli) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failed) => {
            tracing::error!(failed, "sweep finished with failed jobs");
            ExitCode::FAILURE
        }
        Err(error) => {
            tracing::error!("{error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<usize> {
    let config = SweepConfig::default().with_total_job_count(cli.jobs);
    println!(
        "Running {} jobs over {} r values into {DEFAULT_OUTPUT_DIR}/...",
        config.total_job_count, config.total_r_count
    );

    let results = run_local_sweep(&config, DEFAULT_OUTPUT_DIR, cli.threads, !cli.no_progress)?;
    let points: usize = results
        .iter()
        .filter_map(|result| result.as_ref().ok())
        .map(|summary| summary.points)
        .sum();
    let failed = results.iter().filter(|result| result.is_err()).count();

    println!(
        "Completed {} jobs ({failed} failed), {points} of {} points written",
        results.len(),
        config.total_points()
    );
    Ok(failed)
}
