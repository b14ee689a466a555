//! Batch-scheduler entry point: computes and persists one job of the sweep.
//!
//! Usage: `sweep_worker <job_index> <total_jobs>`

use std::process::ExitCode;

use anyhow::{Context, Result};
use bifurcation_core::contract::{SweepConfig, DEFAULT_OUTPUT_DIR};
use bifurcation_sweep::logging::init_tracing;
use bifurcation_sweep::run_job;
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "sweep_worker",
    about = "Compute one strided slice of the x -> r * sin(x) bifurcation sweep"
)]
struct Cli {
    /// Index of this job, in [0, total_jobs)
    job_index: usize,
    /// Number of jobs the sweep is split into
    total_jobs: usize,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(job_index = cli.job_index, "{error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = SweepConfig::default().with_total_job_count(cli.total_jobs);
    let summary = run_job(&config, cli.job_index, DEFAULT_OUTPUT_DIR).with_context(|| {
        format!(
            "job {} of {} did not complete",
            cli.job_index, cli.total_jobs
        )
    })?;

    println!(
        "Job {} finished. {} r values, {} points saved to {}",
        summary.job_index,
        summary.r_values,
        summary.points,
        summary.artifact_path.display()
    );
    Ok(())
}
