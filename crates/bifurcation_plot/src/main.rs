//! Gathers every worker artifact and shows the bifurcation diagram.

mod app;

use std::process::ExitCode;

use anyhow::Result;
use bifurcation_core::contract::{SweepConfig, DEFAULT_OUTPUT_DIR};
use bifurcation_sweep::logging::init_tracing;
use bifurcation_sweep::{gather_and_render, GatherError, GatherRenderError};

use crate::app::EguiScatterRenderer;

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let config = SweepConfig::default();
    println!("Gathering data from {DEFAULT_OUTPUT_DIR}/...");

    let mut renderer = EguiScatterRenderer::default();
    match gather_and_render(&config, DEFAULT_OUTPUT_DIR, &mut renderer) {
        Ok(dataset) => {
            let report = &dataset.report;
            println!(
                "Plotted {} points from {} artifact(s); {} failed, {} missing",
                dataset.len(),
                report.loaded_jobs.len(),
                report.failed.len(),
                report.missing_jobs.len()
            );
            Ok(())
        }
        Err(GatherRenderError::Gather(GatherError::NoArtifacts { path })) => {
            println!(
                "No result files found in {}. Make sure the worker jobs completed.",
                path.display()
            );
            println!("Expected files like: results_0.parquet, results_1.parquet, ...");
            Err(GatherError::NoArtifacts { path }.into())
        }
        Err(error) => Err(error.into()),
    }
}
