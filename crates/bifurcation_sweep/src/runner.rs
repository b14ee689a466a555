//! Local parallel execution of every job in a sweep.
//!
//! In production each job is submitted to a batch scheduler as its own
//! `sweep_worker` process. This module runs the same jobs on a rayon pool so a
//! full sweep can be produced on one machine.

use std::path::Path;

use bifurcation_core::contract::SweepConfig;
use bifurcation_core::sharding::compute_job_plan;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::worker::{run_job, JobSummary, WorkerError};

/// Run every job of `config` in parallel.
///
/// # Arguments
///
/// * `config` - Sweep to run; `total_job_count` decides how many artifacts are written
/// * `output_dir` - Directory receiving one artifact per job
/// * `num_threads` - Optional number of threads to use. If None, uses rayon's default.
/// * `show_progress` - Whether to display a progress bar
///
/// # Returns
///
/// One result per job of the validated job plan, ordered by job index. A
/// failed job does not stop the others.
pub fn run_local_sweep(
    config: &SweepConfig,
    output_dir: impl AsRef<Path>,
    num_threads: Option<usize>,
    show_progress: bool,
) -> Result<Vec<Result<JobSummary, WorkerError>>, WorkerError> {
    let plan = compute_job_plan(config)?;
    let output_dir = output_dir.as_ref();

    let pb = if show_progress {
        let bar = ProgressBar::new(plan.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        Some(bar)
    } else {
        None
    };

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = num_threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder
        .build()
        .map_err(|error| WorkerError::ThreadPool(error.to_string()))?;

    let pb_clone = pb.clone();
    let results: Vec<Result<JobSummary, WorkerError>> = pool.install(|| {
        plan.par_iter()
            .map(|assignment| {
                let job_index = assignment.job_index;
                let result = run_job(config, job_index, output_dir);
                if let Err(error) = &result {
                    tracing::error!(job_index, error = %error, "job_failed");
                }
                if let Some(ref progress_bar) = pb_clone {
                    progress_bar.inc(1);
                }
                result
            })
            .collect()
    });

    if let Some(ref progress_bar) = pb {
        progress_bar.finish_with_message("Completed");
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_sweep_writes_one_artifact_per_job() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let config = SweepConfig {
            total_r_count: 12,
            warmup_iterations: 5,
            sample_iterations: 3,
            total_job_count: 4,
            ..SweepConfig::default()
        };

        let results =
            run_local_sweep(&config, temp.path(), Some(2), false).expect("sweep should start");

        assert_eq!(results.len(), 4);
        for (job_index, result) in results.iter().enumerate() {
            let summary = result.as_ref().expect("job should pass");
            assert_eq!(summary.job_index, job_index);
            assert_eq!(summary.points, 9);
            assert!(summary.artifact_path.is_file());
        }
    }

    #[test]
    fn local_sweep_follows_the_job_plan() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        // More jobs than r-values: the surplus jobs own nothing but still run.
        let config = SweepConfig {
            total_r_count: 5,
            warmup_iterations: 2,
            sample_iterations: 4,
            total_job_count: 7,
            ..SweepConfig::default()
        };
        let plan = compute_job_plan(&config).expect("plan should pass");

        let results =
            run_local_sweep(&config, temp.path(), Some(3), false).expect("sweep should start");

        assert_eq!(results.len(), plan.len());
        let mut points = 0;
        for (assignment, result) in plan.iter().zip(&results) {
            let summary = result.as_ref().expect("job should pass");
            assert_eq!(summary.job_index, assignment.job_index);
            assert_eq!(summary.r_values, assignment.positions.len());
            points += summary.points;
        }
        assert_eq!(points, config.total_points());
    }

    #[test]
    fn local_sweep_rejects_invalid_config() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let config = SweepConfig::default().with_total_job_count(0);

        let error = run_local_sweep(&config, temp.path(), None, false)
            .expect_err("zero jobs should fail");
        assert!(matches!(error, WorkerError::Configuration(_)));
    }
}
