//! Worker side of the sweep.
//!
//! A worker owns one strided slice of the r-value sweep. Computing the slice is
//! a pure function of the config and the job index; persisting it writes a
//! single artifact named after the job index and touches nothing else, so any
//! number of workers can run concurrently or be re-run without coordination.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use bifurcation_core::contract::{config_fingerprint, ConfigurationError, SweepConfig};
use bifurcation_core::sharding::{job_positions, job_slice};
use bifurcation_core::sine_map::simulate;
use bifurcation_core::storage_keys::artifact_path;
use thiserror::Error;

use crate::artifact::{write_artifact, ArtifactError};

/// Flattened output of one job: `r[i]` pairs with `x[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialResult {
    pub job_index: usize,
    pub total_jobs: usize,
    pub r: Vec<f64>,
    pub x: Vec<f64>,
}

impl PartialResult {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobSummary {
    pub job_index: usize,
    pub r_values: usize,
    pub points: usize,
    pub artifact_path: PathBuf,
    pub duration: Duration,
}

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("failed to create output directory {}: {source}", path.display())]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error("failed to create worker thread pool: {0}")]
    ThreadPool(String),
}

/// Computes the attractor samples for every r-value owned by `job_index`.
///
/// Every r-value starts from the same `initial_x`.
pub fn compute_partial_result(
    config: &SweepConfig,
    job_index: usize,
) -> Result<PartialResult, ConfigurationError> {
    let slice = job_slice(config, job_index)?;
    let capacity = slice.len() * config.sample_iterations;
    let mut r = Vec::with_capacity(capacity);
    let mut x = Vec::with_capacity(capacity);

    for r_value in slice {
        let sample = simulate(
            r_value,
            config.initial_x,
            config.warmup_iterations,
            config.sample_iterations,
        );
        r.extend(std::iter::repeat(sample.r).take(sample.len()));
        x.extend(sample.xs);
    }

    Ok(PartialResult {
        job_index,
        total_jobs: config.total_job_count,
        r,
        x,
    })
}

/// Computes one job and writes its artifact into `output_dir`.
///
/// The directory is created if needed and an existing artifact for the same
/// job index is overwritten.
pub fn run_job(
    config: &SweepConfig,
    job_index: usize,
    output_dir: impl AsRef<Path>,
) -> Result<JobSummary, WorkerError> {
    let started_at = Instant::now();
    let output_dir = output_dir.as_ref();
    config.validate_job(job_index)?;

    tracing::info!(
        job_index,
        total_jobs = config.total_job_count,
        "job_started"
    );

    let result = compute_partial_result(config, job_index)?;
    let r_values = job_positions(config.total_r_count, job_index, config.total_job_count).len();
    tracing::debug!(job_index, r_values, points = result.len(), "job_computed");

    fs::create_dir_all(output_dir).map_err(|source| WorkerError::CreateOutputDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let path = artifact_path(output_dir, job_index);
    write_artifact(&path, &result, &config_fingerprint(config))?;

    let summary = JobSummary {
        job_index,
        r_values,
        points: result.len(),
        artifact_path: path,
        duration: started_at.elapsed(),
    };
    tracing::info!(
        job_index,
        points = summary.points,
        duration_ms = summary.duration.as_millis() as u64,
        path = %summary.artifact_path.display(),
        "job_completed"
    );
    Ok(summary)
}
