//! Aggregation of partial results.
//!
//! The aggregator reads whatever artifacts exist in the output directory,
//! merges them in job-index order and reports which expected jobs are absent.
//! A single unreadable artifact is logged and skipped; only an empty merge is
//! fatal.

use std::fs;
use std::io::ErrorKind;
use std::ops::Range;
use std::path::{Path, PathBuf};

use bifurcation_core::contract::{config_fingerprint, SweepConfig};
use bifurcation_core::storage_keys::{artifact_path, parse_job_index};
use thiserror::Error;

use crate::artifact::{read_artifact, ArtifactError, LoadedArtifact};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DiscoveredArtifact {
    pub job_index: usize,
    pub path: PathBuf,
}

/// The artifacts a complete sweep is expected to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobManifest {
    output_dir: PathBuf,
    total_jobs: usize,
}

impl JobManifest {
    pub fn from_config(config: &SweepConfig, output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            total_jobs: config.total_job_count,
        }
    }

    pub fn expected_jobs(&self) -> Range<usize> {
        0..self.total_jobs
    }

    pub fn artifact_path(&self, job_index: usize) -> PathBuf {
        artifact_path(&self.output_dir, job_index)
    }

    pub fn contains(&self, job_index: usize) -> bool {
        job_index < self.total_jobs
    }

    /// Expected job indices with no discovered artifact, ascending.
    pub fn missing_jobs(&self, discovered: &[DiscoveredArtifact]) -> Vec<usize> {
        let mut present = vec![false; self.total_jobs];
        for artifact in discovered {
            if let Some(slot) = present.get_mut(artifact.job_index) {
                *slot = true;
            }
        }
        self.expected_jobs()
            .filter(|&job_index| !present[job_index])
            .collect()
    }
}

#[derive(Debug, Error)]
pub enum LoadFailure {
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error("artifact was computed with a different sweep (fingerprint {found}, expected {expected})")]
    FingerprintMismatch { found: String, expected: String },
    #[error("artifact metadata names job {recorded} but the file name names job {named}")]
    JobIndexMismatch { recorded: usize, named: usize },
    #[error("artifact belongs to a {recorded}-job split but the sweep expects {expected} jobs")]
    JobCountMismatch { recorded: usize, expected: usize },
}

#[derive(Debug)]
pub struct FailedArtifact {
    pub job_index: usize,
    pub path: PathBuf,
    pub error: LoadFailure,
}

#[derive(Debug, Default)]
pub struct GatherReport {
    pub discovered: usize,
    pub loaded_jobs: Vec<usize>,
    pub failed: Vec<FailedArtifact>,
    pub missing_jobs: Vec<usize>,
    pub unexpected_jobs: Vec<usize>,
}

impl GatherReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.missing_jobs.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum GatherError {
    #[error("failed to list artifacts in {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no result artifacts found in {} (expected files like results_0.parquet)", path.display())]
    NoArtifacts { path: PathBuf },
    #[error("no data collected from {} artifact(s) ({} failed to load)", report.discovered, report.failed.len())]
    NoData { report: GatherReport },
}

/// Merged (r, x) point cloud from every artifact that loaded.
#[derive(Debug)]
pub struct AggregatedDataset {
    pub r: Vec<f64>,
    pub x: Vec<f64>,
    pub report: GatherReport,
}

impl AggregatedDataset {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.r.iter().copied().zip(self.x.iter().copied())
    }

    pub fn non_finite_count(&self) -> usize {
        self.points()
            .filter(|(r, x)| !r.is_finite() || !x.is_finite())
            .count()
    }
}

/// Lists artifacts following the naming convention, sorted numerically by
/// job index. A missing directory yields an empty list.
pub fn discover_artifacts(
    output_dir: impl AsRef<Path>,
) -> Result<Vec<DiscoveredArtifact>, GatherError> {
    let output_dir = output_dir.as_ref();
    let entries = match fs::read_dir(output_dir) {
        Ok(entries) => entries,
        Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(GatherError::ReadDir {
                path: output_dir.to_path_buf(),
                source,
            })
        }
    };

    let mut discovered = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| GatherError::ReadDir {
            path: output_dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let Some(job_index) = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(parse_job_index)
        else {
            continue;
        };
        if path.is_file() {
            discovered.push(DiscoveredArtifact { job_index, path });
        }
    }

    discovered.sort();
    Ok(discovered)
}

fn load_checked(
    artifact: &DiscoveredArtifact,
    expected_fingerprint: &str,
    expected_total_jobs: usize,
) -> Result<LoadedArtifact, LoadFailure> {
    let loaded = read_artifact(&artifact.path)?;

    if let Some(found) = &loaded.config_fingerprint {
        if found != expected_fingerprint {
            return Err(LoadFailure::FingerprintMismatch {
                found: found.clone(),
                expected: expected_fingerprint.to_string(),
            });
        }
    }
    if let Some(recorded) = loaded.job_index {
        if recorded != artifact.job_index {
            return Err(LoadFailure::JobIndexMismatch {
                recorded,
                named: artifact.job_index,
            });
        }
    }
    // Slices from different splits overlap and leave gaps when merged.
    if let Some(recorded) = loaded.total_jobs {
        if recorded != expected_total_jobs {
            return Err(LoadFailure::JobCountMismatch {
                recorded,
                expected: expected_total_jobs,
            });
        }
    }

    Ok(loaded)
}

/// Loads and concatenates every artifact in `output_dir`.
pub fn gather(
    config: &SweepConfig,
    output_dir: impl AsRef<Path>,
) -> Result<AggregatedDataset, GatherError> {
    let output_dir = output_dir.as_ref();
    tracing::info!(path = %output_dir.display(), "gather_started");

    let discovered = discover_artifacts(output_dir)?;
    if discovered.is_empty() {
        tracing::warn!(path = %output_dir.display(), "no_artifacts_found");
        return Err(GatherError::NoArtifacts {
            path: output_dir.to_path_buf(),
        });
    }

    let manifest = JobManifest::from_config(config, output_dir);
    let mut report = GatherReport {
        discovered: discovered.len(),
        missing_jobs: manifest.missing_jobs(&discovered),
        unexpected_jobs: discovered
            .iter()
            .map(|artifact| artifact.job_index)
            .filter(|&job_index| !manifest.contains(job_index))
            .collect(),
        ..GatherReport::default()
    };
    if !report.missing_jobs.is_empty() {
        tracing::warn!(
            missing = report.missing_jobs.len(),
            expected = config.total_job_count,
            first_missing = report.missing_jobs[0],
            "artifacts_missing"
        );
    }
    if !report.unexpected_jobs.is_empty() {
        tracing::warn!(
            unexpected = ?report.unexpected_jobs,
            expected = config.total_job_count,
            "artifacts_outside_manifest"
        );
    }

    let fingerprint = config_fingerprint(config);
    let mut r = Vec::new();
    let mut x = Vec::new();
    for artifact in discovered {
        match load_checked(&artifact, &fingerprint, config.total_job_count) {
            Ok(loaded) => {
                tracing::info!(
                    job_index = artifact.job_index,
                    points = loaded.x.len(),
                    path = %artifact.path.display(),
                    "artifact_loaded"
                );
                r.extend(loaded.r);
                x.extend(loaded.x);
                report.loaded_jobs.push(artifact.job_index);
            }
            Err(error) => {
                tracing::warn!(
                    job_index = artifact.job_index,
                    path = %artifact.path.display(),
                    error = %error,
                    "artifact_load_failed"
                );
                report.failed.push(FailedArtifact {
                    job_index: artifact.job_index,
                    path: artifact.path,
                    error,
                });
            }
        }
    }

    if x.is_empty() {
        tracing::warn!(
            discovered = report.discovered,
            failed = report.failed.len(),
            "no_data_collected"
        );
        return Err(GatherError::NoData { report });
    }

    tracing::info!(
        points = x.len(),
        loaded = report.loaded_jobs.len(),
        failed = report.failed.len(),
        missing = report.missing_jobs.len(),
        "gather_completed"
    );
    Ok(AggregatedDataset { r, x, report })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovery_sorts_numerically_and_ignores_foreign_files() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        for name in [
            "results_10.parquet",
            "results_2.parquet",
            "results_1.parquet",
            "notes.txt",
            "results_x.parquet",
        ] {
            fs::write(temp.path().join(name), b"").expect("write should pass");
        }
        fs::create_dir(temp.path().join("results_3.parquet")).expect("mkdir should pass");

        let discovered = discover_artifacts(temp.path()).expect("discovery should pass");
        let indices: Vec<usize> = discovered.iter().map(|a| a.job_index).collect();
        assert_eq!(indices, vec![1, 2, 10]);
    }

    #[test]
    fn discovery_of_missing_directory_is_empty() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let discovered =
            discover_artifacts(temp.path().join("absent")).expect("discovery should pass");
        assert!(discovered.is_empty());
    }

    #[test]
    fn manifest_reports_missing_jobs() {
        let config = SweepConfig::default().with_total_job_count(4);
        let manifest = JobManifest::from_config(&config, "out");
        let discovered = vec![
            DiscoveredArtifact {
                job_index: 0,
                path: manifest.artifact_path(0),
            },
            DiscoveredArtifact {
                job_index: 2,
                path: manifest.artifact_path(2),
            },
            DiscoveredArtifact {
                job_index: 9,
                path: manifest.artifact_path(9),
            },
        ];

        assert_eq!(manifest.missing_jobs(&discovered), vec![1, 3]);
        assert!(manifest.contains(3));
        assert!(!manifest.contains(9));
    }

    #[test]
    fn gather_without_artifacts_is_no_artifacts_error() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let error = gather(&SweepConfig::default(), temp.path()).expect_err("gather should fail");
        assert!(matches!(error, GatherError::NoArtifacts { .. }));
    }

    #[test]
    fn gather_with_only_corrupt_artifacts_is_no_data_error() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        fs::write(temp.path().join("results_0.parquet"), b"garbage").expect("write should pass");

        let error = gather(&SweepConfig::default(), temp.path()).expect_err("gather should fail");
        match error {
            GatherError::NoData { report } => {
                assert_eq!(report.discovered, 1);
                assert_eq!(report.failed.len(), 1);
                assert_eq!(report.failed[0].job_index, 0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
