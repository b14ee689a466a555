use std::path::{Path, PathBuf};

pub const ARTIFACT_PREFIX: &str = "results_";
pub const ARTIFACT_EXTENSION: &str = "parquet";

pub const METADATA_SCHEMA_VERSION: &str = "bifurcation.schema_version";
pub const METADATA_JOB_INDEX: &str = "bifurcation.job_index";
pub const METADATA_TOTAL_JOBS: &str = "bifurcation.total_jobs";
pub const METADATA_CONFIG_FINGERPRINT: &str = "bifurcation.config_fingerprint";

pub const COLUMN_R: &str = "r";
pub const COLUMN_X: &str = "x";

pub fn artifact_file_name(job_index: usize) -> String {
    format!("{ARTIFACT_PREFIX}{job_index}.{ARTIFACT_EXTENSION}")
}

pub fn artifact_path(output_dir: impl AsRef<Path>, job_index: usize) -> PathBuf {
    output_dir.as_ref().join(artifact_file_name(job_index))
}

/// Extracts the job index from a file name such as `results_12.parquet`.
///
/// Only plain decimal indices are accepted, so `results_.parquet`,
/// `results_-1.parquet` and `results_1.parquet.tmp` are all rejected.
pub fn parse_job_index(file_name: &str) -> Option<usize> {
    let stem = file_name
        .strip_prefix(ARTIFACT_PREFIX)?
        .strip_suffix(ARTIFACT_EXTENSION)?
        .strip_suffix('.')?;
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_artifact_path_under_output_dir() {
        let path = artifact_path("bifurcation_data", 42);
        assert_eq!(path, Path::new("bifurcation_data").join("results_42.parquet"));
    }

    #[test]
    fn parses_numeric_job_index() {
        assert_eq!(parse_job_index("results_0.parquet"), Some(0));
        assert_eq!(parse_job_index("results_10.parquet"), Some(10));
        assert_eq!(parse_job_index(&artifact_file_name(499)), Some(499));
    }

    #[test]
    fn rejects_names_outside_the_convention() {
        for name in [
            "results_.parquet",
            "results_-1.parquet",
            "results_1.npz",
            "results_1.parquet.tmp",
            "results_1parquet",
            "summary_1.parquet",
            "results_1a.parquet",
        ] {
            assert_eq!(parse_job_index(name), None, "{name} should be rejected");
        }
    }
}
