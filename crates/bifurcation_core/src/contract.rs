use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

pub const ARTIFACT_SCHEMA_VERSION: &str = "v1";
pub const DEFAULT_OUTPUT_DIR: &str = "bifurcation_data";

pub const DEFAULT_R_MIN: f64 = 0.0;
pub const DEFAULT_R_MAX: f64 = 4.0;
pub const DEFAULT_TOTAL_R_COUNT: usize = 5_000;
pub const DEFAULT_INITIAL_X: f64 = 0.5;
pub const DEFAULT_WARMUP_ITERATIONS: usize = 1_000;
pub const DEFAULT_SAMPLE_ITERATIONS: usize = 100;
pub const DEFAULT_TOTAL_JOB_COUNT: usize = 500;

/// Global parameters of one bifurcation sweep.
///
/// Built once at startup and handed to both the worker and the aggregator so
/// the two sides can never disagree about the sweep they describe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepConfig {
    pub r_min: f64,
    pub r_max: f64,
    pub total_r_count: usize,
    pub initial_x: f64,
    pub warmup_iterations: usize,
    pub sample_iterations: usize,
    pub total_job_count: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            r_min: DEFAULT_R_MIN,
            r_max: DEFAULT_R_MAX,
            total_r_count: DEFAULT_TOTAL_R_COUNT,
            initial_x: DEFAULT_INITIAL_X,
            warmup_iterations: DEFAULT_WARMUP_ITERATIONS,
            sample_iterations: DEFAULT_SAMPLE_ITERATIONS,
            total_job_count: DEFAULT_TOTAL_JOB_COUNT,
        }
    }
}

impl SweepConfig {
    pub fn with_total_job_count(mut self, total_job_count: usize) -> Self {
        self.total_job_count = total_job_count;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.total_r_count == 0 {
            return Err(ConfigurationError::EmptySweep);
        }
        if self.total_job_count == 0 {
            return Err(ConfigurationError::NoJobs);
        }
        if !self.r_min.is_finite() || !self.r_max.is_finite() {
            return Err(ConfigurationError::NonFiniteBounds {
                r_min: self.r_min,
                r_max: self.r_max,
            });
        }
        if self.r_min >= self.r_max {
            return Err(ConfigurationError::InvertedBounds {
                r_min: self.r_min,
                r_max: self.r_max,
            });
        }
        Ok(())
    }

    /// Validates the config and checks that `job_index` names one of its jobs.
    pub fn validate_job(&self, job_index: usize) -> Result<(), ConfigurationError> {
        self.validate()?;
        if job_index >= self.total_job_count {
            return Err(ConfigurationError::JobIndexOutOfRange {
                job_index,
                total_jobs: self.total_job_count,
            });
        }
        Ok(())
    }

    /// Number of (r, x) points a full sweep produces across all jobs.
    pub fn total_points(&self) -> usize {
        self.total_r_count.saturating_mul(self.sample_iterations)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("total_r_count must be a positive integer")]
    EmptySweep,
    #[error("total_jobs must be a positive integer")]
    NoJobs,
    #[error("r bounds must be finite (r_min={r_min}, r_max={r_max})")]
    NonFiniteBounds { r_min: f64, r_max: f64 },
    #[error("r_min must be strictly less than r_max (r_min={r_min}, r_max={r_max})")]
    InvertedBounds { r_min: f64, r_max: f64 },
    #[error("job_index {job_index} is out of range for {total_jobs} jobs")]
    JobIndexOutOfRange { job_index: usize, total_jobs: usize },
    #[error("job plan is inconsistent: {0}")]
    InconsistentPlan(String),
}

/// The subset of [`SweepConfig`] that determines the numeric content of an
/// artifact. The job count is excluded: it only changes how work is split.
///
/// Floats are recorded by bit pattern; JSON has no encoding for NaN or the
/// infinities and would collapse them all to `null`.
#[derive(Serialize)]
struct SweepFingerprintFields<'a> {
    schema_version: &'a str,
    r_min_bits: u64,
    r_max_bits: u64,
    total_r_count: usize,
    initial_x_bits: u64,
    warmup_iterations: usize,
    sample_iterations: usize,
}

pub fn config_fingerprint(config: &SweepConfig) -> String {
    let fields = SweepFingerprintFields {
        schema_version: ARTIFACT_SCHEMA_VERSION,
        r_min_bits: config.r_min.to_bits(),
        r_max_bits: config.r_max.to_bits(),
        total_r_count: config.total_r_count,
        initial_x_bits: config.initial_x.to_bits(),
        warmup_iterations: config.warmup_iterations,
        sample_iterations: config.sample_iterations,
    };
    let mut hasher = Sha256::new();
    hasher.update(stable_contract_json(&fields));
    format!("{:x}", hasher.finalize())
}

pub fn stable_contract_json(value: impl Serialize) -> String {
    serde_json::to_string(&value).expect("serialization of contract value should not fail")
}
