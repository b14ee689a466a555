use serde::{Deserialize, Serialize};

use crate::contract::{ConfigurationError, SweepConfig};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobAssignment {
    pub job_index: usize,
    pub total_jobs: usize,
    /// Positions into the full r-value sweep owned by this job, ascending.
    pub positions: Vec<usize>,
}

/// Evenly spaced r-values over `[r_min, r_max]`, both endpoints included.
pub fn r_values(config: &SweepConfig) -> Vec<f64> {
    let count = config.total_r_count;
    match count {
        0 => Vec::new(),
        1 => vec![config.r_min],
        _ => {
            let step = (config.r_max - config.r_min) / (count - 1) as f64;
            let mut values: Vec<f64> = (0..count)
                .map(|index| config.r_min + index as f64 * step)
                .collect();
            values[count - 1] = config.r_max;
            values
        }
    }
}

/// Positions `job_index, job_index + total_jobs, ...` below `total_r_count`.
pub fn job_positions(total_r_count: usize, job_index: usize, total_jobs: usize) -> Vec<usize> {
    if total_jobs == 0 {
        return Vec::new();
    }
    (job_index..total_r_count).step_by(total_jobs).collect()
}

/// The r-values owned by `job_index` under strided assignment.
///
/// Jobs whose index is at least `total_r_count` get an empty slice; that only
/// happens when more jobs than r-values were requested.
pub fn job_slice(config: &SweepConfig, job_index: usize) -> Result<Vec<f64>, ConfigurationError> {
    config.validate_job(job_index)?;
    let values = r_values(config);
    Ok(job_positions(config.total_r_count, job_index, config.total_job_count)
        .into_iter()
        .map(|position| values[position])
        .collect())
}

pub fn compute_job_plan(config: &SweepConfig) -> Result<Vec<JobAssignment>, ConfigurationError> {
    config.validate()?;

    let total_jobs = config.total_job_count;
    let assignments: Vec<JobAssignment> = (0..total_jobs)
        .map(|job_index| JobAssignment {
            job_index,
            total_jobs,
            positions: job_positions(config.total_r_count, job_index, total_jobs),
        })
        .collect();

    validate_assignments(config.total_r_count, &assignments)?;
    Ok(assignments)
}

fn validate_assignments(
    total_r_count: usize,
    assignments: &[JobAssignment],
) -> Result<(), ConfigurationError> {
    if assignments.is_empty() {
        return Err(ConfigurationError::NoJobs);
    }

    let mut owner: Vec<Option<usize>> = vec![None; total_r_count];
    for assignment in assignments {
        for &position in &assignment.positions {
            let Some(slot) = owner.get_mut(position) else {
                return Err(ConfigurationError::InconsistentPlan(format!(
                    "job {} owns position {position} past the end of the sweep",
                    assignment.job_index
                )));
            };
            if let Some(previous) = slot.replace(assignment.job_index) {
                return Err(ConfigurationError::InconsistentPlan(format!(
                    "position {position} assigned to both job {previous} and job {}",
                    assignment.job_index
                )));
            }
        }
    }

    if let Some(position) = owner.iter().position(Option::is_none) {
        return Err(ConfigurationError::InconsistentPlan(format!(
            "position {position} is not assigned to any job"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(total_r_count: usize, total_job_count: usize) -> SweepConfig {
        SweepConfig {
            r_min: 0.0,
            r_max: 4.0,
            total_r_count,
            initial_x: 0.5,
            warmup_iterations: 1,
            sample_iterations: 2,
            total_job_count,
        }
    }

    #[test]
    fn r_values_include_both_endpoints() {
        let values = r_values(&small_config(5, 1));
        assert_eq!(values, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn r_values_single_point_is_r_min() {
        assert_eq!(r_values(&small_config(1, 1)), vec![0.0]);
    }

    #[test]
    fn r_values_are_bit_identical_across_calls() {
        let config = SweepConfig::default();
        let first: Vec<u64> = r_values(&config).iter().map(|v| v.to_bits()).collect();
        let second: Vec<u64> = r_values(&config).iter().map(|v| v.to_bits()).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), config.total_r_count);
    }

    #[test]
    fn strided_positions_follow_job_index() {
        assert_eq!(job_positions(10, 0, 2), vec![0, 2, 4, 6, 8]);
        assert_eq!(job_positions(10, 1, 2), vec![1, 3, 5, 7, 9]);
        assert_eq!(job_positions(10, 3, 4), vec![3, 7]);
        assert!(job_positions(3, 5, 8).is_empty());
    }

    #[test]
    fn single_job_owns_the_whole_sweep() {
        let config = small_config(10, 1);
        let slice = job_slice(&config, 0).expect("slice should pass");
        assert_eq!(slice, r_values(&config));
    }

    #[test]
    fn job_plans_partition_the_sweep_for_many_job_counts() {
        for total_r_count in [1, 2, 7, 10, 64] {
            for total_jobs in 1..=12 {
                let config = small_config(total_r_count, total_jobs);
                let plan = compute_job_plan(&config).expect("plan should pass");
                assert_eq!(plan.len(), total_jobs);

                let mut positions: Vec<usize> =
                    plan.iter().flat_map(|a| a.positions.clone()).collect();
                positions.sort_unstable();
                assert_eq!(positions, (0..total_r_count).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn job_slice_rejects_out_of_range_index() {
        let config = small_config(10, 2);
        let error = job_slice(&config, 2).expect_err("index 2 of 2 should fail");
        assert_eq!(
            error,
            ConfigurationError::JobIndexOutOfRange {
                job_index: 2,
                total_jobs: 2
            }
        );
    }

    #[test]
    fn more_jobs_than_values_yields_empty_tail_slices() {
        let config = small_config(3, 5);
        assert_eq!(job_slice(&config, 2).expect("in range").len(), 1);
        assert!(job_slice(&config, 4).expect("in range").is_empty());
    }

    #[test]
    fn validate_assignments_detects_overlap_and_gaps() {
        let overlapping = vec![
            JobAssignment {
                job_index: 0,
                total_jobs: 2,
                positions: vec![0, 1],
            },
            JobAssignment {
                job_index: 1,
                total_jobs: 2,
                positions: vec![1],
            },
        ];
        let error = validate_assignments(2, &overlapping).expect_err("overlap should fail");
        assert_eq!(
            error.to_string(),
            "job plan is inconsistent: position 1 assigned to both job 0 and job 1"
        );

        let gapped = vec![JobAssignment {
            job_index: 0,
            total_jobs: 1,
            positions: vec![0],
        }];
        assert!(validate_assignments(2, &gapped).is_err());
    }
}
