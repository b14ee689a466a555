//! Shared bifurcation sweep domain primitives.
//!
//! This crate owns the sweep configuration, the strided job plan, the sine map
//! itself and the artifact naming convention. It intentionally performs no I/O;
//! persistence and rendering live in `bifurcation_sweep` and `bifurcation_plot`.

pub mod contract;
pub mod sharding;
pub mod sine_map;
pub mod storage_keys;

pub use contract::{config_fingerprint, ConfigurationError, SweepConfig};
pub use sharding::{compute_job_plan, job_positions, job_slice, r_values, JobAssignment};
pub use sine_map::{simulate, sine_map, AttractorSample};
