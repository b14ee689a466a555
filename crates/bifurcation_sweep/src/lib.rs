//! Distributed bifurcation sweep: workers, artifacts and aggregation.
//!
//! Each worker computes the attractor of `x -> r * sin(x)` for its strided
//! slice of r-values and persists one parquet artifact. The aggregator later
//! merges whichever artifacts exist into a single point cloud and hands it to
//! a [`render::ScatterRenderer`].
//!
//! # Quick Start
//!
//! ```no_run
//! use bifurcation_core::SweepConfig;
//! use bifurcation_sweep::{gather, run_job};
//!
//! let config = SweepConfig::default().with_total_job_count(4);
//! for job_index in 0..4 {
//!     run_job(&config, job_index, "bifurcation_data").unwrap();
//! }
//! let dataset = gather(&config, "bifurcation_data").unwrap();
//! println!("{} points", dataset.len());
//! ```
//!
//! # Architecture
//!
//! - [`worker`]: pure per-job computation plus artifact persistence
//! - [`artifact`]: parquet codec for partial results
//! - [`gather`]: discovery, ordered merge and completeness report
//! - [`render`]: rendering seam and non-finite point policy
//! - [`runner`]: local stand-in for the batch scheduler using rayon
//! - [`logging`]: tracing subscriber setup shared by the binaries

pub mod artifact;
pub mod gather;
pub mod logging;
pub mod render;
pub mod runner;
pub mod worker;

pub use artifact::{read_artifact, write_artifact, ArtifactError, LoadedArtifact};
pub use gather::{
    discover_artifacts, gather, AggregatedDataset, DiscoveredArtifact, FailedArtifact, GatherError,
    GatherReport, JobManifest, LoadFailure,
};
pub use render::{gather_and_render, GatherRenderError, RenderError, Scatter, ScatterRenderer};
pub use runner::run_local_sweep;
pub use worker::{compute_partial_result, run_job, JobSummary, PartialResult, WorkerError};
