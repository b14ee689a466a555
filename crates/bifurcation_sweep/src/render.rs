//! Rendering seam for the aggregated point cloud.
//!
//! Diverging orbits leave inf/NaN samples in the dataset. They are kept in
//! [`AggregatedDataset`] and dropped here, at the render boundary, where they
//! are counted and logged.

use std::path::Path;

use bifurcation_core::contract::SweepConfig;
use thiserror::Error;

use crate::gather::{gather, AggregatedDataset, GatherError};

pub const PLOT_TITLE: &str = "Bifurcation Map of x_{n+1} = r · sin(x_n)";
pub const X_AXIS_LABEL: &str = "Parameter r";
pub const Y_AXIS_LABEL: &str = "x_{n+1} values (long-term behavior)";

/// Plot-ready scatter of finite (r, x) points.
#[derive(Debug, Clone, PartialEq)]
pub struct Scatter {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<[f64; 2]>,
    pub skipped_non_finite: usize,
}

impl Scatter {
    pub fn from_dataset(dataset: &AggregatedDataset) -> Self {
        let mut points = Vec::with_capacity(dataset.len());
        let mut skipped_non_finite = 0;
        for (r, x) in dataset.points() {
            if r.is_finite() && x.is_finite() {
                points.push([r, x]);
            } else {
                skipped_non_finite += 1;
            }
        }

        Self {
            title: PLOT_TITLE.to_string(),
            x_label: X_AXIS_LABEL.to_string(),
            y_label: Y_AXIS_LABEL.to_string(),
            points,
            skipped_non_finite,
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("renderer failed: {0}")]
    Backend(String),
}

pub trait ScatterRenderer {
    fn render(&mut self, scatter: &Scatter) -> Result<(), RenderError>;
}

#[derive(Debug, Error)]
pub enum GatherRenderError {
    #[error(transparent)]
    Gather(#[from] GatherError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Gathers `output_dir` and renders the result.
///
/// The renderer is not invoked when gathering fails.
pub fn gather_and_render(
    config: &SweepConfig,
    output_dir: impl AsRef<Path>,
    renderer: &mut impl ScatterRenderer,
) -> Result<AggregatedDataset, GatherRenderError> {
    let dataset = gather(config, output_dir)?;
    let scatter = Scatter::from_dataset(&dataset);
    if scatter.skipped_non_finite > 0 {
        tracing::warn!(
            skipped = scatter.skipped_non_finite,
            kept = scatter.points.len(),
            "non_finite_points_skipped"
        );
    }

    tracing::info!(points = scatter.points.len(), "render_started");
    renderer.render(&scatter)?;
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gather::GatherReport;

    #[test]
    fn scatter_filters_non_finite_points() {
        let dataset = AggregatedDataset {
            r: vec![1.0, 2.0, 3.0, f64::NAN],
            x: vec![0.5, f64::INFINITY, f64::NAN, 0.1],
            report: GatherReport::default(),
        };

        let scatter = Scatter::from_dataset(&dataset);
        assert_eq!(scatter.points, vec![[1.0, 0.5]]);
        assert_eq!(scatter.skipped_non_finite, 3);
        assert_eq!(scatter.title, PLOT_TITLE);
        assert_eq!(scatter.x_label, "Parameter r");
    }
}
