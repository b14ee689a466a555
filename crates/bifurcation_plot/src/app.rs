use eframe::egui::{self, Color32};
use egui_plot::{Plot, PlotPoint, PlotPoints, Points};

use bifurcation_sweep::{RenderError, Scatter, ScatterRenderer};

const WINDOW_TITLE: &str = "Bifurcation Map";
const POINT_RADIUS: f32 = 0.5;

/// Shows the scatter in a native window and blocks until it is closed.
#[derive(Debug, Default)]
pub struct EguiScatterRenderer;

impl ScatterRenderer for EguiScatterRenderer {
    fn render(&mut self, scatter: &Scatter) -> Result<(), RenderError> {
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
            ..Default::default()
        };
        let app = BifurcationPlotApp::new(scatter.clone());
        eframe::run_native(
            WINDOW_TITLE,
            options,
            Box::new(move |cc| {
                cc.egui_ctx.set_visuals(egui::Visuals::light());
                Ok(Box::new(app))
            }),
        )
        .map_err(|error| RenderError::Backend(error.to_string()))
    }
}

struct BifurcationPlotApp {
    scatter: Scatter,
    /// Converted once at construction; frames only borrow it.
    plot_points: Vec<PlotPoint>,
}

impl BifurcationPlotApp {
    fn new(scatter: Scatter) -> Self {
        let plot_points = to_plot_points(&scatter);
        Self {
            scatter,
            plot_points,
        }
    }
}

fn to_plot_points(scatter: &Scatter) -> Vec<PlotPoint> {
    scatter
        .points
        .iter()
        .map(|&[r, x]| PlotPoint::new(r, x))
        .collect()
}

fn status_line(scatter: &Scatter) -> String {
    let mut status = format!("{} points", scatter.points.len());
    if scatter.skipped_non_finite > 0 {
        status.push_str(&format!(
            " ({} non-finite samples not shown)",
            scatter.skipped_non_finite
        ));
    }
    status
}

impl eframe::App for BifurcationPlotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("title").show(ctx, |ui| {
            ui.heading(&self.scatter.title);
            ui.label(status_line(&self.scatter));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            Plot::new("bifurcation_plot")
                .x_axis_label(self.scatter.x_label.clone())
                .y_axis_label(self.scatter.y_label.clone())
                .show(ui, |plot_ui| {
                    plot_ui.points(
                        Points::new("x", PlotPoints::Borrowed(&self.plot_points))
                            .radius(POINT_RADIUS)
                            .color(Color32::from_black_alpha(128)),
                    );
                });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scatter(points: Vec<[f64; 2]>, skipped_non_finite: usize) -> Scatter {
        Scatter {
            title: "title".to_string(),
            x_label: "r".to_string(),
            y_label: "x".to_string(),
            points,
            skipped_non_finite,
        }
    }

    #[test]
    fn status_line_counts_points() {
        assert_eq!(status_line(&scatter(vec![[1.0, 0.5]; 3], 0)), "3 points");
    }

    #[test]
    fn status_line_mentions_hidden_samples() {
        assert_eq!(
            status_line(&scatter(vec![[1.0, 0.5]], 2)),
            "1 points (2 non-finite samples not shown)"
        );
    }

    #[test]
    fn app_converts_points_once_in_order() {
        let app = BifurcationPlotApp::new(scatter(vec![[1.0, 0.5], [2.5, -0.25]], 0));

        let converted: Vec<(f64, f64)> = app.plot_points.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(converted, vec![(1.0, 0.5), (2.5, -0.25)]);
        assert_eq!(app.scatter.points.len(), 2);
    }
}
