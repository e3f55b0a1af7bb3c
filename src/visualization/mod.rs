//! Visualization tools for trajectories.
//!
//! This module renders 2D plots of trajectories and nearest-segment queries
//! to PNG using the plotters library.

use std::path::Path;

use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use thiserror::Error;

use crate::config::PlotConfig;
use crate::core::loaders::{Point, Trajectory};
use crate::processors::projection::Projection;

/// Errors that can occur during visualization.
#[derive(Error, Debug)]
pub enum VisualizationError {
    #[error("Plotting error: {0}")]
    PlottingError(String),

    #[error("Empty trajectory")]
    EmptyTrajectory,
}

/// Result type for visualization operations.
pub type Result<T> = std::result::Result<T, VisualizationError>;

/// Marker color for filtered samples.
const SAMPLE_COLOR: RGBColor = RGBColor(228, 26, 28);

/// Line color for the smoothed path.
const SMOOTHED_COLOR: RGBColor = RGBColor(55, 126, 184);

/// Highlight color for the chosen segment.
const SEGMENT_COLOR: RGBColor = RGBColor(77, 175, 74);

/// Color for the query point and its projection.
const QUERY_COLOR: RGBColor = RGBColor(255, 127, 0);

/// Plot filtered samples as markers and, optionally, the smoothed path as a line.
///
/// # Arguments
///
/// * `output_path` - Path to save the PNG image
/// * `filtered` - Finite trajectory samples
/// * `smoothed` - Smoothed trajectory to overlay, if any
/// * `config` - Image size and per-series point limit
pub fn plot_trajectory(
    output_path: &Path,
    filtered: &Trajectory,
    smoothed: Option<&Trajectory>,
    config: &PlotConfig,
) -> Result<()> {
    if filtered.is_empty() {
        return Err(VisualizationError::EmptyTrajectory);
    }

    let samples = subsample(filtered, config.max_points);
    let line = smoothed.map(|t| subsample(t, config.max_points));

    let bounds = compute_bounds(samples.iter().chain(line.iter().flatten()).copied());

    let root = BitMapBackend::new(output_path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE).map_err(plotting_error)?;

    let mut chart = build_chart(&root, bounds)?;

    chart
        .draw_series(
            samples
                .iter()
                .map(|&(x, y)| Cross::new((x, y), 4, SAMPLE_COLOR.stroke_width(1))),
        )
        .map_err(plotting_error)?;

    if let Some(line) = line {
        chart
            .draw_series(LineSeries::new(line, SMOOTHED_COLOR.stroke_width(2)))
            .map_err(plotting_error)?;
    }

    root.present().map_err(plotting_error)?;

    Ok(())
}

/// Plot a trajectory with a query point, its closest segment and projection.
pub fn plot_projection(
    output_path: &Path,
    trajectory: &Trajectory,
    query: Point,
    projection: &Projection,
    config: &PlotConfig,
) -> Result<()> {
    if trajectory.is_empty() {
        return Err(VisualizationError::EmptyTrajectory);
    }

    let path = subsample(trajectory, config.max_points);
    let bounds = compute_bounds(path.iter().copied().chain(std::iter::once((query.x, query.y))));

    let root = BitMapBackend::new(output_path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE).map_err(plotting_error)?;

    let mut chart = build_chart(&root, bounds)?;

    chart
        .draw_series(LineSeries::new(path, SMOOTHED_COLOR.stroke_width(1)))
        .map_err(plotting_error)?;

    let segment = &projection.segment;
    chart
        .draw_series(LineSeries::new(
            [(segment.start.x, segment.start.y), (segment.end.x, segment.end.y)],
            SEGMENT_COLOR.stroke_width(4),
        ))
        .map_err(plotting_error)?;

    // Connector from query to its projection
    chart
        .draw_series(LineSeries::new(
            [(query.x, query.y), (projection.nearest.x, projection.nearest.y)],
            QUERY_COLOR.stroke_width(1),
        ))
        .map_err(plotting_error)?;

    chart
        .draw_series([
            Circle::new((query.x, query.y), 5, QUERY_COLOR.filled()),
            Circle::new((projection.nearest.x, projection.nearest.y), 5, SEGMENT_COLOR.filled()),
        ])
        .map_err(plotting_error)?;

    root.present().map_err(plotting_error)?;

    Ok(())
}

type Chart<'a, 'b> = ChartContext<
    'a,
    BitMapBackend<'b>,
    Cartesian2d<plotters::coord::types::RangedCoordf64, plotters::coord::types::RangedCoordf64>,
>;

fn build_chart<'a, 'b>(
    root: &'a DrawingArea<BitMapBackend<'b>, plotters::coord::Shift>,
    (x_min, x_max, y_min, y_max): (f64, f64, f64, f64),
) -> Result<Chart<'a, 'b>> {
    let x_padding = (x_max - x_min) * 0.05;
    let y_padding = (y_max - y_min) * 0.05;

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .build_cartesian_2d(
            (x_min - x_padding)..(x_max + x_padding),
            (y_min - y_padding)..(y_max + y_padding),
        )
        .map_err(plotting_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .draw()
        .map_err(plotting_error)?;

    Ok(chart)
}

fn plotting_error<E: std::fmt::Display>(e: E) -> VisualizationError {
    VisualizationError::PlottingError(e.to_string())
}

/// Keep at most roughly `max_points` points by taking every n-th one.
fn subsample(trajectory: &Trajectory, max_points: usize) -> Vec<(f64, f64)> {
    let n = trajectory.len();
    let step = if max_points > 0 && n > max_points {
        n / max_points
    } else {
        1
    };

    trajectory.points().step_by(step).map(|p| (p.x, p.y)).collect()
}

/// Compute the bounds (min/max) for x and y coordinates.
fn compute_bounds(points: impl Iterator<Item = (f64, f64)>) -> (f64, f64, f64, f64) {
    let mut x_min = f64::MAX;
    let mut x_max = f64::MIN;
    let mut y_min = f64::MAX;
    let mut y_max = f64::MIN;

    for (x, y) in points {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    if (x_max - x_min).abs() < f64::EPSILON {
        x_min -= 1.0;
        x_max += 1.0;
    }
    if (y_max - y_min).abs() < f64::EPSILON {
        y_min -= 1.0;
        y_max += 1.0;
    }

    (x_min, x_max, y_min, y_max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::projection::project_point;
    use tempfile::tempdir;

    #[test]
    fn test_compute_bounds() {
        let bounds = compute_bounds([(0.0, -1.0), (4.0, 2.0), (-3.0, 0.5)].into_iter());
        assert_eq!(bounds, (-3.0, 4.0, -1.0, 2.0));
    }

    #[test]
    fn test_compute_bounds_degenerate_extent() {
        let bounds = compute_bounds([(2.0, 5.0), (2.0, 5.0)].into_iter());
        assert_eq!(bounds, (1.0, 3.0, 4.0, 6.0));
    }

    #[test]
    fn test_subsample() {
        let trajectory = Trajectory::from_xy((0..10).map(f64::from).collect(), vec![0.0; 10]);

        assert_eq!(subsample(&trajectory, 100).len(), 10);
        let reduced = subsample(&trajectory, 5);
        assert_eq!(reduced.len(), 5);
        assert_eq!(reduced[1], (2.0, 0.0));
    }

    #[test]
    fn test_plot_trajectory_rejects_empty() {
        let dir = tempdir().unwrap();
        let result = plot_trajectory(
            &dir.path().join("empty.png"),
            &Trajectory::new(),
            None,
            &PlotConfig::default(),
        );
        assert!(matches!(result, Err(VisualizationError::EmptyTrajectory)));
    }

    #[test]
    fn test_plot_projection_rejects_empty() {
        let dir = tempdir().unwrap();
        let corner = Trajectory::from_coords(&[[0.0, 0.0], [10.0, 0.0]]);
        let projection = project_point(&corner, &[1.0, 1.0]).unwrap();

        let result = plot_projection(
            &dir.path().join("empty.png"),
            &Trajectory::new(),
            Point::new(1.0, 1.0),
            &projection,
            &PlotConfig::default(),
        );
        assert!(matches!(result, Err(VisualizationError::EmptyTrajectory)));
    }
}
