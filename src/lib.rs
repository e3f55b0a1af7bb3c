//! Vehicle trajectory processing pipeline.
//!
//! This crate provides tools for:
//! - Loading 2D trajectories from NumPy `.npz` archives and CSV files
//! - Dropping samples with non-finite coordinates
//! - Edge-padded moving-average smoothing
//! - Nearest-segment and nearest-point queries against a trajectory
//!
//! # Example
//!
//! ```no_run
//! use trajectory_pipeline::{load_and_smooth, find_closest_segment_and_point};
//!
//! let smoothed = load_and_smooth("trajectory.npz", 5, None).unwrap();
//! let (segment, nearest) = find_closest_segment_and_point(&smoothed, &[12.0, 4.0]).unwrap();
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod processors;
pub mod visualization;

pub use config::{LoaderConfig, PipelineConfig, PlotConfig, ProjectionConfig, SmoothingConfig};
pub use core::loaders::{load_trajectory, Point, Trajectory};
pub use core::validation::ValidationError;
pub use processors::filtering::filter_trajectory;
pub use processors::pipeline::load_and_smooth;
pub use processors::projection::{find_closest_segment_and_point, project_point, Projection, Segment};
pub use processors::smoothing::smooth_trajectory;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
