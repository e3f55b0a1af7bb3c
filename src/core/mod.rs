//! Core data types and I/O operations.

pub mod loaders;
pub mod validation;
pub mod writers;

pub use loaders::{LoaderError, Point, Trajectory};
pub use validation::ValidationError;
pub use writers::{write_projection_csv, write_trajectory_csv, write_trajectory_npz, WriteError};
