//! Data writers for trajectories and projection results.
//!
//! This module provides functions for persisting pipeline output:
//! - CSV with `x,y` columns, one row per point
//! - NumPy `.npz` archives holding an (N, 2) array under a named key
//! - A one-row CSV summary of a nearest-segment query

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use ndarray::Array2;
use ndarray_npy::{NpzWriter, WriteNpzError};
use thiserror::Error;

use super::loaders::Trajectory;
use crate::processors::projection::Projection;

/// Errors that can occur during write operations.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Failed to create parent directories.
    #[error("failed to create parent directories for '{path}': {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or open file for writing.
    #[error("failed to create file '{path}': {source}")]
    CreateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write data to file.
    #[error("failed to write to file '{path}': {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV writing error.
    #[error("CSV write error for '{path}': {source}")]
    CsvError {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// NPZ writing error.
    #[error("NPZ write error for '{path}': {source}")]
    NpzError {
        path: String,
        #[source]
        source: WriteNpzError,
    },
}

/// Result type for write operations.
pub type Result<T> = std::result::Result<T, WriteError>;

/// Creates parent directories for a file path if they don't exist.
fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| WriteError::CreateDirectory {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
    }
    Ok(())
}

fn create_csv_writer(path: &Path) -> Result<csv::Writer<BufWriter<File>>> {
    ensure_parent_dirs(path)?;
    let file = File::create(path).map_err(|e| WriteError::CreateFile {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(csv::Writer::from_writer(BufWriter::new(file)))
}

/// Write a trajectory to CSV with `x,y` columns.
///
/// Values are written with six decimals. The file can be read back with
/// [`crate::core::loaders::load_trajectory_csv`].
///
/// # Errors
///
/// Returns an error if:
/// - Parent directories cannot be created
/// - File cannot be created or written to
///
/// # Example
///
/// ```no_run
/// use trajectory_pipeline::core::loaders::Trajectory;
/// use trajectory_pipeline::core::writers::write_trajectory_csv;
/// use std::path::Path;
///
/// let trajectory = Trajectory::from_coords(&[[0.0, 0.0], [1.0, 1.0]]);
/// write_trajectory_csv(Path::new("smoothed.csv"), &trajectory).unwrap();
/// ```
pub fn write_trajectory_csv(path: &Path, trajectory: &Trajectory) -> Result<()> {
    let mut csv_writer = create_csv_writer(path)?;
    let path_str = path.display().to_string();

    csv_writer
        .write_record(["x", "y"])
        .map_err(|e| WriteError::CsvError {
            path: path_str.clone(),
            source: e,
        })?;

    for point in trajectory.points() {
        csv_writer
            .write_record(&[format!("{:.6}", point.x), format!("{:.6}", point.y)])
            .map_err(|e| WriteError::CsvError {
                path: path_str.clone(),
                source: e,
            })?;
    }

    csv_writer.flush().map_err(|e| WriteError::WriteFile {
        path: path_str,
        source: e,
    })?;

    Ok(())
}

/// Write a trajectory to an `.npz` archive as an (N, 2) `f64` array.
pub fn write_trajectory_npz(path: &Path, trajectory: &Trajectory, key: &str) -> Result<()> {
    ensure_parent_dirs(path)?;
    let path_str = path.display().to_string();

    let file = File::create(path).map_err(|e| WriteError::CreateFile {
        path: path_str.clone(),
        source: e,
    })?;

    let array = Array2::from_shape_fn((trajectory.len(), 2), |(row, col)| {
        if col == 0 {
            trajectory.x[row]
        } else {
            trajectory.y[row]
        }
    });

    let mut npz = NpzWriter::new(file);
    npz.add_array(key, &array).map_err(|e| WriteError::NpzError {
        path: path_str.clone(),
        source: e,
    })?;
    npz.finish().map_err(|e| WriteError::NpzError {
        path: path_str,
        source: e,
    })?;

    Ok(())
}

/// Write the result of a nearest-segment query as a one-row CSV.
///
/// Columns: `query_x,query_y,segment_index,start_x,start_y,end_x,end_y,nearest_x,nearest_y,t,distance`.
pub fn write_projection_csv(path: &Path, query: [f64; 2], projection: &Projection) -> Result<()> {
    let mut csv_writer = create_csv_writer(path)?;
    let path_str = path.display().to_string();

    csv_writer
        .write_record([
            "query_x",
            "query_y",
            "segment_index",
            "start_x",
            "start_y",
            "end_x",
            "end_y",
            "nearest_x",
            "nearest_y",
            "t",
            "distance",
        ])
        .map_err(|e| WriteError::CsvError {
            path: path_str.clone(),
            source: e,
        })?;

    let segment = &projection.segment;
    csv_writer
        .write_record(&[
            format!("{:.6}", query[0]),
            format!("{:.6}", query[1]),
            projection.segment_index.to_string(),
            format!("{:.6}", segment.start.x),
            format!("{:.6}", segment.start.y),
            format!("{:.6}", segment.end.x),
            format!("{:.6}", segment.end.y),
            format!("{:.6}", projection.nearest.x),
            format!("{:.6}", projection.nearest.y),
            format!("{:.6}", projection.t),
            format!("{:.6}", projection.distance),
        ])
        .map_err(|e| WriteError::CsvError {
            path: path_str.clone(),
            source: e,
        })?;

    csv_writer.flush().map_err(|e| WriteError::WriteFile {
        path: path_str,
        source: e,
    })?;

    Ok(())
}
