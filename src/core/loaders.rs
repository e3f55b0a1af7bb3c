//! Trajectory loaders for NumPy archives and CSV files.
//!
//! This module provides:
//! - The [`Point`] and [`Trajectory`] containers used by every stage
//! - An NPZ reader that extracts an (N, 2) array stored under a named key
//! - A CSV reader for `x,y` point tables
//!
//! Loaders only validate shape. Non-finite samples are kept and left for
//! [`crate::processors::filtering`] to remove.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use log::debug;
use ndarray::{ArrayD, Axis, IxDyn, OwnedRepr};
use ndarray_npy::{NpzReader, ReadNpzError};
use thiserror::Error;

use super::validation::{validate_array_shape, ValidationError};
use crate::config::LoaderConfig;

/// Errors that can occur during trajectory loading.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("NPZ read error: {0}")]
    Npz(#[from] ReadNpzError),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Array '{key}' not found in {path}")]
    MissingArray { key: String, path: PathBuf },

    #[error("Unsupported trajectory file: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// A single 2D sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// True when neither coordinate is NaN or infinite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl TryFrom<&[f64]> for Point {
    type Error = ValidationError;

    fn try_from(coords: &[f64]) -> std::result::Result<Self, Self::Error> {
        match coords {
            [x, y] => Ok(Self::new(*x, *y)),
            _ => Err(ValidationError::WrongPointDimensionality {
                found: coords.len(),
            }),
        }
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

/// Ordered sequence of 2D points, stored one vector per axis.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trajectory {
    /// X coordinates in traversal order.
    pub x: Vec<f64>,
    /// Y coordinates in traversal order.
    pub y: Vec<f64>,
}

impl Trajectory {
    /// Creates a new empty trajectory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a trajectory from coordinate vectors of equal length.
    pub fn from_xy(x: Vec<f64>, y: Vec<f64>) -> Self {
        debug_assert_eq!(x.len(), y.len(), "x and y must have same length");
        Self { x, y }
    }

    /// Creates a trajectory from `[x, y]` pairs.
    pub fn from_coords(coords: &[[f64; 2]]) -> Self {
        coords.iter().map(|&c| Point::from(c)).collect()
    }

    /// Creates a new trajectory with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            x: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    #[inline]
    pub fn push(&mut self, x: f64, y: f64) {
        self.x.push(x);
        self.y.push(y);
    }

    /// Returns the point at `index`, if any.
    #[inline]
    pub fn point(&self, index: usize) -> Option<Point> {
        Some(Point::new(*self.x.get(index)?, *self.y.get(index)?))
    }

    /// Iterates over the points in traversal order.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.x
            .iter()
            .zip(self.y.iter())
            .map(|(&x, &y)| Point::new(x, y))
    }

    /// Converts the trajectory to a vector of `[x, y]` pairs.
    pub fn to_coords(&self) -> Vec<[f64; 2]> {
        self.points().map(|p| [p.x, p.y]).collect()
    }
}

impl FromIterator<Point> for Trajectory {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        let mut trajectory = Trajectory::new();
        for p in iter {
            trajectory.push(p.x, p.y);
        }
        trajectory
    }
}

/// Load a raw trajectory from a `.npz` or `.csv` file.
///
/// The format is selected by file extension. The returned trajectory is in
/// stored order and has not been filtered or smoothed.
///
/// # Arguments
///
/// * `path` - Path to the trajectory file
/// * `config` - Loader configuration (uses defaults if None)
///
/// # Errors
///
/// Returns [`LoaderError::Validation`] when the stored array is not (N, 2)
/// with N >= 2, and other variants for I/O or format problems.
pub fn load_trajectory<P: AsRef<Path>>(path: P, config: Option<&LoaderConfig>) -> Result<Trajectory> {
    let path = path.as_ref();
    let default_config = LoaderConfig::default();
    let config = config.unwrap_or(&default_config);

    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let trajectory = match extension.as_str() {
        "npz" => load_trajectory_npz(path, &config.array_key)?,
        "csv" => load_trajectory_csv(path)?,
        _ => return Err(LoaderError::UnsupportedFormat(path.to_path_buf())),
    };

    debug!("Loaded {} points from {}", trajectory.len(), path.display());
    Ok(trajectory)
}

/// Load a trajectory from a NumPy `.npz` archive.
///
/// Reads the array stored under `key`. `f64` arrays are used directly and
/// `f32` arrays are widened.
pub fn load_trajectory_npz<P: AsRef<Path>>(path: P, key: &str) -> Result<Trajectory> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut npz = NpzReader::new(BufReader::new(file))?;

    let has_key = npz
        .names()?
        .iter()
        .any(|name| name == key || name.strip_suffix(".npy") == Some(key));
    if !has_key {
        return Err(LoaderError::MissingArray {
            key: key.to_string(),
            path: path.to_path_buf(),
        });
    }

    let array = read_as_f64(&mut npz, key)?;
    trajectory_from_array(&array)
}

/// Read `key` as `f64`, widening `f32`, `i64` and `i32` arrays.
///
/// When no dtype matches, the error from the `f64` attempt is returned.
fn read_as_f64<R: Read + Seek>(npz: &mut NpzReader<R>, key: &str) -> Result<ArrayD<f64>> {
    let f64_err = match npz.by_name::<OwnedRepr<f64>, IxDyn>(key) {
        Ok(array) => return Ok(array),
        Err(e) => e,
    };

    if let Ok(array) = npz.by_name::<OwnedRepr<f32>, IxDyn>(key) {
        return Ok(array.mapv(f64::from));
    }
    if let Ok(array) = npz.by_name::<OwnedRepr<i64>, IxDyn>(key) {
        return Ok(array.mapv(|v| v as f64));
    }
    if let Ok(array) = npz.by_name::<OwnedRepr<i32>, IxDyn>(key) {
        return Ok(array.mapv(f64::from));
    }

    Err(f64_err.into())
}

/// Validate a dynamic-rank array and split it into a trajectory.
pub fn trajectory_from_array(array: &ArrayD<f64>) -> Result<Trajectory> {
    validate_array_shape(array.shape())?;

    let x: Vec<f64> = array.index_axis(Axis(1), 0).iter().copied().collect();
    let y: Vec<f64> = array.index_axis(Axis(1), 1).iter().copied().collect();

    Ok(Trajectory::from_xy(x, y))
}

/// Load a trajectory from a CSV file with a header row and two columns.
///
/// Empty cells are read as NaN so that the filter stage drops them, the same
/// way `nan` or `inf` literals are handled.
pub fn load_trajectory_csv<P: AsRef<Path>>(path: P) -> Result<Trajectory> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let headers = reader.headers()?;
    if headers.len() != 2 {
        return Err(ValidationError::WrongColumnCount {
            found: headers.len(),
        }
        .into());
    }

    let mut trajectory = Trajectory::with_capacity(1024);

    for (row, result) in reader.records().enumerate() {
        let record = result?;
        if record.len() != 2 {
            return Err(ValidationError::WrongColumnCount {
                found: record.len(),
            }
            .into());
        }

        let x = parse_coordinate(&record[0], row, "x")?;
        let y = parse_coordinate(&record[1], row, "y")?;
        trajectory.push(x, y);
    }

    if trajectory.len() < 2 {
        return Err(ValidationError::TooFewPoints {
            found: trajectory.len(),
        }
        .into());
    }

    Ok(trajectory)
}

fn parse_coordinate(field: &str, row: usize, axis: &str) -> Result<f64> {
    let field = field.trim();
    if field.is_empty() {
        return Ok(f64::NAN);
    }
    field.parse().map_err(|_| {
        LoaderError::ParseError(format!("Invalid {} value on row {}: {}", axis, row + 1, field))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, Array1, Array2, Array3, Dimension};
    use ndarray_npy::{NpzWriter, WritableElement};
    use std::io::Write;
    use tempfile::{tempdir, Builder, NamedTempFile};

    fn write_npz<T, D>(path: &Path, key: &str, array: &Array<T, D>)
    where
        T: WritableElement,
        D: Dimension,
    {
        let mut npz = NpzWriter::new(File::create(path).unwrap());
        npz.add_array(key, array).unwrap();
        npz.finish().unwrap();
    }

    fn csv_file() -> NamedTempFile {
        Builder::new().suffix(".csv").tempfile().unwrap()
    }

    #[test]
    fn test_trajectory_operations() {
        let mut trajectory = Trajectory::new();
        assert!(trajectory.is_empty());

        trajectory.push(1.0, 2.0);
        trajectory.push(3.0, 4.0);

        assert_eq!(trajectory.len(), 2);
        assert_eq!(trajectory.point(1), Some(Point::new(3.0, 4.0)));
        assert_eq!(trajectory.point(2), None);
        assert_eq!(trajectory.to_coords(), vec![[1.0, 2.0], [3.0, 4.0]]);
    }

    #[test]
    fn test_point_from_slice() {
        let p = Point::try_from(&[1.5, -2.0][..]).unwrap();
        assert_eq!(p, Point::new(1.5, -2.0));

        let err = Point::try_from(&[1.0, 2.0, 3.0][..]).unwrap_err();
        assert_eq!(err, ValidationError::WrongPointDimensionality { found: 3 });
    }

    #[test]
    fn test_point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_load_npz() -> Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trajectory.npz");
        let array = Array2::from_shape_vec((3, 2), vec![0.0, 0.0, 1.0, 2.0, 3.0, f64::NAN]).unwrap();
        write_npz(&path, "path", &array);

        let trajectory = load_trajectory(&path, None)?;
        assert_eq!(trajectory.len(), 3);
        assert_eq!(trajectory.x, vec![0.0, 1.0, 3.0]);
        assert_eq!(trajectory.y[1], 2.0);
        assert!(trajectory.y[2].is_nan());

        Ok(())
    }

    #[test]
    fn test_load_npz_f32_widened() -> Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trajectory.npz");
        let array = Array2::from_shape_vec((2, 2), vec![0.5f32, 1.0, 2.5, 3.0]).unwrap();
        write_npz(&path, "path", &array);

        let trajectory = load_trajectory(&path, None)?;
        assert_eq!(trajectory.x, vec![0.5, 2.5]);
        assert_eq!(trajectory.y, vec![1.0, 3.0]);

        Ok(())
    }

    #[test]
    fn test_load_npz_integer_widened() -> Result<()> {
        let dir = tempdir().unwrap();

        let path = dir.path().join("i64.npz");
        let array: Array2<i64> = Array2::from_shape_vec((2, 2), vec![0, 0, 10, 0]).unwrap();
        write_npz(&path, "path", &array);

        let trajectory = load_trajectory(&path, None)?;
        assert_eq!(trajectory.to_coords(), vec![[0.0, 0.0], [10.0, 0.0]]);

        let path = dir.path().join("i32.npz");
        let array: Array2<i32> = Array2::from_shape_vec((3, 2), vec![1, -2, 3, 4, -5, 6]).unwrap();
        write_npz(&path, "path", &array);

        let trajectory = load_trajectory(&path, None)?;
        assert_eq!(trajectory.x, vec![1.0, 3.0, -5.0]);
        assert_eq!(trajectory.y, vec![-2.0, 4.0, 6.0]);

        Ok(())
    }

    #[test]
    fn test_load_npz_custom_key() -> Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trajectory.npz");
        let array = Array2::from_shape_vec((2, 2), vec![0.0, 0.0, 1.0, 1.0]).unwrap();
        write_npz(&path, "route", &array);

        let config = LoaderConfig {
            array_key: "route".to_string(),
        };
        let trajectory = load_trajectory(&path, Some(&config))?;
        assert_eq!(trajectory.len(), 2);

        Ok(())
    }

    #[test]
    fn test_load_npz_missing_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trajectory.npz");
        let array = Array2::from_shape_vec((2, 2), vec![0.0, 0.0, 1.0, 1.0]).unwrap();
        write_npz(&path, "other", &array);

        let result = load_trajectory(&path, None);
        assert!(matches!(result, Err(LoaderError::MissingArray { .. })));
    }

    #[test]
    fn test_load_npz_wrong_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trajectory.npz");
        let array = Array2::<f64>::zeros((4, 3));
        write_npz(&path, "path", &array);

        match load_trajectory(&path, None) {
            Err(LoaderError::Validation(ValidationError::WrongColumnCount { found })) => {
                assert_eq!(found, 3)
            }
            other => panic!("Expected WrongColumnCount, got {:?}", other),
        }
    }

    #[test]
    fn test_load_npz_wrong_dimensionality() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trajectory.npz");
        write_npz(&path, "path", &Array1::<f64>::zeros(4));

        match load_trajectory(&path, None) {
            Err(LoaderError::Validation(err)) => assert_eq!(err.reason(), "wrong-dimensionality"),
            other => panic!("Expected WrongDimensionality, got {:?}", other),
        }

        write_npz(&path, "path", &Array3::<f64>::zeros((4, 2, 2)));
        match load_trajectory(&path, None) {
            Err(LoaderError::Validation(err)) => assert_eq!(err.reason(), "wrong-dimensionality"),
            other => panic!("Expected WrongDimensionality, got {:?}", other),
        }
    }

    #[test]
    fn test_load_npz_single_row() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trajectory.npz");
        write_npz(&path, "path", &Array2::<f64>::zeros((1, 2)));

        match load_trajectory(&path, None) {
            Err(LoaderError::Validation(ValidationError::TooFewPoints { found })) => {
                assert_eq!(found, 1)
            }
            other => panic!("Expected TooFewPoints, got {:?}", other),
        }
    }

    #[test]
    fn test_load_csv() -> Result<()> {
        let mut file = csv_file();
        writeln!(file, "x,y").unwrap();
        writeln!(file, "1.0,2.0").unwrap();
        writeln!(file, "NaN,5.0").unwrap();
        writeln!(file, ",6.0").unwrap();
        writeln!(file, "7.0,inf").unwrap();
        file.flush().unwrap();

        let trajectory = load_trajectory(file.path(), None)?;
        assert_eq!(trajectory.len(), 4);
        assert_eq!(trajectory.x[0], 1.0);
        assert!(trajectory.x[1].is_nan());
        assert!(trajectory.x[2].is_nan());
        assert_eq!(trajectory.y[3], f64::INFINITY);

        Ok(())
    }

    #[test]
    fn test_load_csv_wrong_columns() {
        let mut file = csv_file();
        writeln!(file, "x,y,z").unwrap();
        writeln!(file, "1.0,2.0,3.0").unwrap();
        writeln!(file, "4.0,5.0,6.0").unwrap();
        file.flush().unwrap();

        let result = load_trajectory(file.path(), None);
        assert!(matches!(
            result,
            Err(LoaderError::Validation(ValidationError::WrongColumnCount { found: 3 }))
        ));
    }

    #[test]
    fn test_load_csv_too_few_rows() {
        let mut file = csv_file();
        writeln!(file, "x,y").unwrap();
        writeln!(file, "1.0,2.0").unwrap();
        file.flush().unwrap();

        let result = load_trajectory_csv(file.path());
        assert!(matches!(
            result,
            Err(LoaderError::Validation(ValidationError::TooFewPoints { found: 1 }))
        ));
    }

    #[test]
    fn test_load_csv_garbage_value() {
        let mut file = csv_file();
        writeln!(file, "x,y").unwrap();
        writeln!(file, "1.0,abc").unwrap();
        writeln!(file, "2.0,3.0").unwrap();
        file.flush().unwrap();

        let result = load_trajectory_csv(file.path());
        assert!(matches!(result, Err(LoaderError::ParseError(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = Builder::new().suffix(".ply").tempfile().unwrap();
        let result = load_trajectory(file.path(), None);
        assert!(matches!(result, Err(LoaderError::UnsupportedFormat(_))));
    }
}
