//! Load → filter → smooth pipeline, for single files and whole directories.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::{debug, info, warn};
use rayon::prelude::*;
use thiserror::Error;

use super::filtering::filter_trajectory;
use super::smoothing::smooth_trajectory;
use crate::config::LoaderConfig;
use crate::core::loaders::{load_trajectory, LoaderError, Trajectory};
use crate::core::validation::ValidationError;
use crate::core::writers::write_trajectory_csv;

/// Window size used when the caller does not pick one.
pub const DEFAULT_WINDOW_SIZE: usize = 5;

/// File extensions recognised as trajectory sources.
const TRAJECTORY_EXTENSIONS: &[&str] = &["npz", "csv"];

/// Errors that can occur while running the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoaderError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("No trajectory files found in {0}")]
    NoFilesFound(PathBuf),

    #[error("Failed to read directory: {0}")]
    ReadDir(#[from] std::io::Error),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Every intermediate trajectory of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Number of points before filtering.
    pub raw_len: usize,
    pub filtered: Trajectory,
    pub smoothed: Trajectory,
}

impl PipelineOutput {
    /// Points removed by the finite-value filter.
    pub fn dropped(&self) -> usize {
        self.raw_len - self.filtered.len()
    }
}

/// Run the pipeline on one file and keep the intermediate trajectories.
///
/// # Errors
///
/// Fails if the file cannot be loaded, or if the filtered trajectory does not
/// satisfy the smoother's preconditions.
pub fn run_pipeline<P: AsRef<Path>>(
    path: P,
    window_size: usize,
    config: Option<&LoaderConfig>,
) -> Result<PipelineOutput> {
    let raw = load_trajectory(path, config)?;
    let filtered = filter_trajectory(&raw);
    let smoothed = smooth_trajectory(&filtered, window_size)?;

    Ok(PipelineOutput {
        raw_len: raw.len(),
        filtered,
        smoothed,
    })
}

/// Load a trajectory, drop non-finite points, and smooth it.
///
/// # Example
///
/// ```no_run
/// use trajectory_pipeline::processors::pipeline::{load_and_smooth, DEFAULT_WINDOW_SIZE};
///
/// let smoothed = load_and_smooth("trajectory.npz", DEFAULT_WINDOW_SIZE, None).unwrap();
/// println!("{} points", smoothed.len());
/// ```
pub fn load_and_smooth<P: AsRef<Path>>(
    path: P,
    window_size: usize,
    config: Option<&LoaderConfig>,
) -> Result<Trajectory> {
    Ok(run_pipeline(path, window_size, config)?.smoothed)
}

/// Find trajectory files (`.npz`, `.csv`) directly inside `directory`, sorted.
pub fn find_trajectory_files(directory: &Path) -> Result<Vec<PathBuf>> {
    if !directory.is_dir() {
        return Err(PipelineError::DirectoryNotFound(directory.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = fs::read_dir(directory)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .map(|ext| {
                    TRAJECTORY_EXTENSIONS
                        .iter()
                        .any(|known| ext.eq_ignore_ascii_case(known))
                })
                .unwrap_or(false)
        })
        .collect();

    files.sort();
    Ok(files)
}

/// Outcome of smoothing one file in a batch.
#[derive(Debug)]
pub struct BatchOutcome {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Number of smoothed points written, or the reason the file failed.
    pub result: anyhow::Result<usize>,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Output path for a batch source: `<output_dir>/<stem>_smoothed.csv`.
pub fn batch_output_path(source: &Path, output_dir: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "trajectory".to_string());
    output_dir.join(format!("{}_smoothed.csv", stem))
}

/// Smooth every trajectory file in `input_dir` in parallel.
///
/// Each file is written to `output_dir` as `<stem>_smoothed.csv`. A failing
/// file is reported in its [`BatchOutcome`] and does not stop the others.
/// Outcomes are returned in sorted source order.
pub fn smooth_batch(
    input_dir: &Path,
    output_dir: &Path,
    window_size: usize,
    config: Option<&LoaderConfig>,
) -> Result<Vec<BatchOutcome>> {
    let sources = find_trajectory_files(input_dir)?;
    if sources.is_empty() {
        return Err(PipelineError::NoFilesFound(input_dir.to_path_buf()));
    }

    debug!(
        "Smoothing {} files from {} with window {}",
        sources.len(),
        input_dir.display(),
        window_size
    );

    let outcomes: Vec<BatchOutcome> = sources
        .par_iter()
        .map(|source| {
            let output = batch_output_path(source, output_dir);
            let result = smooth_file(source, &output, window_size, config);

            match &result {
                Ok(n_points) => info!(
                    "{} -> {} ({} points)",
                    source.display(),
                    output.display(),
                    n_points
                ),
                Err(e) => warn!("Failed to smooth {}: {:#}", source.display(), e),
            }

            BatchOutcome {
                source: source.clone(),
                output,
                result,
            }
        })
        .collect();

    Ok(outcomes)
}

fn smooth_file(
    source: &Path,
    output: &Path,
    window_size: usize,
    config: Option<&LoaderConfig>,
) -> anyhow::Result<usize> {
    let smoothed = load_and_smooth(source, window_size, config)
        .with_context(|| format!("Failed to smooth {}", source.display()))?;
    write_trajectory_csv(output, &smoothed)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(smoothed.len())
}
