//! Validation errors shared by the loader, smoother and projector.

use thiserror::Error;

/// A precondition on trajectory shape or call arguments did not hold.
///
/// Every variant maps to one fixed reason tag (see [`ValidationError::reason`])
/// so callers can branch on the cause without parsing messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Trajectory must have 2 columns (x, y), found {found}")]
    WrongColumnCount { found: usize },

    #[error("Trajectory must be a 2D array, found {found} dimension(s)")]
    WrongDimensionality { found: usize },

    #[error("Trajectory must have at least 2 points, found {found}")]
    TooFewPoints { found: usize },

    #[error("Trajectory must have at least window_size points ({window_size}), found {found}")]
    TooFewPointsForWindow { found: usize, window_size: usize },

    #[error("Window size must be at least 3, got {window_size}")]
    WindowTooSmall { window_size: usize },

    #[error("Point must have 2 coordinates (x, y), found {found}")]
    WrongPointDimensionality { found: usize },

    #[error("At least two points are required to form a segment, found {found}")]
    TooFewSegmentPoints { found: usize },
}

impl ValidationError {
    /// Stable kebab-case tag for this failure.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::WrongColumnCount { .. } => "wrong-column-count",
            Self::WrongDimensionality { .. } => "wrong-dimensionality",
            Self::TooFewPoints { .. } => "too-few-points",
            Self::TooFewPointsForWindow { .. } => "too-few-points-for-window",
            Self::WindowTooSmall { .. } => "window-too-small",
            Self::WrongPointDimensionality { .. } => "wrong-point-dimensionality",
            Self::TooFewSegmentPoints { .. } => "too-few-segment-points",
        }
    }
}

/// Check the shape of a stored point array.
///
/// Arrays with fewer than two axes have no column axis and are reported as
/// a dimensionality problem. Otherwise columns are checked first, then the
/// number of axes, then the row count.
pub fn validate_array_shape(shape: &[usize]) -> Result<(), ValidationError> {
    if shape.len() < 2 {
        return Err(ValidationError::WrongDimensionality { found: shape.len() });
    }
    if shape[1] != 2 {
        return Err(ValidationError::WrongColumnCount { found: shape[1] });
    }
    if shape.len() != 2 {
        return Err(ValidationError::WrongDimensionality { found: shape.len() });
    }
    if shape[0] < 2 {
        return Err(ValidationError::TooFewPoints { found: shape[0] });
    }
    Ok(())
}
