//! Removal of non-finite trajectory samples.

use log::{debug, warn};

use crate::core::loaders::Trajectory;

/// Drop every point whose x or y is NaN or infinite.
///
/// Relative order of the remaining points is preserved. An input with no
/// finite points yields an empty trajectory; this never fails.
///
/// # Arguments
///
/// * `trajectory` - Raw trajectory, possibly containing invalid samples
///
/// # Returns
///
/// A new trajectory containing only finite points.
pub fn filter_trajectory(trajectory: &Trajectory) -> Trajectory {
    let filtered: Trajectory = trajectory.points().filter(|p| p.is_finite()).collect();

    let dropped = trajectory.len() - filtered.len();
    if dropped > 0 {
        warn!(
            "Dropped {} of {} points with non-finite coordinates",
            dropped,
            trajectory.len()
        );
    } else {
        debug!("All {} points are finite", trajectory.len());
    }

    filtered
}
