//! Moving-average smoothing with edge-replication padding.
//!
//! Each axis is padded with `window_size / 2` copies of its first value in
//! front and of its last value behind, then replaced by the mean over a
//! sliding window. The output always has the input's length.

use log::debug;

use crate::core::loaders::Trajectory;
use crate::core::validation::ValidationError;

/// Smallest window accepted by [`smooth_trajectory`].
pub const MIN_WINDOW_SIZE: usize = 3;

/// Smooth a trajectory with a uniform moving average.
///
/// Preconditions are checked in this order:
/// 1. at least 2 points ([`ValidationError::TooFewPoints`])
/// 2. at least `window_size` points ([`ValidationError::TooFewPointsForWindow`])
/// 3. `window_size >= 3` ([`ValidationError::WindowTooSmall`])
///
/// For an even `window_size` the padded sequence yields one more full window
/// than there are points; the first `len` windows are used, so output `i`
/// averages original indices `i - pad ..= i + pad - 1`.
///
/// # Example
///
/// ```
/// use trajectory_pipeline::core::loaders::Trajectory;
/// use trajectory_pipeline::processors::smoothing::smooth_trajectory;
///
/// let raw = Trajectory::from_coords(&[[0.0, 0.0], [2.0, 0.0], [4.0, 0.0], [6.0, 0.0], [8.0, 0.0]]);
/// let smoothed = smooth_trajectory(&raw, 3).unwrap();
/// assert_eq!(smoothed.len(), raw.len());
/// assert!((smoothed.x[2] - 4.0).abs() < 1e-12);
/// ```
pub fn smooth_trajectory(
    trajectory: &Trajectory,
    window_size: usize,
) -> Result<Trajectory, ValidationError> {
    let n = trajectory.len();

    if n < 2 {
        return Err(ValidationError::TooFewPoints { found: n });
    }
    if n < window_size {
        return Err(ValidationError::TooFewPointsForWindow {
            found: n,
            window_size,
        });
    }
    if window_size < MIN_WINDOW_SIZE {
        return Err(ValidationError::WindowTooSmall { window_size });
    }

    debug!(
        "Smoothing {} points with window {} (pad {})",
        n,
        window_size,
        window_size / 2
    );

    let (x, y) = rayon::join(
        || moving_average(&trajectory.x, window_size),
        || moving_average(&trajectory.y, window_size),
    );

    Ok(Trajectory::from_xy(x, y))
}

/// Edge-padded moving average of one axis.
///
/// Callers guarantee `values` is non-empty and `window_size >= 1`.
fn moving_average(values: &[f64], window_size: usize) -> Vec<f64> {
    let padded = pad_edges(values, window_size / 2);
    let weight = window_size as f64;

    padded
        .windows(window_size)
        .take(values.len())
        .map(|window| {
            // Offsets from the first value keep constant windows exact
            let anchor = window[0];
            anchor + window.iter().map(|v| v - anchor).sum::<f64>() / weight
        })
        .collect()
}

/// Replicate the first and last values `pad` times on each side.
fn pad_edges(values: &[f64], pad: usize) -> Vec<f64> {
    let (Some(&first), Some(&last)) = (values.first(), values.last()) else {
        return Vec::new();
    };

    let mut padded = Vec::with_capacity(values.len() + 2 * pad);
    padded.extend(std::iter::repeat(first).take(pad));
    padded.extend_from_slice(values);
    padded.extend(std::iter::repeat(last).take(pad));
    padded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_trajectory() -> Trajectory {
        Trajectory::from_coords(&[[0.0, 0.0], [2.0, 0.0], [4.0, 0.0], [6.0, 0.0], [8.0, 0.0]])
    }

    #[test]
    fn test_pad_edges() {
        assert_eq!(pad_edges(&[1.0, 2.0, 3.0], 2), vec![1.0, 1.0, 1.0, 2.0, 3.0, 3.0, 3.0]);
        assert_eq!(pad_edges(&[1.0, 2.0], 0), vec![1.0, 2.0]);
        assert!(pad_edges(&[], 3).is_empty());
    }

    #[test]
    fn test_window_three_interior_and_edges() {
        let smoothed = smooth_trajectory(&line_trajectory(), 3).unwrap();

        assert_eq!(smoothed.len(), 5);
        assert!((smoothed.x[2] - 4.0).abs() < 1e-12);
        assert!((smoothed.x[1] - 2.0).abs() < 1e-12);
        assert!((smoothed.x[3] - 6.0).abs() < 1e-12);
        // Endpoints are pulled toward the replicated edge values
        assert!((smoothed.x[0] - 2.0 / 3.0).abs() < 1e-12);
        assert!((smoothed.x[4] - 22.0 / 3.0).abs() < 1e-12);
        assert!(smoothed.y.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_window_five() {
        let smoothed = smooth_trajectory(&line_trajectory(), 5).unwrap();

        // padded x: 0 0 0 2 4 6 8 8 8
        let expected = [1.2, 2.4, 4.0, 5.6, 6.8];
        for (got, want) in smoothed.x.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-12, "got {}, want {}", got, want);
        }
    }

    #[test]
    fn test_even_window_keeps_length() {
        let smoothed = smooth_trajectory(&line_trajectory(), 4).unwrap();

        assert_eq!(smoothed.len(), 5);
        // padded x: 0 0 0 2 4 6 8 8 8, windows of 4 starting at 0..5
        let expected = [0.5, 1.5, 3.0, 5.0, 6.5];
        for (got, want) in smoothed.x.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-12, "got {}, want {}", got, want);
        }
    }

    #[test]
    fn test_constant_trajectory_is_fixpoint() {
        let constant = Trajectory::from_xy(vec![3.5; 9], vec![-1.25; 9]);

        for window_size in 3..=9 {
            let smoothed = smooth_trajectory(&constant, window_size).unwrap();
            assert_eq!(smoothed, constant, "window {}", window_size);
        }
    }

    #[test]
    fn test_constant_non_dyadic_values_are_fixpoint() {
        let constant = Trajectory::from_xy(vec![0.1; 7], vec![0.7; 7]);

        for window_size in 3..=7 {
            let smoothed = smooth_trajectory(&constant, window_size).unwrap();
            assert_eq!(smoothed, constant, "window {}", window_size);
        }
    }

    #[test]
    fn test_window_equal_to_length() {
        let trajectory = Trajectory::from_coords(&[[0.0, 3.0], [3.0, 6.0], [6.0, 9.0]]);
        let smoothed = smooth_trajectory(&trajectory, 3).unwrap();

        assert_eq!(smoothed.len(), 3);
        assert!((smoothed.x[1] - 3.0).abs() < 1e-12);
        assert!((smoothed.y[1] - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_window_below_minimum() {
        let result = smooth_trajectory(&line_trajectory(), 2);
        assert_eq!(result, Err(ValidationError::WindowTooSmall { window_size: 2 }));
    }

    #[test]
    fn test_rejects_single_point() {
        let single = Trajectory::from_coords(&[[1.0, 1.0]]);
        let result = smooth_trajectory(&single, 3);
        assert_eq!(result, Err(ValidationError::TooFewPoints { found: 1 }));
    }

    #[test]
    fn test_rejects_window_longer_than_trajectory() {
        let trajectory = line_trajectory();
        let result = smooth_trajectory(&trajectory, trajectory.len() + 1);
        assert_eq!(
            result,
            Err(ValidationError::TooFewPointsForWindow {
                found: 5,
                window_size: 6
            })
        );
    }

    #[test]
    fn test_precondition_order() {
        // A window of 3 on two points fails the length check first.
        let two = Trajectory::from_coords(&[[0.0, 0.0], [1.0, 1.0]]);
        assert_eq!(
            smooth_trajectory(&two, 3).unwrap_err().reason(),
            "too-few-points-for-window"
        );
        assert_eq!(smooth_trajectory(&two, 2).unwrap_err().reason(), "window-too-small");

        let empty = Trajectory::new();
        assert_eq!(smooth_trajectory(&empty, 1).unwrap_err().reason(), "too-few-points");
    }
}
