//! Nearest-segment queries against a trajectory's polyline.
//!
//! A trajectory of N points induces N - 1 segments between consecutive
//! points. For a query point every segment is scored by the distance to its
//! clamped orthogonal projection, and the closest segment wins. Ties go to
//! the lowest segment index.
//!
//! # Example
//!
//! ```
//! use trajectory_pipeline::core::loaders::{Point, Trajectory};
//! use trajectory_pipeline::processors::projection::find_closest_segment_and_point;
//!
//! let path = Trajectory::from_coords(&[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0]]);
//! let (segment, nearest) = find_closest_segment_and_point(&path, &[12.0, 4.0]).unwrap();
//! assert_eq!(segment.start, Point::new(10.0, 0.0));
//! assert_eq!(nearest, Point::new(10.0, 4.0));
//! ```

use rayon::prelude::*;

use crate::core::loaders::{Point, Trajectory};
use crate::core::validation::ValidationError;

/// Line segment between two consecutive trajectory points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    #[inline]
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Projection parameter of `point` on this segment, clamped to `[0, 1]`.
    ///
    /// Zero-length segments return 0, so their projection is the start point.
    #[inline]
    pub fn projection_parameter(&self, point: &Point) -> f64 {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        let length_sq = dx * dx + dy * dy;
        if length_sq == 0.0 {
            return 0.0;
        }

        let qx = point.x - self.start.x;
        let qy = point.y - self.start.y;
        ((qx * dx + qy * dy) / length_sq).clamp(0.0, 1.0)
    }

    /// Point on the segment at parameter `t`.
    #[inline]
    pub fn point_at(&self, t: f64) -> Point {
        Point::new(
            self.start.x + t * (self.end.x - self.start.x),
            self.start.y + t * (self.end.y - self.start.y),
        )
    }
}

/// Result of a nearest-segment query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Index of the segment's start point in the trajectory.
    pub segment_index: usize,
    pub segment: Segment,
    /// Closest point on `segment` to the query.
    pub nearest: Point,
    /// Clamped projection parameter of `nearest` along `segment`.
    pub t: f64,
    /// Euclidean distance from the query to `nearest`.
    pub distance: f64,
}

/// Iterate over the consecutive segments of a trajectory.
pub fn segments(trajectory: &Trajectory) -> impl Iterator<Item = Segment> + '_ {
    trajectory
        .points()
        .zip(trajectory.points().skip(1))
        .map(|(start, end)| Segment::new(start, end))
}

/// Find the segment closest to `point` along with the full projection record.
///
/// # Arguments
///
/// * `trajectory` - Trajectory with at least two points
/// * `point` - Query coordinates; must contain exactly `x` and `y`
///
/// # Errors
///
/// * [`ValidationError::TooFewSegmentPoints`] if the trajectory has fewer than 2 points
/// * [`ValidationError::WrongPointDimensionality`] if `point` does not have 2 coordinates
pub fn project_point(trajectory: &Trajectory, point: &[f64]) -> Result<Projection, ValidationError> {
    if trajectory.len() < 2 {
        return Err(ValidationError::TooFewSegmentPoints {
            found: trajectory.len(),
        });
    }
    let query = Point::try_from(point)?;

    // Scoring is parallel; selection stays sequential so the lowest index
    // wins among equal distances.
    let candidates: Vec<Projection> = segments(trajectory)
        .collect::<Vec<_>>()
        .into_par_iter()
        .enumerate()
        .map(|(i, segment)| {
            let t = segment.projection_parameter(&query);
            let nearest = segment.point_at(t);
            Projection {
                segment_index: i,
                segment,
                nearest,
                t,
                distance: nearest.distance(&query),
            }
        })
        .collect();

    let mut best = candidates[0];
    for candidate in &candidates[1..] {
        if candidate.distance < best.distance {
            best = *candidate;
        }
    }

    Ok(best)
}

/// Find the closest segment of `trajectory` to `point` and the nearest point on it.
///
/// See [`project_point`] for preconditions and tie-breaking.
pub fn find_closest_segment_and_point(
    trajectory: &Trajectory,
    point: &[f64],
) -> Result<(Segment, Point), ValidationError> {
    let projection = project_point(trajectory, point)?;
    Ok((projection.segment, projection.nearest))
}
