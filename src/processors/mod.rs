//! Data processing modules.

pub mod filtering;
pub mod pipeline;
pub mod projection;
pub mod smoothing;

// Re-export key types for convenience
pub use filtering::filter_trajectory;
pub use pipeline::{
    load_and_smooth, run_pipeline, smooth_batch, BatchOutcome, PipelineError, PipelineOutput,
    DEFAULT_WINDOW_SIZE,
};
pub use projection::{find_closest_segment_and_point, project_point, segments, Projection, Segment};
pub use smoothing::{smooth_trajectory, MIN_WINDOW_SIZE};
