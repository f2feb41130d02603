//! Mastery Stack - graded assessment records laid out as block towers
//!
//! Core modules:
//! - `fetch`: Record retrieval (HTTP or file, timeout-bound, cancellable)
//! - `ordering`: Stable multi-key record sort
//! - `partition`: Grouping by wanted grade
//! - `stack`: The six-slot tower layout engine
//! - `pipeline`: Fetch → order → partition → layout
//! - `present`: Renderer and interaction-layer boundary
//! - `settings`: Configuration

pub mod error;
pub mod fetch;
pub mod ordering;
pub mod partition;
pub mod pipeline;
pub mod present;
pub mod record;
pub mod settings;
pub mod stack;

pub use error::{Error, Result};
pub use fetch::{CancelToken, Fetcher, fetch};
pub use ordering::order;
pub use partition::{GradeGroup, GradePartition, partition};
pub use pipeline::{GradeStack, Pipeline, StackLayout, run_config};
pub use present::{BlockDetails, MaterialPalette, Renderer, present};
pub use record::{MaterialClass, MathRecord};
pub use settings::{GeometryPreset, PipelineConfig};
pub use stack::{Anchor, PlacementInstruction, StackGeometry, TierOrientation, layout_stack};

/// Layout and transport constants
pub mod consts {
    use std::time::Duration;

    /// Vertical climb per tier
    pub const TIER_HEIGHT: f32 = 0.6;
    /// Spacing between blocks in a tier
    pub const BLOCK_SPACING: f32 = 1.0;
    /// Lower bound of each scale jitter component (upper bound is 0, exclusive)
    pub const JITTER_MIN: f32 = -0.01;

    /// Assessment endpoint of the reference deployment
    pub const DEFAULT_SOURCE_URI: &str = "https://ga1vqcu3o1.execute-api.us-east-1.amazonaws.com/Assessment/stack";
    pub const DEFAULT_GRADES: [&str; 3] = ["6th Grade", "7th Grade", "8th Grade"];
    /// Distance between neighbouring default towers along +X
    pub const STACK_SEPARATION: f32 = 10.0;

    pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
    /// How often a cancellable fetch checks its token
    pub const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);
}
