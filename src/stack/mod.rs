//! Tower layout engine
//!
//! Pure and deterministic given its RNG:
//! - No I/O, no rendering dependencies
//! - One instruction per record, in input order
//! - RNG only touches cosmetic scale jitter

pub mod layout;
pub mod slot;

pub use layout::{Anchor, PlacementInstruction, StackGeometry, draw_jitter, layout_stack};
pub use slot::{Slot, StackCursor, TierOrientation};
