//! The six-slot stacking cycle
//!
//! Two tiers make one cycle: three blocks laid along the forward (+Z) axis at
//! 0°, then three along the right (+X) axis at 90°. Every slot moves a running
//! offset in the anchor's local frame:
//!
//! ```text
//! slot  offset change             orientation
//!  1    x += s, y += h            0°   (tier start)
//!  2    z += s                    0°
//!  3    z -= 2s                   0°
//!  4    y += h, z += s            90°  (tier start)
//!  5    x += s                    90°
//!  6    x -= 2s                   90°  (cycle wraps to 1)
//! ```
//!
//! where `s` is the block spacing and `h` the tier height. Over a full cycle
//! x and z return to where they started and y climbs two tiers.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::layout::StackGeometry;

/// Rotation of a tier about the vertical axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TierOrientation {
    /// 0°, blocks run along the forward axis
    Aligned,
    /// 90°, blocks run along the right axis
    Crossed,
}

impl TierOrientation {
    pub fn degrees(&self) -> f32 {
        match self {
            TierOrientation::Aligned => 0.0,
            TierOrientation::Crossed => 90.0,
        }
    }

    /// Yaw about +Y
    pub fn to_quat(&self) -> Quat {
        Quat::from_rotation_y(self.degrees().to_radians())
    }
}

/// Position within the two-tier cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slot {
    AlignedStart,
    AlignedForward,
    AlignedBack,
    CrossedStart,
    CrossedRight,
    CrossedLeft,
}

impl Slot {
    pub const CYCLE: [Slot; 6] = [
        Slot::AlignedStart,
        Slot::AlignedForward,
        Slot::AlignedBack,
        Slot::CrossedStart,
        Slot::CrossedRight,
        Slot::CrossedLeft,
    ];

    /// 1-based slot number
    pub fn number(&self) -> u8 {
        *self as u8 + 1
    }

    pub fn next(&self) -> Slot {
        Self::CYCLE[(*self as usize + 1) % Self::CYCLE.len()]
    }

    pub fn orientation(&self) -> TierOrientation {
        match self {
            Slot::AlignedStart | Slot::AlignedForward | Slot::AlignedBack => TierOrientation::Aligned,
            Slot::CrossedStart | Slot::CrossedRight | Slot::CrossedLeft => TierOrientation::Crossed,
        }
    }

    /// Offset change applied when a block lands in this slot
    pub fn delta(&self, geometry: &StackGeometry) -> Vec3 {
        let s = geometry.block_spacing;
        let h = geometry.tier_height;
        match self {
            Slot::AlignedStart => Vec3::new(s, h, 0.0),
            Slot::AlignedForward => Vec3::Z * s,
            Slot::AlignedBack => Vec3::NEG_Z * (2.0 * s),
            Slot::CrossedStart => Vec3::new(0.0, h, s),
            Slot::CrossedRight => Vec3::X * s,
            Slot::CrossedLeft => Vec3::NEG_X * (2.0 * s),
        }
    }
}

/// Running state of one tower build
#[derive(Debug, Clone)]
pub struct StackCursor {
    slot: Slot,
    offset: Vec3,
    placed: usize,
}

impl StackCursor {
    pub fn new(seed_offset: Vec3) -> Self {
        Self {
            slot: Slot::AlignedStart,
            offset: seed_offset,
            placed: 0,
        }
    }

    /// Number of blocks placed so far
    pub fn placed(&self) -> usize {
        self.placed
    }

    /// Place one block: returns its slot, tier index, and local offset
    pub fn advance(&mut self, geometry: &StackGeometry) -> (Slot, usize, Vec3) {
        let slot = self.slot;
        let tier = self.placed / 3;
        self.offset += slot.delta(geometry);
        self.slot = slot.next();
        self.placed += 1;
        (slot, tier, self.offset)
    }
}
