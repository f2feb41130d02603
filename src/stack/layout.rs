//! Per-grade tower layout
//!
//! Turns an ordered grade group into placement instructions. Position and
//! rotation come from the slot cycle; material comes from mastery; the scale
//! jitter is drawn from the injected RNG and never feeds back into placement.

use std::sync::Arc;

use glam::{Quat, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::slot::{Slot, StackCursor, TierOrientation};
use crate::consts::{BLOCK_SPACING, JITTER_MIN, TIER_HEIGHT};
use crate::error::Result;
use crate::record::{MaterialClass, MathRecord};

/// Reference transform a tower is built from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub position: Vec3,
    /// Base orientation; tier rotations are applied on top of it
    pub orientation: Quat,
}

impl Default for Anchor {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        }
    }
}

impl Anchor {
    pub fn new(position: Vec3, yaw_degrees: f32) -> Self {
        Self {
            position,
            orientation: Quat::from_rotation_y(yaw_degrees.to_radians()),
        }
    }

    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
        }
    }

    /// Map an anchor-local offset to a world position
    #[inline]
    pub fn to_world(&self, offset: Vec3) -> Vec3 {
        self.position + self.orientation * offset
    }
}

/// Tower dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StackGeometry {
    /// Vertical climb per tier
    pub tier_height: f32,
    /// Distance between neighbouring blocks in a tier
    pub block_spacing: f32,
    /// Starting offset of the running position
    pub seed_offset: Vec3,
}

impl Default for StackGeometry {
    fn default() -> Self {
        Self {
            tier_height: TIER_HEIGHT,
            block_spacing: BLOCK_SPACING,
            seed_offset: Vec3::ZERO,
        }
    }
}

impl StackGeometry {
    /// Seeded so the first tier's middle block sits on the anchor, half a
    /// tier above it
    pub fn centered() -> Self {
        Self {
            seed_offset: Vec3::new(-BLOCK_SPACING, -TIER_HEIGHT / 2.0, 0.0),
            ..Self::default()
        }
    }
}

/// Where and how one record's block belongs in its tower
#[derive(Debug, Clone, Serialize)]
pub struct PlacementInstruction {
    pub record: Arc<MathRecord>,
    pub slot: Slot,
    /// 0-based tier index (three blocks per tier)
    pub tier: usize,
    /// Offset in the anchor's frame
    pub local_offset: Vec3,
    /// World position (anchor applied)
    pub position: Vec3,
    pub orientation: TierOrientation,
    /// World rotation (anchor orientation, then tier yaw)
    pub rotation: Quat,
    /// Added to the block's base scale, each component in [-0.01, 0)
    pub scale_jitter: Vec3,
    pub material: MaterialClass,
}

impl PlacementInstruction {
    pub fn rotation_degrees(&self) -> f32 {
        self.orientation.degrees()
    }
}

/// Three independent draws from [JITTER_MIN, 0)
pub fn draw_jitter<R: Rng>(rng: &mut R) -> Vec3 {
    Vec3::new(
        rng.random_range(JITTER_MIN..0.0),
        rng.random_range(JITTER_MIN..0.0),
        rng.random_range(JITTER_MIN..0.0),
    )
}

/// Lay out one grade's ordered records as a tower
///
/// Emits one instruction per record, in input order. Fails on the first
/// record whose mastery has no material class; nothing is returned for the
/// grade in that case.
pub fn layout_stack<R: Rng>(
    records: &[Arc<MathRecord>],
    anchor: &Anchor,
    geometry: &StackGeometry,
    rng: &mut R,
) -> Result<Vec<PlacementInstruction>> {
    let mut cursor = StackCursor::new(geometry.seed_offset);
    let mut placements = Vec::with_capacity(records.len());

    for record in records {
        let material = record.material()?;
        let (slot, tier, local_offset) = cursor.advance(geometry);
        let orientation = slot.orientation();

        placements.push(PlacementInstruction {
            record: Arc::clone(record),
            slot,
            tier,
            local_offset,
            position: anchor.to_world(local_offset),
            orientation,
            rotation: anchor.orientation * orientation.to_quat(),
            scale_jitter: draw_jitter(rng),
            material,
        });
    }

    Ok(placements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::record::sample;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn group(masteries: &[i64]) -> Vec<Arc<MathRecord>> {
        masteries
            .iter()
            .enumerate()
            .map(|(i, &m)| Arc::new(sample(i as i64, "6th Grade", "A", m)))
            .collect()
    }

    fn lay(records: &[Arc<MathRecord>], anchor: &Anchor) -> Result<Vec<PlacementInstruction>> {
        let mut rng = Pcg32::seed_from_u64(7);
        layout_stack(records, anchor, &StackGeometry::default(), &mut rng)
    }

    #[test]
    fn test_twelve_block_rotations() {
        let placements = lay(&group(&[0; 12]), &Anchor::default()).unwrap();
        let degrees: Vec<f32> = placements.iter().map(|p| p.rotation_degrees()).collect();
        assert_eq!(
            degrees,
            vec![0.0, 0.0, 0.0, 90.0, 90.0, 90.0, 0.0, 0.0, 0.0, 90.0, 90.0, 90.0]
        );

        // Slot 1 climbs two tier heights per cycle
        let climb = placements[6].position.y - placements[0].position.y;
        assert!((climb - 2.0 * TIER_HEIGHT).abs() < 1e-5);

        let tiers: Vec<usize> = placements.iter().map(|p| p.tier).collect();
        assert_eq!(tiers, vec![0, 0, 0, 1, 1, 1, 2, 2, 2, 3, 3, 3]);
    }

    #[test]
    fn test_tiers_share_height_and_rotation() {
        let placements = lay(&group(&[1; 15]), &Anchor::default()).unwrap();
        for tier in placements.chunks(3) {
            assert!(tier.iter().all(|p| (p.position.y - tier[0].position.y).abs() < 1e-6));
            assert!(tier.iter().all(|p| p.orientation == tier[0].orientation));
        }
        for pair in placements.chunks(3).collect::<Vec<_>>().windows(2) {
            assert_ne!(pair[0][0].orientation, pair[1][0].orientation);
            assert!((pair[1][0].position.y - pair[0][0].position.y - TIER_HEIGHT).abs() < 1e-5);
        }
    }

    #[test]
    fn test_short_and_empty_groups() {
        assert!(lay(&[], &Anchor::default()).unwrap().is_empty());

        let placements = lay(&group(&[2, 0]), &Anchor::default()).unwrap();
        assert_eq!(placements.len(), 2);
        assert!(placements.iter().all(|p| p.tier == 0));
        assert!(placements[0].position.abs_diff_eq(Vec3::new(1.0, 0.6, 0.0), 1e-6));
        assert!(placements[1].position.abs_diff_eq(Vec3::new(1.0, 0.6, 1.0), 1e-6));
        assert_eq!(placements[0].material, MaterialClass::Stone);
        assert_eq!(placements[1].material, MaterialClass::Glass);
    }

    #[test]
    fn test_anchor_translation_and_yaw() {
        let anchor = Anchor::new(Vec3::new(10.0, 2.0, -5.0), 90.0);
        let placements = lay(&group(&[0, 0, 0, 0]), &anchor).unwrap();

        // Local +X maps to world -Z under a 90° yaw
        assert!(placements[0].position.abs_diff_eq(Vec3::new(10.0, 2.6, -6.0), 1e-5));
        assert!(placements[0].local_offset.abs_diff_eq(Vec3::new(1.0, 0.6, 0.0), 1e-6));

        // Crossed tier rotates on top of the anchor
        let expected = anchor.orientation * Quat::from_rotation_y(90f32.to_radians());
        assert!(placements[3].rotation.abs_diff_eq(expected, 1e-5));
        assert!(placements[0].rotation.abs_diff_eq(anchor.orientation, 1e-5));
    }

    #[test]
    fn test_centered_geometry() {
        let mut rng = Pcg32::seed_from_u64(1);
        let placements =
            layout_stack(&group(&[0, 0, 0]), &Anchor::default(), &StackGeometry::centered(), &mut rng).unwrap();
        assert!(placements[0].position.abs_diff_eq(Vec3::new(0.0, 0.3, 0.0), 1e-6));
        assert!(placements[2].position.abs_diff_eq(Vec3::new(0.0, 0.3, -1.0), 1e-6));
    }

    #[test]
    fn test_unknown_mastery_aborts_pass() {
        let records = group(&[0, 1, 5, 2]);
        let err = lay(&records, &Anchor::default()).unwrap_err();
        assert!(matches!(err, Error::UnknownMastery { record_id: 2, mastery: 5 }));
    }

    #[test]
    fn test_jitter_does_not_move_blocks() {
        let records = group(&[0, 1, 2, 0, 1, 2, 0]);
        let mut a = Pcg32::seed_from_u64(1);
        let mut b = Pcg32::seed_from_u64(2);
        let geometry = StackGeometry::default();
        let first = layout_stack(&records, &Anchor::default(), &geometry, &mut a).unwrap();
        let second = layout_stack(&records, &Anchor::default(), &geometry, &mut b).unwrap();

        for (x, y) in first.iter().zip(second.iter()) {
            assert_eq!(x.position, y.position);
            assert_eq!(x.rotation, y.rotation);
        }
        assert!(first.iter().zip(second.iter()).any(|(x, y)| x.scale_jitter != y.scale_jitter));
    }

    #[test]
    fn test_jitter_redrawn_per_block() {
        let placements = lay(&group(&[0; 6]), &Anchor::default()).unwrap();
        let first = placements[0].scale_jitter;
        assert!(placements[1..].iter().any(|p| p.scale_jitter != first));
    }

    proptest! {
        #[test]
        fn prop_jitter_bounds(seed in any::<u64>(), count in 0usize..40) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let records = group(&vec![1; count]);
            let placements = layout_stack(&records, &Anchor::default(), &StackGeometry::default(), &mut rng).unwrap();
            prop_assert_eq!(placements.len(), count);
            for p in &placements {
                for c in p.scale_jitter.to_array() {
                    prop_assert!((JITTER_MIN..0.0).contains(&c), "jitter {} out of range", c);
                }
            }
        }
    }
}
