//! Boundary to the rendering and interaction layers
//!
//! The scene side implements [`Renderer`] and receives placements by value;
//! nothing here knows about meshes or engines. [`MaterialPalette`] maps a
//! material class to whatever handle the renderer spawns from.

use std::fmt;

use crate::error::{Error, Result};
use crate::pipeline::StackLayout;
use crate::record::{MaterialClass, MathRecord};
use crate::stack::{Anchor, PlacementInstruction};

/// Consumer of placement instructions
pub trait Renderer {
    type Error: fmt::Display;

    /// Spawn one block under `grade`'s tower
    fn place(&mut self, grade: &str, anchor: &Anchor, placement: &PlacementInstruction) -> std::result::Result<(), Self::Error>;
}

/// Lookup table from material class to a caller-supplied handle
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialPalette<T> {
    entries: [T; 3],
}

impl<T> MaterialPalette<T> {
    pub fn new(glass: T, wood: T, stone: T) -> Self {
        Self {
            entries: [glass, wood, stone],
        }
    }

    pub fn get(&self, material: MaterialClass) -> &T {
        &self.entries[material.index()]
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> MaterialPalette<U> {
        MaterialPalette {
            entries: self.entries.map(f),
        }
    }
}

/// Feed every placement to `renderer`, tower by tower, in layout order
///
/// Stops at the first renderer failure.
pub fn present<R: Renderer>(layout: &StackLayout, renderer: &mut R) -> Result<usize> {
    let mut placed = 0;
    for stack in &layout.stacks {
        for placement in &stack.placements {
            renderer
                .place(&stack.grade, &stack.anchor, placement)
                .map_err(|e| Error::Render {
                    record_id: placement.record.id,
                    reason: e.to_string(),
                })?;
            placed += 1;
        }
    }
    log::info!("Presented {placed} blocks");
    Ok(placed)
}

/// Text shown for a hovered block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDetails {
    pub heading: String,
    pub cluster: String,
    pub standard: String,
}

impl BlockDetails {
    /// Shown when no block is hovered
    pub fn placeholder() -> Self {
        Self {
            heading: "[Grade level]: [Domain]".to_string(),
            cluster: "[Cluster]".to_string(),
            standard: "[Standard ID]: [Standard Description]".to_string(),
        }
    }
}

impl From<&MathRecord> for BlockDetails {
    fn from(record: &MathRecord) -> Self {
        Self {
            heading: format!("{}: {}", record.grade, record.domain),
            cluster: record.cluster.clone(),
            standard: format!("{}: {}", record.standard_id, record.standard_description),
        }
    }
}

impl fmt::Display for BlockDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n\n{}\n\n{}", self.heading, self.cluster, self.standard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Pipeline;
    use crate::record::sample;
    use glam::Vec3;
    use std::collections::BTreeMap;

    /// Records what it was asked to spawn
    #[derive(Default)]
    struct SceneLog {
        spawned: Vec<(String, &'static str, Vec3, i64)>,
        fail_on: Option<i64>,
    }

    impl Renderer for SceneLog {
        type Error = String;

        fn place(&mut self, grade: &str, _anchor: &Anchor, placement: &PlacementInstruction) -> std::result::Result<(), String> {
            if self.fail_on == Some(placement.record.id) {
                return Err("prefab missing".to_string());
            }
            let palette = MaterialPalette::new("glass.prefab", "wood.prefab", "stone.prefab");
            self.spawned.push((
                grade.to_string(),
                *palette.get(placement.material),
                placement.position,
                placement.record.id,
            ));
            Ok(())
        }
    }

    fn layout() -> StackLayout {
        let anchors: BTreeMap<String, Anchor> = [
            ("6th Grade".to_string(), Anchor::default()),
            ("7th Grade".to_string(), Anchor::at(Vec3::new(5.0, 0.0, 0.0))),
        ]
        .into_iter()
        .collect();
        let records = vec![
            sample(1, "7th Grade", "A", 1),
            sample(2, "6th Grade", "A", 0),
            sample(3, "6th Grade", "B", 2),
        ];
        Pipeline::new()
            .with_seed(11)
            .layout_records(records, &["6th Grade", "7th Grade"], &anchors)
            .unwrap()
    }

    #[test]
    fn test_present_feeds_every_placement() {
        let mut scene = SceneLog::default();
        let placed = present(&layout(), &mut scene).unwrap();
        assert_eq!(placed, 3);

        let ids: Vec<i64> = scene.spawned.iter().map(|s| s.3).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert_eq!(scene.spawned[0].1, "glass.prefab");
        assert_eq!(scene.spawned[1].1, "stone.prefab");
        assert_eq!(scene.spawned[2].0, "7th Grade");
        assert_eq!(scene.spawned[2].1, "wood.prefab");
        assert!(scene.spawned[2].2.abs_diff_eq(Vec3::new(6.0, 0.6, 0.0), 1e-6));
    }

    #[test]
    fn test_present_reports_renderer_failure() {
        let mut scene = SceneLog {
            fail_on: Some(3),
            ..Default::default()
        };
        let err = present(&layout(), &mut scene).unwrap_err();
        assert!(matches!(err, Error::Render { record_id: 3, .. }));
        assert_eq!(scene.spawned.len(), 1);
    }

    #[test]
    fn test_palette_map() {
        let palette = MaterialPalette::new(1, 2, 3).map(|n| n * 10);
        assert_eq!(*palette.get(MaterialClass::Wood), 20);
        assert_eq!(*palette.get(MaterialClass::Stone), 30);
    }

    #[test]
    fn test_block_details_text() {
        let mut record = sample(5, "8th Grade", "Geometry", 1);
        record.cluster = "Understand congruence".to_string();
        record.standard_id = "8.G.A.1".to_string();
        record.standard_description = "Verify properties of rotations".to_string();

        assert_eq!(
            BlockDetails::from(&record).to_string(),
            "8th Grade: Geometry\n\nUnderstand congruence\n\n8.G.A.1: Verify properties of rotations"
        );
        assert_eq!(
            BlockDetails::placeholder().to_string(),
            "[Grade level]: [Domain]\n\n[Cluster]\n\n[Standard ID]: [Standard Description]"
        );
    }
}
