//! Pipeline configuration
//!
//! Defaults reproduce the reference deployment: the assessment endpoint and
//! one tower each for 6th, 7th and 8th grade. Loadable from a JSON file;
//! missing fields fall back to their defaults.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_FETCH_TIMEOUT, DEFAULT_GRADES, DEFAULT_SOURCE_URI, STACK_SEPARATION};
use crate::error::{Error, Result};
use crate::stack::{Anchor, StackGeometry};

/// Tower geometry presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GeometryPreset {
    /// First block at anchor + (1, 0.6, 0)
    #[default]
    Flush,
    /// First tier centred over the anchor
    Centered,
}

impl GeometryPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryPreset::Flush => "Flush",
            GeometryPreset::Centered => "Centered",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "flush" => Some(GeometryPreset::Flush),
            "centered" | "centred" | "center" => Some(GeometryPreset::Centered),
            _ => None,
        }
    }

    pub fn geometry(&self) -> StackGeometry {
        match self {
            GeometryPreset::Flush => StackGeometry::default(),
            GeometryPreset::Centered => StackGeometry::centered(),
        }
    }
}

/// One wanted grade and where its tower stands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackSettings {
    pub grade: String,
    pub position: Vec3,
    /// Base yaw of the tower (degrees about +Y)
    #[serde(default)]
    pub yaw_degrees: f32,
}

impl StackSettings {
    pub fn anchor(&self) -> Anchor {
        Anchor::new(self.position, self.yaw_degrees)
    }
}

/// Everything a pipeline run needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Record source (http(s) URL, file:// URI, or path)
    pub source_uri: String,
    pub fetch_timeout_secs: u64,
    /// Jitter seed; `None` seeds from the OS
    pub seed: Option<u64>,
    pub geometry: GeometryPreset,
    /// Lay out grades on the rayon pool
    pub parallel: bool,
    /// Wanted grades, in output order
    pub stacks: Vec<StackSettings>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let stacks = DEFAULT_GRADES
            .iter()
            .enumerate()
            .map(|(i, grade)| StackSettings {
                grade: grade.to_string(),
                position: Vec3::new(i as f32 * STACK_SEPARATION, 0.0, 0.0),
                yaw_degrees: 0.0,
            })
            .collect();

        Self {
            source_uri: DEFAULT_SOURCE_URI.to_string(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT.as_secs(),
            seed: None,
            geometry: GeometryPreset::Flush,
            parallel: false,
            stacks,
        }
    }
}

impl PipelineConfig {
    /// Read a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&json)
            .map_err(|e| Error::Config(format!("invalid config {}: {e}", path.display())))?;
        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.source_uri.trim().is_empty() {
            return Err(Error::Config("source_uri is empty".to_string()));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(Error::Config("fetch_timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn wanted_grades(&self) -> Vec<String> {
        self.stacks.iter().map(|s| s.grade.clone()).collect()
    }

    /// Anchor per grade; a repeated grade keeps its first entry
    pub fn anchors(&self) -> BTreeMap<String, Anchor> {
        let mut anchors = BTreeMap::new();
        for stack in &self.stacks {
            anchors.entry(stack.grade.clone()).or_insert_with(|| stack.anchor());
        }
        anchors
    }
}
