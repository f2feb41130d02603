//! Fetch → order → partition → layout
//!
//! A run either produces a full tower for every wanted grade or fails as a
//! whole. Each grade pass draws jitter from its own PCG stream derived from
//! the run seed and the grade's position in the wanted list, so a seeded run
//! is reproducible and sequential and parallel runs agree.

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::Rng;
use rand_pcg::Pcg32;
use rayon::prelude::*;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::fetch::{CancelToken, Fetcher};
use crate::ordering::order;
use crate::partition::{GradeGroup, partition};
use crate::record::MathRecord;
use crate::settings::PipelineConfig;
use crate::stack::{Anchor, PlacementInstruction, StackGeometry, layout_stack};

/// One grade's finished tower
#[derive(Debug, Clone, Serialize)]
pub struct GradeStack {
    pub grade: String,
    pub anchor: Anchor,
    pub placements: Vec<PlacementInstruction>,
}

/// Result of a pipeline run, one stack per wanted grade in request order
#[derive(Debug, Clone, Serialize)]
pub struct StackLayout {
    /// Seed the jitter streams were derived from
    pub seed: u64,
    pub stacks: Vec<GradeStack>,
}

impl StackLayout {
    pub fn get(&self, grade: &str) -> Option<&GradeStack> {
        self.stacks.iter().find(|s| s.grade == grade)
    }

    /// Total placed blocks across all stacks
    pub fn block_count(&self) -> usize {
        self.stacks.iter().map(|s| s.placements.len()).sum()
    }
}

/// RNG for one grade pass
pub fn grade_rng(seed: u64, grade_index: usize) -> Pcg32 {
    Pcg32::new(seed, grade_index as u64)
}

/// Pipeline runner
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    fetcher: Fetcher,
    geometry: StackGeometry,
    seed: Option<u64>,
    parallel: bool,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            fetcher: Fetcher::new().with_timeout(config.fetch_timeout()),
            geometry: config.geometry.geometry(),
            seed: config.seed,
            parallel: config.parallel,
        }
    }

    pub fn with_fetcher(mut self, fetcher: Fetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.fetcher = self.fetcher.with_cancel(token);
        self
    }

    pub fn with_geometry(mut self, geometry: StackGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Fetch records from `source_uri` and build one tower per wanted grade
    pub fn run<S: AsRef<str>>(
        &self,
        source_uri: &str,
        wanted_grades: &[S],
        anchors: &BTreeMap<String, Anchor>,
    ) -> Result<StackLayout> {
        check_anchors(wanted_grades, anchors)?;
        let records = self.fetcher.fetch(source_uri)?;
        self.layout_records(records, wanted_grades, anchors)
    }

    /// Order, partition and lay out already-fetched records
    pub fn layout_records<S: AsRef<str>>(
        &self,
        records: Vec<MathRecord>,
        wanted_grades: &[S],
        anchors: &BTreeMap<String, Anchor>,
    ) -> Result<StackLayout> {
        check_anchors(wanted_grades, anchors)?;

        let shared: Vec<Arc<MathRecord>> = records.into_iter().map(Arc::new).collect();
        let ordered = order(&shared);
        let groups = partition(&ordered, wanted_grades);
        log::info!(
            "Laying out {} of {} records across {} grades",
            groups.record_count(),
            ordered.len(),
            groups.groups.len()
        );

        let seed = self.seed.unwrap_or_else(|| rand::rng().random());
        let pass = |(index, group): (usize, &GradeGroup)| -> Result<GradeStack> {
            // Presence checked above
            let anchor = anchors
                .get(&group.grade)
                .copied()
                .ok_or_else(|| Error::MissingAnchor { grade: group.grade.clone() })?;
            let mut rng = grade_rng(seed, index);
            let placements = layout_stack(&group.records, &anchor, &self.geometry, &mut rng).map_err(|e| {
                Error::Layout {
                    grade: group.grade.clone(),
                    source: Box::new(e),
                }
            })?;
            log::debug!("Grade '{}': {} blocks", group.grade, placements.len());
            Ok(GradeStack {
                grade: group.grade.clone(),
                anchor,
                placements,
            })
        };

        let stacks = if self.parallel {
            groups.groups.par_iter().enumerate().map(pass).collect::<Result<Vec<_>>>()?
        } else {
            groups.groups.iter().enumerate().map(pass).collect::<Result<Vec<_>>>()?
        };

        let layout = StackLayout { seed, stacks };
        log::info!("Layout complete: {} blocks (seed {seed})", layout.block_count());
        Ok(layout)
    }
}

/// Run the whole pipeline from configuration
pub fn run_config(config: &PipelineConfig) -> Result<StackLayout> {
    config.validate()?;
    Pipeline::from_config(config).run(&config.source_uri, &config.wanted_grades(), &config.anchors())
}

fn check_anchors<S: AsRef<str>>(wanted: &[S], anchors: &BTreeMap<String, Anchor>) -> Result<()> {
    match wanted.iter().find(|g| !anchors.contains_key(g.as_ref())) {
        Some(grade) => Err(Error::MissingAnchor {
            grade: grade.as_ref().to_string(),
        }),
        None => Ok(()),
    }
}
