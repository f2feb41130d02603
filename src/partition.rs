//! Grouping ordered records by grade label

use std::sync::Arc;

use crate::record::MathRecord;

/// Records sharing one grade label, in global sort order
#[derive(Debug, Clone, PartialEq)]
pub struct GradeGroup {
    pub grade: String,
    pub records: Vec<Arc<MathRecord>>,
}

impl GradeGroup {
    pub fn new(grade: impl Into<String>) -> Self {
        Self {
            grade: grade.into(),
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// One group per wanted grade, in the order the grades were requested
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GradePartition {
    pub groups: Vec<GradeGroup>,
}

impl GradePartition {
    pub fn get(&self, grade: &str) -> Option<&GradeGroup> {
        self.groups.iter().find(|g| g.grade == grade)
    }

    pub fn grades(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.grade.as_str())
    }

    /// Total records across all groups
    pub fn record_count(&self) -> usize {
        self.groups.iter().map(GradeGroup::len).sum()
    }
}

/// Bucket `ordered` into the `wanted` grades
///
/// Records whose grade is not wanted are dropped. Duplicate wanted labels
/// collapse onto their first occurrence.
pub fn partition<S: AsRef<str>>(ordered: &[Arc<MathRecord>], wanted: &[S]) -> GradePartition {
    let mut groups: Vec<GradeGroup> = Vec::with_capacity(wanted.len());
    for label in wanted {
        let label = label.as_ref();
        if groups.iter().any(|g| g.grade == label) {
            log::warn!("Grade '{label}' requested more than once; ignoring duplicate");
            continue;
        }
        groups.push(GradeGroup::new(label));
    }

    let mut dropped = 0usize;
    for record in ordered {
        match groups.iter_mut().find(|g| g.grade == record.grade) {
            Some(group) => group.records.push(Arc::clone(record)),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        log::debug!("Dropped {dropped} records outside the wanted grades");
    }
    for group in groups.iter().filter(|g| g.is_empty()) {
        log::warn!("Grade '{}' has no records; its stack will be empty", group.grade);
    }

    GradePartition { groups }
}
