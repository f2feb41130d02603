//! Deterministic record ordering
//!
//! Sort keys, highest priority first: grade, domain, cluster, standard id.
//! All comparisons are plain string comparisons, so "10th Grade" sorts
//! before "6th Grade". Ties keep their input order.

use std::borrow::Borrow;
use std::cmp::Ordering;

use crate::record::MathRecord;

/// Compare two records by the ordering keys
pub fn compare(a: &MathRecord, b: &MathRecord) -> Ordering {
    a.grade
        .cmp(&b.grade)
        .then_with(|| a.domain.cmp(&b.domain))
        .then_with(|| a.cluster.cmp(&b.cluster))
        .then_with(|| a.standard_id.cmp(&b.standard_id))
}

/// Return a sorted copy of `records`; the input is left untouched
pub fn order<R>(records: &[R]) -> Vec<R>
where
    R: Borrow<MathRecord> + Clone,
{
    let mut sorted = records.to_vec();
    // `sort_by` is stable
    sorted.sort_by(|a, b| compare(a.borrow(), b.borrow()));
    sorted
}
