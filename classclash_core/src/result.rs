use classclash_common::{ArchivePairKey, Collision};
use std::collections::{BTreeMap, BTreeSet};

/// Four-way partition of every cross-bundle collision
#[derive(Debug, Clone, Default)]
pub struct AnalysisResult {
    /// Archive pairs whose raw bytes are identical
    pub identical_archive_pairs: BTreeSet<ArchivePairKey>,
    /// Collisions with identical unit bytes inside archives that differ
    pub identical_content_in_differing_archives: BTreeMap<ArchivePairKey, Vec<Collision>>,
    /// Collisions with differing unit bytes inside archives that differ
    pub true_collisions_in_archives: BTreeMap<ArchivePairKey, Vec<Collision>>,
    /// Collisions where at least one side is a top-level unit
    pub other_collisions: Vec<Collision>,
    /// Collisions dropped because their archive pair is identical
    pub superseded: BTreeMap<ArchivePairKey, usize>,
    /// Number of collisions found before classification
    pub raw_collisions: usize,
}

/// Collision counts per partition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionSummary {
    pub raw_collisions: usize,
    pub identical_archive_pairs: usize,
    pub superseded: usize,
    pub identical_content: usize,
    pub true_collisions: usize,
    pub other_collisions: usize,
}

impl CollisionSummary {
    /// Every raw collision is accounted for exactly once
    pub fn is_complete(&self) -> bool {
        self.superseded + self.identical_content + self.true_collisions + self.other_collisions
            == self.raw_collisions
    }
}

/// A differing archive pair with true collisions, tagged for reporting
#[derive(Debug, Clone)]
pub struct ArchivePairReport<'a> {
    pub key: &'a ArchivePairKey,
    pub collisions: &'a [Collision],
    pub left_units: usize,
    pub right_units: usize,
    /// Most units overlap on both sides: likely one library at two versions
    pub same_artifact: bool,
}

/// True iff `collisions` covers more than `threshold` of both archives
pub fn is_same_artifact(
    collisions: usize,
    left_units: usize,
    right_units: usize,
    threshold: f64,
) -> bool {
    if left_units == 0 || right_units == 0 {
        return false;
    }
    let n = collisions as f64;
    n / left_units as f64 > threshold && n / right_units as f64 > threshold
}

impl AnalysisResult {
    pub fn summary(&self) -> CollisionSummary {
        CollisionSummary {
            raw_collisions: self.raw_collisions,
            identical_archive_pairs: self.identical_archive_pairs.len(),
            superseded: self.superseded.values().sum(),
            identical_content: self
                .identical_content_in_differing_archives
                .values()
                .map(Vec::len)
                .sum(),
            true_collisions: self.true_collisions_in_archives.values().map(Vec::len).sum(),
            other_collisions: self.other_collisions.len(),
        }
    }

    /// Nothing collided at all
    pub fn is_empty(&self) -> bool {
        self.identical_archive_pairs.is_empty()
            && self.identical_content_in_differing_archives.is_empty()
            && self.true_collisions_in_archives.is_empty()
            && self.other_collisions.is_empty()
    }

    /// Collisions that will break a merged application
    pub fn has_blocking_collisions(&self) -> bool {
        !self.true_collisions_in_archives.is_empty() || !self.other_collisions.is_empty()
    }

    /// Harmless duplication worth mentioning
    pub fn has_warnings(&self) -> bool {
        !self.identical_archive_pairs.is_empty()
            || !self.identical_content_in_differing_archives.is_empty()
    }

    /// Applies the same-artifact heuristic to every key with true collisions.
    ///
    /// Unit counts come from the archives of the first collision under the key.
    pub fn archive_pair_reports(&self, threshold: f64) -> Vec<ArchivePairReport<'_>> {
        self.true_collisions_in_archives
            .iter()
            .filter_map(|(key, collisions)| {
                let (left, right) = collisions.first()?.archive_pair()?;
                let left_units = left.units().len();
                let right_units = right.units().len();
                Some(ArchivePairReport {
                    key,
                    collisions,
                    left_units,
                    right_units,
                    same_artifact: is_same_artifact(
                        collisions.len(),
                        left_units,
                        right_units,
                        threshold,
                    ),
                })
            })
            .collect()
    }
}
