use crate::content::ContentComparator;
use crate::result::AnalysisResult;
use classclash_common::{ArchivePairKey, ClashError, Collision};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArchiveVerdict {
    Identical,
    Differing,
}

/// Partitions raw collisions by archive pair.
///
/// Whole-archive identity is decided once per key, on the first collision
/// seen for it. Collisions are processed sequentially in the given order.
pub struct ArchivePairClassifier<'a> {
    comparator: &'a ContentComparator,
}

impl<'a> ArchivePairClassifier<'a> {
    pub fn new(comparator: &'a ContentComparator) -> Self {
        Self { comparator }
    }

    pub fn classify(&self, collisions: Vec<Collision>) -> Result<AnalysisResult, ClashError> {
        let mut result = AnalysisResult {
            raw_collisions: collisions.len(),
            ..AnalysisResult::default()
        };
        let mut verdicts: HashMap<ArchivePairKey, ArchiveVerdict> = HashMap::new();

        for collision in collisions {
            let (left_archive, right_archive) = match collision.archive_pair() {
                Some((left, right)) => (left.clone(), right.clone()),
                None => {
                    result.other_collisions.push(collision);
                    continue;
                }
            };

            let key = ArchivePairKey::new(left_archive.name(), right_archive.name());

            let verdict = match verdicts.get(&key) {
                Some(verdict) => *verdict,
                None => {
                    // compared for every key, renamed pairs included
                    let verdict = if self
                        .comparator
                        .archives_equal(left_archive.as_ref(), right_archive.as_ref())?
                    {
                        ArchiveVerdict::Identical
                    } else {
                        ArchiveVerdict::Differing
                    };
                    debug!("Archive pair {} is {:?}", key, verdict);
                    if verdict == ArchiveVerdict::Identical {
                        result.identical_archive_pairs.insert(key.clone());
                    }
                    verdicts.insert(key.clone(), verdict);
                    verdict
                }
            };

            match verdict {
                ArchiveVerdict::Identical => {
                    *result.superseded.entry(key).or_default() += 1;
                }
                ArchiveVerdict::Differing => {
                    let same_content = self
                        .comparator
                        .units_equal(collision.left.unit.as_ref(), collision.right.unit.as_ref())?;
                    let bucket = if same_content {
                        &mut result.identical_content_in_differing_archives
                    } else {
                        &mut result.true_collisions_in_archives
                    };
                    bucket.entry(key).or_default().push(collision);
                }
            }
        }

        Ok(result)
    }
}
