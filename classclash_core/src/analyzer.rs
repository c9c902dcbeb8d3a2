use crate::classifier::ArchivePairClassifier;
use crate::collector::collect_entries;
use crate::content::ContentComparator;
use crate::detector::detect_collisions_with;
use crate::result::AnalysisResult;
use classclash_common::{AppConfig, Bundle, ClashError};
use tracing::info;

/// Collision analysis between two bundles
pub struct CollisionAnalyzer {
    comparator: ContentComparator,
    parallel_detection: bool,
}

impl Default for CollisionAnalyzer {
    fn default() -> Self {
        Self::new(ContentComparator::default())
    }
}

impl CollisionAnalyzer {
    pub fn new(comparator: ContentComparator) -> Self {
        Self {
            comparator,
            parallel_detection: true,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(ContentComparator::new(config.buffer_size))
            .with_parallel_detection(config.parallel_detection)
    }

    pub fn with_parallel_detection(mut self, enabled: bool) -> Self {
        self.parallel_detection = enabled;
        self
    }

    /// Collect, match and classify. Any I/O failure aborts the whole analysis.
    pub fn analyze(&self, left: &dyn Bundle, right: &dyn Bundle) -> Result<AnalysisResult, ClashError> {
        info!(
            "Analyzing collisions between {} and {}",
            left.display_name(),
            right.display_name()
        );

        let left_entries = collect_entries(left);
        let right_entries = collect_entries(right);
        info!(
            "Collected {} units from {} and {} units from {}",
            left_entries.len(),
            left.display_name(),
            right_entries.len(),
            right.display_name()
        );

        let collisions = detect_collisions_with(&left_entries, &right_entries, self.parallel_detection);
        info!("Found {} name collisions", collisions.len());

        let result = ArchivePairClassifier::new(&self.comparator).classify(collisions)?;

        let summary = result.summary();
        info!(
            "Classified: {} identical archive pairs ({} collisions), {} identical classes, {} true collisions in archives, {} other collisions",
            summary.identical_archive_pairs,
            summary.superseded,
            summary.identical_content,
            summary.true_collisions,
            summary.other_collisions
        );

        Ok(result)
    }
}
