pub mod vfs;
pub mod content;
pub mod collector;
pub mod detector;
pub mod classifier;
pub mod result;
pub mod analyzer;
pub mod war;
pub mod memory;
pub mod classpath;

#[cfg(test)]
mod tests_war;

pub use vfs::{LocalVfs, ZipVfs};
pub use content::ContentComparator;
pub use collector::collect_entries;
pub use detector::{detect_collisions, detect_collisions_with};
pub use classifier::ArchivePairClassifier;
pub use result::{is_same_artifact, AnalysisResult, ArchivePairReport, CollisionSummary};
pub use analyzer::CollisionAnalyzer;
pub use war::WarBundle;
pub use memory::{MemoryArchive, MemoryBundle, MemoryUnit};
pub use classpath::{path_to_class_name, ClasspathRoot, ClasspathScanner, PathCollision, ScanMode};
