use crate::{ComparableUnit, LibraryArchive};
use std::fmt;
use std::sync::Arc;

/// A regular file listed by a [`crate::Vfs`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// `/`-separated path relative to the VFS root
    pub name: String,
    pub size: u64,
}

/// Where a unit lives inside its bundle
#[derive(Clone)]
pub enum Location {
    /// Directly in the bundle (`WEB-INF/classes`)
    TopLevel,
    /// Inside a nested library archive (`WEB-INF/lib/*.jar`)
    InArchive(Arc<dyn LibraryArchive>),
}

impl Location {
    pub fn archive(&self) -> Option<&Arc<dyn LibraryArchive>> {
        match self {
            Location::TopLevel => None,
            Location::InArchive(archive) => Some(archive),
        }
    }

    pub fn is_top_level(&self) -> bool {
        matches!(self, Location::TopLevel)
    }

    /// Human-readable origin, e.g. `WEB-INF/classes` or `WEB-INF/lib/commons-io-2.5.jar`
    pub fn describe(&self) -> String {
        match self {
            Location::TopLevel => "WEB-INF/classes".to_string(),
            Location::InArchive(archive) => format!("WEB-INF/lib/{}", archive.name()),
        }
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::TopLevel => f.write_str("TopLevel"),
            Location::InArchive(archive) => f.debug_tuple("InArchive").field(&archive.name()).finish(),
        }
    }
}

/// A unit together with the place it was collected from
#[derive(Clone)]
pub struct UnitEntry {
    pub unit: Arc<dyn ComparableUnit>,
    pub location: Location,
}

impl UnitEntry {
    pub fn new(unit: Arc<dyn ComparableUnit>, location: Location) -> Self {
        Self { unit, location }
    }

    pub fn name(&self) -> &str {
        self.unit.canonical_name()
    }
}

impl fmt::Debug for UnitEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitEntry")
            .field("name", &self.name())
            .field("location", &self.location)
            .finish()
    }
}

/// Two units, one from each bundle, sharing a canonical name
#[derive(Debug, Clone)]
pub struct Collision {
    pub left: UnitEntry,
    pub right: UnitEntry,
}

impl Collision {
    pub fn name(&self) -> &str {
        self.left.name()
    }

    /// Both archives, if neither side is a top-level unit
    pub fn archive_pair(&self) -> Option<(&Arc<dyn LibraryArchive>, &Arc<dyn LibraryArchive>)> {
        match (self.left.location.archive(), self.right.location.archive()) {
            (Some(left), Some(right)) => Some((left, right)),
            _ => None,
        }
    }
}

/// Grouping key for archive-vs-archive collisions
///
/// Equality and hashing use the archive names only. Two unrelated archives
/// that share a file name land under the same key; the whole-archive byte
/// check done on the first collision of a key is what tells them apart.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArchivePairKey {
    /// Archive name in the left bundle
    pub left: String,
    /// Archive name in the right bundle
    pub right: String,
}

impl ArchivePairKey {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

impl fmt::Display for ArchivePairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} x {}]", self.left, self.right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_archive_pair_key_equality_by_name() {
        let a = ArchivePairKey::new("shared.jar", "shared.jar");
        let b = ArchivePairKey::new(String::from("shared.jar"), "shared.jar");
        let c = ArchivePairKey::new("shared.jar", "other.jar");

        let mut set = HashSet::new();
        set.insert(a.clone());
        assert!(set.contains(&b));
        assert!(!set.contains(&c));
        assert_eq!(a, b);
    }

    #[test]
    fn test_archive_pair_key_is_ordered_by_side() {
        let ab = ArchivePairKey::new("a.jar", "b.jar");
        let ba = ArchivePairKey::new("b.jar", "a.jar");
        assert_ne!(ab, ba);
        assert_eq!(ab.to_string(), "[a.jar x b.jar]");
    }

    #[test]
    fn test_top_level_location() {
        let loc = Location::TopLevel;
        assert!(loc.is_top_level());
        assert!(loc.archive().is_none());
        assert_eq!(loc.describe(), "WEB-INF/classes");
        assert_eq!(format!("{:?}", loc), "TopLevel");
    }
}
