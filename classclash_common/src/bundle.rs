use crate::VfsError;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

/// A compiled unit that can be compared byte for byte
///
/// Identity for collision purposes is the canonical name, never the object.
pub trait ComparableUnit: Send + Sync {
    /// Fully-qualified dotted name, e.g. `java.util.List`
    fn canonical_name(&self) -> &str;

    /// Opens a fresh stream over the unit's bytes.
    ///
    /// Called once per comparison, so implementations must support being
    /// invoked any number of times.
    fn open_stream(&self) -> Result<Box<dyn Read + Send>, VfsError>;

    /// `List` for `java.util.List`
    fn simple_name(&self) -> &str {
        let name = self.canonical_name();
        match name.rfind('.') {
            Some(idx) => &name[idx + 1..],
            None => name,
        }
    }

    /// `java/util/List.class` for `java.util.List`
    fn class_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.class", self.canonical_name().replace('.', "/")))
    }
}

/// A library archive nested in a bundle, e.g. `WEB-INF/lib/commons-io-2.5.jar`
pub trait LibraryArchive: Send + Sync {
    /// Archive file name, used as its natural key (`commons-io-2.5.jar`)
    fn name(&self) -> &str;

    /// Units contained in the archive, in archive order
    fn units(&self) -> &[Arc<dyn ComparableUnit>];

    /// Opens a fresh stream over the archive's raw bytes
    fn open_stream(&self) -> Result<Box<dyn Read + Send>, VfsError>;
}

/// A deployable bundle: its own units plus nested library archives
pub trait Bundle: Send + Sync {
    /// Identifies the bundle in logs and reports
    fn display_name(&self) -> &str;

    /// Top-level units (`WEB-INF/classes`)
    fn units(&self) -> &[Arc<dyn ComparableUnit>];

    /// Nested library archives (`WEB-INF/lib/*.jar`)
    fn archives(&self) -> &[Arc<dyn LibraryArchive>];
}
