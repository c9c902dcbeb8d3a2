//! In-memory bundles, for embedding callers that already hold the bytes and
//! for tests.

use classclash_common::{Bundle, ComparableUnit, LibraryArchive, VfsError};
use std::io::{Cursor, Read};
use std::sync::Arc;

/// A unit whose content is held in memory
pub struct MemoryUnit {
    name: String,
    content: Arc<[u8]>,
}

impl MemoryUnit {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        let content: Vec<u8> = content.into();
        Self {
            name: name.into(),
            content: Arc::from(content),
        }
    }
}

impl ComparableUnit for MemoryUnit {
    fn canonical_name(&self) -> &str {
        &self.name
    }

    fn open_stream(&self) -> Result<Box<dyn Read + Send>, VfsError> {
        Ok(Box::new(Cursor::new(SharedBytes(self.content.clone()))))
    }
}

/// A library archive held in memory
pub struct MemoryArchive {
    name: String,
    units: Vec<Arc<dyn ComparableUnit>>,
    raw: Arc<[u8]>,
}

impl MemoryArchive {
    /// Builds an archive whose raw bytes are derived from its units, so two
    /// archives with the same units in the same order compare equal.
    pub fn new(name: impl Into<String>, units: Vec<MemoryUnit>) -> Self {
        let mut raw = Vec::new();
        for unit in &units {
            raw.extend_from_slice(&(unit.name.len() as u64).to_le_bytes());
            raw.extend_from_slice(unit.name.as_bytes());
            raw.extend_from_slice(&(unit.content.len() as u64).to_le_bytes());
            raw.extend_from_slice(&unit.content);
        }
        let units = units
            .into_iter()
            .map(|unit| Arc::new(unit) as Arc<dyn ComparableUnit>)
            .collect();
        Self {
            name: name.into(),
            units,
            raw: Arc::from(raw),
        }
    }

    /// Overrides the raw archive bytes
    pub fn with_raw_bytes(mut self, raw: impl Into<Vec<u8>>) -> Self {
        let raw: Vec<u8> = raw.into();
        self.raw = Arc::from(raw);
        self
    }

    /// Uses arbitrary unit implementations
    pub fn from_units(
        name: impl Into<String>,
        units: Vec<Arc<dyn ComparableUnit>>,
        raw: impl Into<Vec<u8>>,
    ) -> Self {
        let raw: Vec<u8> = raw.into();
        Self {
            name: name.into(),
            units,
            raw: Arc::from(raw),
        }
    }
}

impl LibraryArchive for MemoryArchive {
    fn name(&self) -> &str {
        &self.name
    }

    fn units(&self) -> &[Arc<dyn ComparableUnit>] {
        &self.units
    }

    fn open_stream(&self) -> Result<Box<dyn Read + Send>, VfsError> {
        Ok(Box::new(Cursor::new(SharedBytes(self.raw.clone()))))
    }
}

/// A bundle held in memory
pub struct MemoryBundle {
    name: String,
    units: Vec<Arc<dyn ComparableUnit>>,
    archives: Vec<Arc<dyn LibraryArchive>>,
}

impl MemoryBundle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            units: Vec::new(),
            archives: Vec::new(),
        }
    }

    pub fn with_unit(mut self, unit: MemoryUnit) -> Self {
        self.units.push(Arc::new(unit));
        self
    }

    pub fn with_archive(mut self, archive: MemoryArchive) -> Self {
        self.archives.push(Arc::new(archive));
        self
    }

    pub fn with_dyn_archive(mut self, archive: Arc<dyn LibraryArchive>) -> Self {
        self.archives.push(archive);
        self
    }
}

impl Bundle for MemoryBundle {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn units(&self) -> &[Arc<dyn ComparableUnit>] {
        &self.units
    }

    fn archives(&self) -> &[Arc<dyn LibraryArchive>] {
        &self.archives
    }
}

/// Cheaply clonable byte buffer usable as a `Cursor` backing store
#[derive(Clone)]
struct SharedBytes(Arc<[u8]>);

impl AsRef<[u8]> for SharedBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
