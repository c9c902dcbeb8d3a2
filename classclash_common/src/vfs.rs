use crate::{FileEntry, VfsError};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Read-only virtual file system over the storage a bundle lives in
///
/// This trait lets classclash treat an exploded WAR directory and a packed
/// `.war` archive uniformly when enumerating compiled units and libraries.
pub trait Vfs: Send + Sync {
    /// Uniquely identifies the VFS instance (e.g., "local:/srv/app", "zip:app.war")
    fn instance_id(&self) -> &str;

    /// Lists every regular file, with `/`-separated names relative to the root
    fn list_files(&self) -> Result<Vec<FileEntry>, VfsError>;

    /// Opens a file for reading. Every call returns an independent reader.
    fn open_file(&self, path: &Path) -> Result<Box<dyn Read + Send>, VfsError>;

    /// Path of the file on the local filesystem, when the VFS is backed by one.
    ///
    /// Callers needing a seekable file use it to avoid copying.
    fn local_path(&self, _path: &Path) -> Option<PathBuf> {
        None
    }
}
