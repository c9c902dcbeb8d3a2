use classclash_common::{FileEntry, Vfs, VfsError};
use jwalk::WalkDir;
use std::fs;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

/// Local filesystem VFS implementation (read-only)
pub struct LocalVfs {
    instance_id: String,
    root: PathBuf,
}

impl LocalVfs {
    pub fn new(root: PathBuf) -> Self {
        let instance_id = format!("local:{}", root.display());
        Self { instance_id, root }
    }
}

/// Joins path components with `/` regardless of platform
pub(crate) fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

impl Vfs for LocalVfs {
    fn instance_id(&self) -> &str {
        &self.instance_id
    }

    fn list_files(&self) -> Result<Vec<FileEntry>, VfsError> {
        if !self.root.is_dir() {
            return Err(VfsError::NotADirectory(self.root.display().to_string()));
        }

        let mut entries = Vec::new();
        let walker = WalkDir::new(&self.root).sort(true).skip_hidden(false);

        for entry in walker {
            let entry = entry.map_err(|e| VfsError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Walk error: {}", e),
            )))?;

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let relative = path
                .strip_prefix(&self.root)
                .map_err(|_| VfsError::NotFound(path.display().to_string()))?;
            let size = fs::metadata(&path)?.len();

            entries.push(FileEntry {
                name: slash_path(relative),
                size,
            });
        }

        Ok(entries)
    }

    fn open_file(&self, path: &Path) -> Result<Box<dyn Read + Send>, VfsError> {
        let full_path = self.root.join(path);

        if !full_path.is_file() {
            return Err(VfsError::NotAFile(full_path.display().to_string()));
        }

        let file = fs::File::open(&full_path)?;
        Ok(Box::new(file))
    }

    fn local_path(&self, path: &Path) -> Option<PathBuf> {
        let full_path = self.root.join(path);
        full_path.is_file().then_some(full_path)
    }
}
