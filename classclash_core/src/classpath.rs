use crate::vfs::LocalVfs;
use classclash_common::{ClashError, Vfs};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use tracing::{debug, info};

/// Which files of a classpath root take part in collision checking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Only `.class` files
    Classes,
    /// Every regular file
    AllFiles,
}

/// A directory that will be merged into a single application
#[derive(Debug, Clone)]
pub struct ClasspathRoot {
    pub path: PathBuf,
    /// Display name; `#<index>` when none was given
    pub reference: String,
}

impl ClasspathRoot {
    /// Pairs each path with its reference, falling back to `#<index>`
    pub fn from_args(paths: &[PathBuf], refs: &[String]) -> Vec<ClasspathRoot> {
        paths
            .iter()
            .enumerate()
            .map(|(index, path)| ClasspathRoot {
                path: path.clone(),
                reference: refs
                    .get(index)
                    .cloned()
                    .unwrap_or_else(|| format!("#{}", index)),
            })
            .collect()
    }
}

/// A relative path present under more than one root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathCollision {
    /// `/`-separated path relative to each root
    pub path: String,
    /// Indices of the roots containing it, ascending
    pub roots: Vec<usize>,
}

impl PathCollision {
    pub fn class_name(&self) -> String {
        path_to_class_name(&self.path)
    }

    /// Multi-line description listing the references of every root involved
    pub fn describe(&self, label: &str, roots: &[ClasspathRoot], subject: &str) -> String {
        let mut msg = format!("The {}", label);
        for &index in &self.roots {
            let reference = roots
                .get(index)
                .map(|root| root.reference.clone())
                .unwrap_or_else(|| format!("#{}", index));
            msg.push_str("\n> ");
            msg.push_str(&reference);
        }
        msg.push_str("\ncontain collision: ");
        msg.push_str(subject);
        msg
    }
}

/// `a/b/C.class` -> `a.b.C`
pub fn path_to_class_name(path: &str) -> String {
    let stem = match path.rfind('.') {
        Some(dot) if !path[dot..].contains('/') => &path[..dot],
        _ => path,
    };
    stem.replace('/', ".")
}

/// Finds relative paths shared by several classpath roots
pub struct ClasspathScanner {
    mode: ScanMode,
}

impl ClasspathScanner {
    pub fn new(mode: ScanMode) -> Self {
        Self { mode }
    }

    /// Walks every root and returns the colliding paths in path order
    pub fn scan(&self, roots: &[ClasspathRoot]) -> Result<Vec<PathCollision>, ClashError> {
        if roots.len() < 2 {
            return Err(ClashError::Config(format!(
                "At least two classpath roots are required, got {}",
                roots.len()
            )));
        }

        let mut owners: BTreeMap<String, BTreeSet<usize>> = BTreeMap::new();

        for (index, root) in roots.iter().enumerate() {
            if !root.path.is_dir() {
                return Err(ClashError::Path(format!(
                    "Classpath root must be a directory: {}",
                    root.path.display()
                )));
            }

            let vfs = LocalVfs::new(root.path.clone());
            let mut count = 0usize;
            for entry in vfs.list_files()? {
                if self.mode == ScanMode::Classes && !entry.name.ends_with(".class") {
                    continue;
                }
                owners.entry(entry.name).or_default().insert(index);
                count += 1;
            }
            debug!("Scanned {} files under {} ({})", count, root.path.display(), root.reference);
        }

        let collisions: Vec<PathCollision> = owners
            .into_iter()
            .filter(|(_, indices)| indices.len() > 1)
            .map(|(path, indices)| PathCollision {
                path,
                roots: indices.into_iter().collect(),
            })
            .collect();

        info!(
            "Found {} {:?} collisions across {} roots",
            collisions.len(),
            self.mode,
            roots.len()
        );

        Ok(collisions)
    }
}
