use crate::vfs::archive::{list_zip_files, open_entry_stream, open_zip};
use crate::vfs::{LocalVfs, ZipVfs};
use classclash_common::{Bundle, ClashError, ComparableUnit, LibraryArchive, Vfs, VfsError};
use regex::Regex;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use tempfile::TempDir;
use tracing::{debug, info};

static CLASSES_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^WEB-INF/classes/(.+/)?(.+)\.class$").expect("valid regex")
});

static LIB_JAR_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^WEB-INF/lib/(.+\.jar)$").expect("valid regex")
});

static JAR_CLASS_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+/)?(.+)\.class$").expect("valid regex")
});

/// `com/x/` + `Foo` -> `com.x.Foo`
fn canonical_class_name(package_path: Option<&str>, simple_name: &str) -> String {
    match package_path {
        Some(path) => format!("{}{}", path.replace('/', "."), simple_name),
        None => simple_name.to_string(),
    }
}

/// Canonical class name of an entry matching `pattern`, if it matches
fn match_class(pattern: &Regex, entry_name: &str) -> Option<String> {
    let caps = pattern.captures(entry_name)?;
    let package_path = caps.get(1).map(|m| m.as_str());
    let simple_name = caps.get(2)?.as_str();
    Some(canonical_class_name(package_path, simple_name))
}

/// A web application bundle: `WEB-INF/classes` plus `WEB-INF/lib/*.jar`
///
/// Backed by either a packed `.war` file or an exploded directory.
pub struct WarBundle {
    display_name: String,
    units: Vec<Arc<dyn ComparableUnit>>,
    archives: Vec<Arc<dyn LibraryArchive>>,
}

impl WarBundle {
    /// Opens a `.war` file or an exploded WAR directory
    pub fn open(path: &Path) -> Result<Self, ClashError> {
        let display_name = path.display().to_string();
        if path.is_dir() {
            let vfs = LocalVfs::new(path.to_path_buf());
            Self::from_vfs(Arc::new(vfs), display_name)
        } else if path.is_file() {
            let vfs = ZipVfs::new(path.to_path_buf())?;
            Self::from_vfs(Arc::new(vfs), display_name)
        } else {
            Err(ClashError::Path(format!("Path does not exist: {}", path.display())))
        }
    }

    /// Builds the bundle from any VFS laid out like a WAR.
    ///
    /// Library archives are never held in memory: a jar already on disk is
    /// read in place, any other jar is streamed once into a temporary
    /// directory that lives as long as the bundle. An unreadable library is a
    /// fatal error.
    pub fn from_vfs(vfs: Arc<dyn Vfs>, display_name: impl Into<String>) -> Result<Self, ClashError> {
        let display_name = display_name.into();
        let mut units: Vec<Arc<dyn ComparableUnit>> = Vec::new();
        let mut archives: Vec<Arc<dyn LibraryArchive>> = Vec::new();
        let mut spill_dir: Option<Arc<TempDir>> = None;

        for entry in vfs.list_files()? {
            if let Some(class_name) = match_class(&CLASSES_ENTRY, &entry.name) {
                units.push(Arc::new(VfsUnit {
                    name: class_name,
                    vfs: vfs.clone(),
                    path: PathBuf::from(&entry.name),
                }));
            } else if let Some(caps) = LIB_JAR_ENTRY.captures(&entry.name) {
                let jar_name = caps[1].to_string();
                let entry_path = Path::new(&entry.name);
                let file = match vfs.local_path(entry_path) {
                    Some(path) => JarFile::Local(path),
                    None => {
                        let dir = match spill_dir.clone() {
                            Some(dir) => dir,
                            None => {
                                let dir = Arc::new(TempDir::new()?);
                                spill_dir = Some(dir.clone());
                                dir
                            }
                        };
                        JarFile::spill(vfs.as_ref(), entry_path, dir, archives.len())?
                    }
                };
                let jar = NestedJar::load(jar_name, Arc::new(file))?;
                debug!("Loaded {} with {} classes", jar.name, jar.units.len());
                archives.push(Arc::new(jar));
            }
        }

        info!(
            "Opened {} ({}): {} classes, {} libraries",
            display_name,
            vfs.instance_id(),
            units.len(),
            archives.len()
        );

        Ok(Self {
            display_name,
            units,
            archives,
        })
    }
}

impl Bundle for WarBundle {
    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn units(&self) -> &[Arc<dyn ComparableUnit>] {
        &self.units
    }

    fn archives(&self) -> &[Arc<dyn LibraryArchive>] {
        &self.archives
    }
}

/// A class file stored directly in the bundle's VFS
struct VfsUnit {
    name: String,
    vfs: Arc<dyn Vfs>,
    path: PathBuf,
}

impl ComparableUnit for VfsUnit {
    fn canonical_name(&self) -> &str {
        &self.name
    }

    fn open_stream(&self) -> Result<Box<dyn Read + Send>, VfsError> {
        self.vfs.open_file(&self.path)
    }
}

/// Where a library jar can be read from
enum JarFile {
    /// A jar file of an exploded bundle
    Local(PathBuf),
    /// A copy of a jar nested in a packed bundle
    Spilled { path: PathBuf, _dir: Arc<TempDir> },
}

impl JarFile {
    fn spill(vfs: &dyn Vfs, entry: &Path, dir: Arc<TempDir>, index: usize) -> Result<Self, VfsError> {
        let path = dir.path().join(format!("{:04}.jar", index));
        let mut reader = vfs.open_file(entry)?;
        let mut out = File::create(&path)?;
        let copied = io::copy(&mut reader, &mut out)?;
        debug!("Spilled {} ({} bytes) to {}", entry.display(), copied, path.display());
        Ok(JarFile::Spilled { path, _dir: dir })
    }

    fn path(&self) -> &Path {
        match self {
            JarFile::Local(path) => path,
            JarFile::Spilled { path, .. } => path,
        }
    }

    /// Each call yields an independent cursor
    fn open(&self) -> Result<File, VfsError> {
        Ok(File::open(self.path())?)
    }
}

/// A library jar from `WEB-INF/lib`
struct NestedJar {
    name: String,
    file: Arc<JarFile>,
    units: Vec<Arc<dyn ComparableUnit>>,
}

impl NestedJar {
    fn load(name: String, file: Arc<JarFile>) -> Result<Self, VfsError> {
        let mut archive = open_zip(file.open()?, &name)?;

        let units = list_zip_files(&mut archive, &name)?
            .into_iter()
            .filter_map(|entry| {
                let class_name = match_class(&JAR_CLASS_ENTRY, &entry.name)?;
                Some(Arc::new(JarUnit {
                    name: class_name,
                    jar_name: name.clone(),
                    entry: entry.name,
                    jar: file.clone(),
                }) as Arc<dyn ComparableUnit>)
            })
            .collect();

        Ok(Self { name, file, units })
    }
}

impl LibraryArchive for NestedJar {
    fn name(&self) -> &str {
        &self.name
    }

    fn units(&self) -> &[Arc<dyn ComparableUnit>] {
        &self.units
    }

    fn open_stream(&self) -> Result<Box<dyn Read + Send>, VfsError> {
        Ok(Box::new(self.file.open()?))
    }
}

/// A class file inside a nested jar; each stream re-opens the jar
struct JarUnit {
    name: String,
    jar_name: String,
    entry: String,
    jar: Arc<JarFile>,
}

impl ComparableUnit for JarUnit {
    fn canonical_name(&self) -> &str {
        &self.name
    }

    fn open_stream(&self) -> Result<Box<dyn Read + Send>, VfsError> {
        open_entry_stream(self.jar.open()?, &self.jar_name, &self.entry)
    }
}
