use classclash_common::{FileEntry, Vfs, VfsError};
use flate2::read::DeflateDecoder;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::path::PathBuf;
use zip::{CompressionMethod, ZipArchive};

/// ZIP archive VFS implementation (read-only), used for packed `.war` files
pub struct ZipVfs {
    instance_id: String,
    archive_path: PathBuf,
}

impl ZipVfs {
    pub fn new(archive_path: PathBuf) -> Result<Self, VfsError> {
        if !archive_path.exists() {
            return Err(VfsError::NotFound(archive_path.display().to_string()));
        }

        let instance_id = format!("zip:{}", archive_path.display());
        let vfs = Self {
            instance_id,
            archive_path,
        };
        // fail early on anything that is not a readable ZIP
        let file = File::open(&vfs.archive_path)?;
        open_zip(file, &vfs.label())?;
        Ok(vfs)
    }

    fn label(&self) -> String {
        self.archive_path.display().to_string()
    }
}

/// Opens any seekable reader as a ZIP archive
pub(crate) fn open_zip<R: Read + Seek>(reader: R, label: &str) -> Result<ZipArchive<R>, VfsError> {
    ZipArchive::new(reader).map_err(|e| VfsError::InvalidArchive(label.to_string(), e.to_string()))
}

/// Lists the regular-file entries of a ZIP archive, in archive order
pub(crate) fn list_zip_files<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    label: &str,
) -> Result<Vec<FileEntry>, VfsError> {
    let mut entries = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let file = archive
            .by_index(i)
            .map_err(|e| VfsError::InvalidArchive(label.to_string(), e.to_string()))?;

        if file.is_dir() {
            continue;
        }

        entries.push(FileEntry {
            name: file.name().to_string(),
            size: file.size(),
        });
    }

    Ok(entries)
}

/// Where an entry's compressed bytes sit inside the archive file
struct EntrySpan {
    data_start: u64,
    compressed_size: u64,
    method: CompressionMethod,
}

fn locate_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    label: &str,
    name: &str,
) -> Result<EntrySpan, VfsError> {
    let file = archive.by_name(name).map_err(|e| match e {
        zip::result::ZipError::FileNotFound => VfsError::NotFound(name.to_string()),
        other => VfsError::InvalidArchive(label.to_string(), other.to_string()),
    })?;

    if file.is_dir() {
        return Err(VfsError::NotAFile(name.to_string()));
    }

    Ok(EntrySpan {
        data_start: file.data_start(),
        compressed_size: file.compressed_size(),
        method: file.compression(),
    })
}

/// Streams one entry out of a seekable ZIP source without buffering it.
///
/// Only the central directory is parsed; the entry itself is decoded lazily
/// from `source`, which the returned reader owns. Sizes declared by the
/// archive are never used to allocate.
pub(crate) fn open_entry_stream<R>(
    mut source: R,
    label: &str,
    name: &str,
) -> Result<Box<dyn Read + Send>, VfsError>
where
    R: Read + Seek + Send + 'static,
{
    let span = {
        let mut archive = open_zip(&mut source, label)?;
        locate_entry(&mut archive, label, name)?
    };

    source.seek(SeekFrom::Start(span.data_start))?;
    let data = source.take(span.compressed_size);

    match span.method {
        CompressionMethod::Stored => Ok(Box::new(data)),
        CompressionMethod::Deflated => Ok(Box::new(DeflateDecoder::new(data))),
        other => Err(VfsError::InvalidArchive(
            label.to_string(),
            format!("unsupported compression {:?} for {}", other, name),
        )),
    }
}

impl Vfs for ZipVfs {
    fn instance_id(&self) -> &str {
        &self.instance_id
    }

    fn list_files(&self) -> Result<Vec<FileEntry>, VfsError> {
        let file = File::open(&self.archive_path)?;
        let mut archive = open_zip(file, &self.label())?;
        list_zip_files(&mut archive, &self.label())
    }

    fn open_file(&self, path: &Path) -> Result<Box<dyn Read + Send>, VfsError> {
        let name = path.to_string_lossy().replace('\\', "/");
        let file = File::open(&self.archive_path)?;
        open_entry_stream(file, &self.label(), &name)
    }
}
