//! Random access into large binary resources
//!
//! A provider hands out inclusive byte ranges of a resource without ever
//! materializing the whole thing. Small ranges come back as memory buffers;
//! ranges above the staging threshold are copied into a temporary file in
//! the provider's working area and removed when the returned range drops.

use crate::config::ReaderConfig;
use crate::error::{MxfError, Result};
use parking_lot::Mutex;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::{NamedTempFile, TempDir};

/// Random access to a resource's bytes
pub trait ResourceByteRangeProvider: Send + Sync {
    /// Total size of the resource in bytes
    fn resource_size(&self) -> u64;

    /// Materialize the inclusive range `[start, end_inclusive]`
    fn byte_range(&self, start: u64, end_inclusive: u64) -> Result<ByteRange>;

    /// Materialize the inclusive range as an owned buffer
    fn byte_range_as_bytes(&self, start: u64, end_inclusive: u64) -> Result<Vec<u8>> {
        self.byte_range(start, end_inclusive)?.into_bytes()
    }
}

impl<P: ResourceByteRangeProvider + ?Sized> ResourceByteRangeProvider for Arc<P> {
    fn resource_size(&self) -> u64 {
        (**self).resource_size()
    }

    fn byte_range(&self, start: u64, end_inclusive: u64) -> Result<ByteRange> {
        (**self).byte_range(start, end_inclusive)
    }
}

/// Validate `0 <= start <= end < size`
pub fn check_range(start: u64, end_inclusive: u64, size: u64) -> Result<()> {
    if start > end_inclusive || end_inclusive >= size {
        return Err(MxfError::OutOfRange {
            start,
            end: end_inclusive,
            size,
        });
    }
    Ok(())
}

/// A materialized byte range
#[derive(Debug)]
pub enum ByteRange {
    /// Bytes held in memory
    Memory(Vec<u8>),
    /// Bytes staged to a temporary file; the file is deleted on drop
    Staged(StagedRange),
}

impl ByteRange {
    /// Number of bytes in the range
    pub fn len(&self) -> u64 {
        match self {
            ByteRange::Memory(data) => data.len() as u64,
            ByteRange::Staged(staged) => staged.len,
        }
    }

    /// True if the range holds no bytes
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Path of the staging file, if this range was staged
    pub fn staged_path(&self) -> Option<&Path> {
        match self {
            ByteRange::Memory(_) => None,
            ByteRange::Staged(staged) => Some(staged.file.path()),
        }
    }

    /// Read the whole range into memory
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            ByteRange::Memory(data) => Ok(data),
            ByteRange::Staged(mut staged) => {
                let mut data = Vec::with_capacity(staged.len as usize);
                let file = staged.file.as_file_mut();
                file.seek(SeekFrom::Start(0))?;
                file.read_to_end(&mut data)?;
                Ok(data)
            }
        }
    }

    /// Stream the range's bytes
    pub fn reader(&self) -> Result<Box<dyn Read + '_>> {
        match self {
            ByteRange::Memory(data) => Ok(Box::new(io::Cursor::new(data.as_slice()))),
            ByteRange::Staged(staged) => {
                let mut file = staged.file.reopen()?;
                file.seek(SeekFrom::Start(0))?;
                Ok(Box::new(file))
            }
        }
    }
}

/// A range copied into the working area
#[derive(Debug)]
pub struct StagedRange {
    file: NamedTempFile,
    len: u64,
}

/// Provider over an in-memory buffer
#[derive(Debug, Clone)]
pub struct MemoryByteRangeProvider {
    data: Arc<[u8]>,
}

impl MemoryByteRangeProvider {
    /// Wrap a buffer
    pub fn new(data: impl Into<Arc<[u8]>>) -> Self {
        MemoryByteRangeProvider { data: data.into() }
    }
}

impl ResourceByteRangeProvider for MemoryByteRangeProvider {
    fn resource_size(&self) -> u64 {
        self.data.len() as u64
    }

    fn byte_range(&self, start: u64, end_inclusive: u64) -> Result<ByteRange> {
        check_range(start, end_inclusive, self.resource_size())?;
        Ok(ByteRange::Memory(
            self.data[start as usize..=end_inclusive as usize].to_vec(),
        ))
    }
}

/// Scratch directory for staged ranges
#[derive(Debug)]
enum WorkingArea {
    /// Caller-supplied directory, left in place
    Directory(PathBuf),
    /// Private temporary directory, removed on drop
    Temporary(TempDir),
}

impl WorkingArea {
    fn path(&self) -> &Path {
        match self {
            WorkingArea::Directory(path) => path,
            WorkingArea::Temporary(dir) => dir.path(),
        }
    }
}

/// Provider over a file on disk
#[derive(Debug)]
pub struct FileByteRangeProvider {
    file: Mutex<File>,
    path: PathBuf,
    size: u64,
    staging_threshold: u64,
    working_area: WorkingArea,
}

impl FileByteRangeProvider {
    /// Open a file with default configuration
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_config(path, &ReaderConfig::default())
    }

    /// Open a file, taking the working area and staging threshold from `config`
    pub fn with_config(path: impl AsRef<Path>, config: &ReaderConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let size = file.metadata()?.len();

        let working_area = match &config.working_directory {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                WorkingArea::Directory(dir.clone())
            }
            None => WorkingArea::Temporary(TempDir::new()?),
        };

        tracing::debug!(path = %path.display(), size, "Opened resource");

        Ok(FileByteRangeProvider {
            file: Mutex::new(file),
            path,
            size,
            staging_threshold: config.staging_threshold,
            working_area,
        })
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory where staged ranges are written
    pub fn working_directory(&self) -> &Path {
        self.working_area.path()
    }

    fn stage(&self, file: &mut File, len: u64) -> Result<StagedRange> {
        let mut staged = NamedTempFile::new_in(self.working_area.path())?;
        let copied = io::copy(&mut file.take(len), staged.as_file_mut())?;
        if copied != len {
            return Err(MxfError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("staged {} of {} bytes", copied, len),
            )));
        }
        staged.as_file_mut().flush()?;
        tracing::debug!(len, path = %staged.path().display(), "Staged byte range");
        Ok(StagedRange { file: staged, len })
    }
}

impl ResourceByteRangeProvider for FileByteRangeProvider {
    fn resource_size(&self) -> u64 {
        self.size
    }

    fn byte_range(&self, start: u64, end_inclusive: u64) -> Result<ByteRange> {
        check_range(start, end_inclusive, self.size)?;
        let len = end_inclusive - start + 1;

        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(start))?;

        if len > self.staging_threshold {
            return Ok(ByteRange::Staged(self.stage(&mut file, len)?));
        }

        let mut data = vec![0u8; len as usize];
        file.read_exact(&mut data)?;
        Ok(ByteRange::Memory(data))
    }
}
