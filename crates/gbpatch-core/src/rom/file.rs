use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::RomAccess;
use crate::error::{Error, Result};
use crate::path::check_extension;

/// Required file extension for ROM images
pub const ROM_EXTENSION: &str = "gb";

/// A `.gb` file opened for reading and writing.
///
/// The handle is closed when the value is dropped, so scoping a `RomFile`
/// to a block bounds the file's lifetime on every exit path.
#[derive(Debug)]
pub struct RomFile {
    path: PathBuf,
    file: File,
}

impl RomFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        check_extension(path, ROM_EXTENSION)?;
        if !path.is_file() {
            return Err(Error::NotFound(path.to_path_buf()));
        }

        let file = OpenOptions::new().read(true).write(true).open(path)?;
        debug!("Opened ROM {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current size of the file in bytes
    pub fn len(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Flush buffered writes to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }
}

impl RomAccess for RomFile {
    fn read_bytes(&mut self, offset: u64, size: usize) -> Result<Vec<u8>> {
        self.file.seek(SeekFrom::Start(offset))?;
        let mut buf = Vec::with_capacity(size);
        (&mut self.file).take(size as u64).read_to_end(&mut buf)?;
        Ok(buf)
    }

    fn write_bytes(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(data)?;
        Ok(())
    }
}
