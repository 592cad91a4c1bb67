//! Random-access byte stores for the image being patched.
//!
//! [`RomAccess`] is the only interface patch application and the tile codec
//! need. Two implementations are provided:
//!
//! - [`RomFile`]: an open `.gb` file, released when dropped
//! - [`RomBuffer`]: an in-memory image

mod buffer;
mod file;

pub use buffer::RomBuffer;
pub use file::{ROM_EXTENSION, RomFile};

use crate::error::Result;

/// Read/write access at absolute offsets.
pub trait RomAccess {
    /// Read up to `size` bytes at `offset`. Returns fewer bytes if the store
    /// ends first.
    fn read_bytes(&mut self, offset: u64, size: usize) -> Result<Vec<u8>>;

    /// Write `data` at `offset`. Writing past the end grows the store; any
    /// gap is zero-filled.
    fn write_bytes(&mut self, offset: u64, data: &[u8]) -> Result<()>;
}

impl<T: RomAccess + ?Sized> RomAccess for &mut T {
    fn read_bytes(&mut self, offset: u64, size: usize) -> Result<Vec<u8>> {
        (**self).read_bytes(offset, size)
    }

    fn write_bytes(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        (**self).write_bytes(offset, data)
    }
}
