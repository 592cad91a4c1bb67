use super::RomAccess;
use crate::error::Result;

/// In-memory image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RomBuffer {
    data: Vec<u8>,
}

impl RomBuffer {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// A zero-filled image of `size` bytes
    pub fn zeroed(size: usize) -> Self {
        Self {
            data: vec![0; size],
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<Vec<u8>> for RomBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl RomAccess for RomBuffer {
    fn read_bytes(&mut self, offset: u64, size: usize) -> Result<Vec<u8>> {
        let start = (offset as usize).min(self.data.len());
        let end = start.saturating_add(size).min(self.data.len());
        Ok(self.data[start..end].to_vec())
    }

    fn write_bytes(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        let start = offset as usize;
        let end = start + data.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[start..end].copy_from_slice(data);
        Ok(())
    }
}
