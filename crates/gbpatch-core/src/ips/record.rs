use std::ops::Range;

/// Largest offset representable by the 3-byte offset field
pub const MAX_OFFSET: u32 = 0x00FF_FFFF;

/// Largest payload representable by the 2-byte length field
pub const MAX_PAYLOAD_LEN: usize = 0xFFFF;

/// A single IPS record: `payload` is written at absolute `offset`.
///
/// Records are immutable once built. The parser is the only producer for
/// patches read from disk; [`PatchRecord::new`] exists for patches assembled
/// in code and for tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchRecord {
    offset: u32,
    payload: Vec<u8>,
}

impl PatchRecord {
    /// Create a record, returning `None` if the offset does not fit in 24 bits
    /// or the payload is empty or longer than 65535 bytes.
    pub fn new(offset: u32, payload: Vec<u8>) -> Option<Self> {
        if offset > MAX_OFFSET || payload.is_empty() || payload.len() > MAX_PAYLOAD_LEN {
            return None;
        }
        Some(Self { offset, payload })
    }

    /// Build a record from already-decoded fields.
    ///
    /// The caller guarantees the offset came from a 3-byte field and the
    /// payload length from a non-zero 2-byte field.
    pub(crate) fn from_parts(offset: u32, payload: Vec<u8>) -> Self {
        debug_assert!(offset <= MAX_OFFSET);
        debug_assert!(!payload.is_empty() && payload.len() <= MAX_PAYLOAD_LEN);
        Self { offset, payload }
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// One past the last offset this record writes
    pub fn end(&self) -> u64 {
        self.offset as u64 + self.payload.len() as u64
    }

    /// Half-open range of absolute offsets covered by the payload
    pub fn range(&self) -> Range<u64> {
        self.offset as u64..self.end()
    }

    /// Every absolute offset the payload touches, in ascending order
    pub fn offsets(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.payload.len() as u32).map(move |i| self.offset + i)
    }

    /// Append the on-disk encoding of this record to `out`
    pub(crate) fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.offset.to_be_bytes()[1..]);
        out.extend_from_slice(&(self.payload.len() as u16).to_be_bytes());
        out.extend_from_slice(&self.payload);
    }
}
