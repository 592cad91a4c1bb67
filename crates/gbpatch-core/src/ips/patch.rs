use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::debug;

use super::record::PatchRecord;
use crate::error::{Error, Result};
use crate::path::check_extension;

/// Magic literal at the start of every IPS file
pub const MAGIC: &[u8; 5] = b"PATCH";

/// Footer written after the last record
pub const FOOTER: &[u8; 3] = b"EOF";

/// Required file extension for patch files
pub const PATCH_EXTENSION: &str = "ips";

const OFFSET_SIZE: usize = 3;
const LENGTH_SIZE: usize = 2;

/// A parsed IPS patch: its records in file order.
///
/// The patch is read-only once parsed. Use [`IpsPatch::open`] for files on
/// disk or [`IpsPatch::from_bytes`] for an in-memory image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpsPatch {
    records: Vec<PatchRecord>,
}

impl IpsPatch {
    /// Build a patch from records assembled in code.
    pub fn from_records(records: Vec<PatchRecord>) -> Self {
        Self { records }
    }

    /// Read and parse an `.ips` file.
    ///
    /// The file handle is released before this returns, whichever way it
    /// returns.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        check_extension(path, PATCH_EXTENSION)?;
        if !path.is_file() {
            return Err(Error::NotFound(path.to_path_buf()));
        }

        let data = fs::read(path)?;
        let patch = Self::from_bytes(&data)?;
        debug!(
            "Parsed {} ({} records, {} bytes of payload)",
            path.display(),
            patch.records.len(),
            patch.payload_len()
        );
        Ok(patch)
    }

    /// Parse an IPS image.
    ///
    /// Decoding ends at the first of:
    /// - a record whose length field is zero
    /// - fewer than 3 bytes left for an offset field, or fewer than 2 for a length
    /// - the read position landing exactly 3 bytes before the end, where the
    ///   `EOF` footer lives
    ///
    /// A short tail is accepted rather than rejected: a truncated final
    /// payload is kept with whatever bytes were present and decoding stops.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let Some(header) = data.get(..MAGIC.len()) else {
            return Err(Error::InvalidFormat(format!(
                "file is {} bytes, too short for the PATCH header",
                data.len()
            )));
        };
        if header != MAGIC {
            return Err(Error::InvalidFormat(format!(
                "expected PATCH header, found {:02X?}",
                header
            )));
        }

        let footer_pos = data.len().saturating_sub(FOOTER.len());
        let mut pos = MAGIC.len();
        let mut records = Vec::new();

        loop {
            if pos == footer_pos {
                break;
            }

            let Some(offset_bytes) = data.get(pos..pos + OFFSET_SIZE) else {
                debug!("Truncated offset field at 0x{:X}, stopping", pos);
                break;
            };
            pos += OFFSET_SIZE;
            let offset = u32::from_be_bytes([0, offset_bytes[0], offset_bytes[1], offset_bytes[2]]);

            let Some(length_bytes) = data.get(pos..pos + LENGTH_SIZE) else {
                debug!("Truncated length field at 0x{:X}, stopping", pos);
                break;
            };
            pos += LENGTH_SIZE;
            let length = u16::from_be_bytes([length_bytes[0], length_bytes[1]]) as usize;
            if length == 0 {
                break;
            }

            let end = (pos + length).min(data.len());
            let payload = data[pos..end].to_vec();
            pos = end;

            if payload.len() < length {
                debug!(
                    "Record at 0x{:06X} declares {} bytes but only {} remain",
                    offset,
                    length,
                    payload.len()
                );
                if !payload.is_empty() {
                    records.push(PatchRecord::from_parts(offset, payload));
                }
                break;
            }

            records.push(PatchRecord::from_parts(offset, payload));
        }

        Ok(Self { records })
    }

    /// Serialize to the IPS format, terminated by the `EOF` footer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            MAGIC.len() + FOOTER.len() + self.records.len() * 5 + self.payload_len(),
        );
        out.extend_from_slice(MAGIC);
        for record in &self.records {
            record.encode_into(&mut out);
        }
        out.extend_from_slice(FOOTER);
        out
    }

    pub fn records(&self) -> &[PatchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total number of payload bytes across all records
    pub fn payload_len(&self) -> usize {
        self.records.iter().map(PatchRecord::len).sum()
    }

    /// Every absolute offset written by any record
    pub fn touched_offsets(&self) -> HashSet<u32> {
        self.records.iter().flat_map(PatchRecord::offsets).collect()
    }

    /// Whether this patch and `other` write to at least one common offset
    pub fn has_conflict(&self, other: &IpsPatch) -> bool {
        super::conflict::has_conflict(self, other)
    }
}

impl<'a> IntoIterator for &'a IpsPatch {
    type Item = &'a PatchRecord;
    type IntoIter = std::slice::Iter<'a, PatchRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn ips_bytes(body: &[u8]) -> Vec<u8> {
        let mut data = MAGIC.to_vec();
        data.extend_from_slice(body);
        data
    }

    fn write_temp(suffix: &str, data: &[u8]) -> NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(data).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_parse_single_record_with_sentinel() {
        let data = ips_bytes(&[0x00, 0x00, 0x10, 0x00, 0x02, b'A', b'B', 0x00, 0x00, 0x00]);
        let patch = IpsPatch::from_bytes(&data).unwrap();

        assert_eq!(patch.len(), 1);
        assert_eq!(patch.records()[0].offset(), 16);
        assert_eq!(patch.records()[0].payload(), b"AB");
    }

    #[test]
    fn test_parse_stops_at_zero_length() {
        let data = ips_bytes(&[
            0x00, 0x00, 0x01, 0x00, 0x01, 0xFF, // record
            0x00, 0x00, 0x02, 0x00, 0x00, // zero length sentinel
            0x00, 0x00, 0x03, 0x00, 0x01, 0xEE, // never reached
            b'E', b'O', b'F',
        ]);
        let patch = IpsPatch::from_bytes(&data).unwrap();

        assert_eq!(patch.len(), 1);
        assert_eq!(patch.records()[0].offset(), 1);
    }

    #[test]
    fn test_parse_header_with_three_trailing_bytes() {
        let data = ips_bytes(&[0x00, 0x00, 0x10]);
        assert_eq!(data.len(), 8);
        let patch = IpsPatch::from_bytes(&data).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn test_parse_header_only() {
        let patch = IpsPatch::from_bytes(MAGIC).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn test_parse_truncated_offset_field() {
        // 2 bytes left after the header (not 3, so the footer check does not fire)
        let data = ips_bytes(&[0x00, 0x00, 0x10, 0x00, 0x01, 0xAA, 0x00, 0x01]);
        let patch = IpsPatch::from_bytes(&data).unwrap();
        assert_eq!(patch.len(), 1);
    }

    #[test]
    fn test_parse_truncated_length_field() {
        let data = ips_bytes(&[0x00, 0x00, 0x10, 0x00]);
        let patch = IpsPatch::from_bytes(&data).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn test_parse_truncated_payload_keeps_partial_bytes() {
        let data = ips_bytes(&[0x00, 0x00, 0x20, 0x00, 0x08, 0x01, 0x02, 0x03, 0x04]);
        let patch = IpsPatch::from_bytes(&data).unwrap();

        assert_eq!(patch.len(), 1);
        assert_eq!(patch.records()[0].offset(), 0x20);
        assert_eq!(patch.records()[0].payload(), &[0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn test_parse_offset_that_spells_eof() {
        // A record at 0x454F46 must not be mistaken for the footer
        let data = ips_bytes(&[b'E', b'O', b'F', 0x00, 0x01, 0x99, b'E', b'O', b'F']);
        let patch = IpsPatch::from_bytes(&data).unwrap();

        assert_eq!(patch.len(), 1);
        assert_eq!(patch.records()[0].offset(), 0x454F46);
        assert_eq!(patch.records()[0].payload(), &[0x99]);
    }

    #[test]
    fn test_parse_invalid_header() {
        let err = IpsPatch::from_bytes(b"PATCX\x00\x00\x00EOF").unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));

        let err = IpsPatch::from_bytes(b"PAT").unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn test_parse_preserves_file_order() {
        let data = ips_bytes(&[
            0x00, 0x01, 0x00, 0x00, 0x01, 0x0A, //
            0x00, 0x00, 0x10, 0x00, 0x01, 0x0B, //
            0x00, 0x01, 0x00, 0x00, 0x01, 0x0C, //
            b'E', b'O', b'F',
        ]);
        let patch = IpsPatch::from_bytes(&data).unwrap();

        let offsets: Vec<u32> = patch.records().iter().map(PatchRecord::offset).collect();
        assert_eq!(offsets, vec![0x100, 0x10, 0x100]);
        assert_eq!(patch.records()[2].payload(), &[0x0C]);
    }

    #[test]
    fn test_to_bytes_round_trip() {
        let patch = IpsPatch::from_records(vec![
            PatchRecord::new(0x10, b"AB".to_vec()).unwrap(),
            PatchRecord::new(0x18C, vec![0x07]).unwrap(),
        ]);
        let bytes = patch.to_bytes();

        assert!(bytes.starts_with(MAGIC));
        assert!(bytes.ends_with(FOOTER));
        assert_eq!(IpsPatch::from_bytes(&bytes).unwrap(), patch);
    }

    #[test]
    fn test_touched_offsets() {
        let patch = IpsPatch::from_records(vec![
            PatchRecord::new(16, vec![0, 0]).unwrap(),
            PatchRecord::new(17, vec![0, 0, 0]).unwrap(),
        ]);
        let mut offsets: Vec<u32> = patch.touched_offsets().into_iter().collect();
        offsets.sort_unstable();
        assert_eq!(offsets, vec![16, 17, 18, 19]);
        assert_eq!(patch.payload_len(), 5);
    }

    #[test]
    fn test_open_from_file() {
        let data = ips_bytes(&[0x00, 0x01, 0x8C, 0x00, 0x01, 0x07, b'E', b'O', b'F']);
        let file = write_temp(".ips", &data);

        let patch = IpsPatch::open(file.path()).unwrap();
        assert_eq!(patch.len(), 1);
        assert_eq!(patch.records()[0].offset(), 0x18C);
    }

    #[test]
    fn test_open_wrong_extension() {
        let file = write_temp(".bin", &ips_bytes(b"EOF"));
        let err = IpsPatch::open(file.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidExtension { expected: "ips", .. }));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = IpsPatch::open(dir.path().join("missing.ips")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_open_invalid_header() {
        let file = write_temp(".ips", b"NOTAPATCH");
        let err = IpsPatch::open(file.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }
}
