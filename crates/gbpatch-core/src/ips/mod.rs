//! IPS patch container.
//!
//! This module handles the IPS binary format:
//!
//! - **Records**: `(offset, payload)` pairs, the unit of change
//! - **Parser**: header validation and record decoding with tolerant tails
//! - **Conflicts**: overlap detection across patches
//!
//! ## Format
//!
//! ```text
//! offset  size  meaning
//! 0       5     "PATCH"
//! 5       3     record offset (big-endian)
//! 8       2     record length (big-endian), 0 ends the patch
//! 10      N     record payload
//! ...           more records, then the optional "EOF" footer
//! ```

mod conflict;
mod patch;
mod record;

pub use conflict::{ConflictCheck, find_first_conflict, first_conflicting_pair, has_conflict};
pub use patch::{FOOTER, IpsPatch, MAGIC, PATCH_EXTENSION};
pub use record::{MAX_OFFSET, MAX_PAYLOAD_LEN, PatchRecord};
