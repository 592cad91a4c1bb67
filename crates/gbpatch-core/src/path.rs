use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Reject paths whose extension is not `expected`. Matching is exact, so
/// `PATCH.IPS` does not pass for `ips`.
pub(crate) fn check_extension(path: &Path, expected: &'static str) -> Result<()> {
    if has_extension(path, expected) {
        Ok(())
    } else {
        Err(Error::InvalidExtension {
            path: PathBuf::from(path),
            expected,
        })
    }
}

pub(crate) fn has_extension(path: &Path, expected: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(expected)
}
