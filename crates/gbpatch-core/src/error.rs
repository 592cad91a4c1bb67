use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("File must have a .{expected} extension: {}", path.display())]
    InvalidExtension { path: PathBuf, expected: &'static str },

    #[error("Invalid IPS file format: {0}")]
    InvalidFormat(String),

    #[error("Patch not found: {0}")]
    UnknownPatch(String),

    #[error("Image is {actual_width}x{actual_height} pixels, expected {expected_width}x{expected_height}")]
    TileSize {
        expected_width: usize,
        expected_height: usize,
        actual_width: usize,
        actual_height: usize,
    },

    #[error("Invalid tile layout: {0}")]
    InvalidLayout(String),

    #[error("Invalid color index {value} at ({x}, {y})")]
    InvalidPixel { x: usize, y: usize, value: u8 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound(_) => true,
            Error::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_not_found() {
        let err = Error::NotFound(PathBuf::from("missing.ips"));
        assert!(err.is_not_found());

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        assert!(Error::Io(io_err).is_not_found());

        let other_io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(!Error::Io(other_io_err).is_not_found());

        assert!(!Error::InvalidFormat("bad header".to_string()).is_not_found());
    }

    #[test]
    fn test_error_messages() {
        let err = Error::InvalidExtension {
            path: PathBuf::from("patch.bin"),
            expected: "ips",
        };
        assert_eq!(err.to_string(), "File must have a .ips extension: patch.bin");

        let err = Error::TileSize {
            expected_width: 8,
            expected_height: 8,
            actual_width: 16,
            actual_height: 8,
        };
        assert_eq!(err.to_string(), "Image is 16x8 pixels, expected 8x8");
    }
}
