//! Crate-wide error taxonomy.
//!
//! Every codec in this crate (byte, WAD, ZIP, map record) reports failure
//! through this single enum rather than `std::io::Error` directly, so a
//! caller at the host boundary (`crate::host`) only ever has one type to
//! match on.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, WadkitError>;

#[derive(Error, Debug)]
pub enum WadkitError {
    #[error("I/O error during {op} (expected {expected_bytes} bytes): {source}")]
    IoError {
        expected_bytes: usize,
        op: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid magic: found {found:?}, wanted one of {wanted:?}")]
    InvalidMagic {
        found: Vec<u8>,
        wanted: &'static [&'static str],
    },

    #[error("{field} out of range: {value} (bound {bound})")]
    OutOfRange {
        field: &'static str,
        value: i64,
        bound: i64,
    },

    #[error("unsupported compression method {method}")]
    UnsupportedCompression { method: u16 },

    #[error("unsupported multi-disk archive")]
    UnsupportedMultiDisk,

    #[error("CRC mismatch: expected {expected:#010x}, got {actual:#010x}")]
    CrcMismatch { expected: u32, actual: u32 },

    #[error("not a ZIP archive (no end-of-central-directory record found)")]
    NotZip,

    #[error("buffer too small to be a ZIP archive ({0} bytes)")]
    TooSmall(u64),

    #[error("{field} too many entries for encoded width ({count})")]
    TooMany { field: &'static str, count: usize },

    #[error("dangling reference in {record}.{field}")]
    DanglingRef {
        record: &'static str,
        field: &'static str,
    },

    #[error("id counter exhausted")]
    IdOverflow,

    #[error("name too long: {0} bytes (max 8)")]
    NameTooLong(usize),
}

impl WadkitError {
    pub fn io(op: &'static str, expected_bytes: usize, source: std::io::Error) -> Self {
        WadkitError::IoError {
            expected_bytes,
            op,
            source,
        }
    }
}
