//! Custom error types for the fli-reader crate.

use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum FliError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    /// The path does not carry the `.fli` extension.
    #[error("Invalid file extension: {0} (expected .fli)")]
    InvalidFileExtension(PathBuf),

    /// The stream ended before the `{{END}}` chapter marker was found.
    #[error("Header truncated: no {{END}} marker found after {bytes_read} bytes")]
    HeaderTruncated { bytes_read: u64 },

    /// The header declares no version, or one this crate cannot interpret.
    #[error("Unknown schema version: '{0}'. Only 1.x and 2.x are supported.")]
    UnknownSchemaVersion(String),

    /// A key (or section) required by the detected schema is absent.
    #[error("Missing header field: {path}")]
    MissingHeaderField { path: String },

    /// A header value exists but cannot be used (not a number, zero dimension, ...).
    #[error("Invalid header value for {path}: '{value}' ({reason})")]
    InvalidHeaderValue {
        path: String,
        value: String,
        reason: &'static str,
    },

    /// The datatype or pixel format name is not in the pixel type table.
    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    /// Sub-byte samples with a packing other than LSB or MSB.
    #[error("Invalid packing: '{0}'. Expected 'lsb' or 'msb'.")]
    InvalidPacking(String),

    /// A frame index exceeds the size of its dimension.
    #[error("Index out of range for {dimension}: {index} >= {size}")]
    IndexOutOfRange {
        dimension: &'static str,
        index: usize,
        size: usize,
    },

    /// The gzip payload could not be inflated.
    #[error("Decompression failed: {0}")]
    DecompressionFailure(String),

    /// The payload holds fewer bytes than the header layout requires.
    #[error("Size mismatch for {context}: expected {expected} bytes, but found {found} bytes")]
    SizeMismatch {
        context: &'static str,
        expected: u64,
        found: u64,
    },

    /// The background cannot be broadcast onto the image.
    #[error("Background shape {background:?} cannot be broadcast to image shape {image:?}")]
    ShapeMismatch {
        image: Vec<usize>,
        background: Vec<usize>,
    },
}

/// A convenience `Result` type alias using the crate's `FliError` type.
pub type Result<T> = std::result::Result<T, FliError>;
