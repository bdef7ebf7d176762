//! Decompression of `.fli` payloads.
//!
//! Compressed files store everything after `{END}` as a single gzip member:
//! the image samples followed directly by the background samples.

use std::io::Read;

use flate2::read::GzDecoder;
use log::trace;

use crate::fli::types::error::{FliError, Result};

/// Upper bound on the buffer reserved ahead of inflation.
pub const MAX_PREALLOCATION: u64 = 64 * 1024 * 1024;

/// Inflates a gzip stream completely.
///
/// `size_hint` pre-sizes the output buffer, capped at [`MAX_PREALLOCATION`];
/// it does not limit or validate the inflated length.
///
/// # Errors
/// `DecompressionFailure` for a missing gzip header or a corrupt deflate stream.
pub fn inflate_gzip<R: Read>(reader: R, size_hint: u64) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(size_hint.min(MAX_PREALLOCATION) as usize);
    let mut decoder = GzDecoder::new(reader);
    decoder
        .read_to_end(&mut output)
        .map_err(|e| FliError::DecompressionFailure(format!("gzip inflate failed: {}", e)))?;
    trace!("Inflated gzip payload to {} bytes (expected at least {})", output.len(), size_hint);
    Ok(output)
}
