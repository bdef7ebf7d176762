//! # Pixel Payload Decoding
//!
//! Turns the bytes after `{END}` into image and background arrays.
//!
//! ```text
//! payload (raw or gzip-inflated):
//! ┌──────────────────────────────┬─────────────────────────────┐
//! │ image: product(image_shape)  │ background (if present)     │
//! │ samples, channel fastest     │ product(background_shape)   │
//! └──────────────────────────────┴─────────────────────────────┘
//! ```
//!
//! Arrays come back in storage order (frequency, time, phase, z, y, x,
//! channel). Uncompressed files are read range by range; compressed files are
//! inflated as a whole, which yields the background as a by-product.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use log::{debug, trace};

use crate::fli::codec::{compression, unpack};
use crate::fli::types::array::DecodedArray;
use crate::fli::types::datatypes::PixelType;
use crate::fli::types::error::{FliError, Result};
use crate::fli::types::models::{ImageShape, LayoutDescriptor};

/// Image and (when present and decoded) background of one payload.
#[derive(Debug, Clone)]
pub struct DecodedPayload {
    pub image: DecodedArray,
    pub background: Option<DecodedArray>,
}

/// Decodes one region into a storage-order array.
pub fn decode_region(bytes: &[u8], pixel_type: &PixelType, shape: &ImageShape) -> Result<DecodedArray> {
    unpack::decode_samples(bytes, pixel_type, &shape.storage_dims())
}

/// Splits an in-memory payload into image and background and decodes both.
///
/// The background is only decoded when `with_background` is set and the
/// layout declares one.
pub fn split_payload(payload: &[u8], layout: &LayoutDescriptor, with_background: bool) -> Result<DecodedPayload> {
    let image = decode_region(payload, &layout.pixel_type, &layout.image_shape)?;

    let background = match &layout.background {
        Some(bg) if with_background => {
            let offset = layout.image_byte_len()?;
            let region = payload.get(offset as usize..).ok_or(FliError::SizeMismatch {
                context: "background payload",
                expected: offset.saturating_add(layout.background_byte_len()?),
                found: payload.len() as u64,
            })?;
            Some(decode_region(region, &bg.pixel_type, &bg.shape)?)
        }
        _ => None,
    };

    Ok(DecodedPayload { image, background })
}

/// Subtracts `background` from `image`, flooring negative results at zero.
pub fn subtract(image: DecodedArray, background: Option<&DecodedArray>) -> Result<DecodedArray> {
    match background {
        Some(bg) => image.subtract_background(bg),
        None => Ok(image),
    }
}

/// Decodes a complete in-memory file.
///
/// `file_bytes` holds the whole file, header included; the payload starts at
/// `data_start`. The result is in storage order and unsqueezed. Background
/// subtraction is a no-op for layouts without a background.
pub fn decode(
    layout: &LayoutDescriptor,
    file_bytes: &[u8],
    data_start: u64,
    subtract_background: bool,
) -> Result<DecodedArray> {
    let raw = file_bytes.get(data_start as usize..).ok_or(FliError::SizeMismatch {
        context: "file header",
        expected: data_start,
        found: file_bytes.len() as u64,
    })?;

    let payload: Cow<[u8]> = if layout.compressed {
        let hint = layout.image_byte_len()?.saturating_add(layout.background_byte_len()?);
        Cow::Owned(compression::inflate_gzip(raw, hint)?)
    } else {
        Cow::Borrowed(raw)
    };

    let want_background = subtract_background && layout.background_present();
    let decoded = split_payload(&payload, layout, want_background)?;
    subtract(decoded.image, decoded.background.as_ref())
}

/// Reads exactly `len` bytes at `offset`.
///
/// The file length is checked before any buffer is allocated.
///
/// # Errors
/// `SizeMismatch` if the file ends early.
pub fn read_region(path: &Path, offset: u64, len: u64, context: &'static str) -> Result<Vec<u8>> {
    trace!("Reading {} bytes at offset {} for {}", len, offset, context);
    let mut file = File::open(path)?;
    let available = file.metadata()?.len().saturating_sub(offset);
    if available < len {
        return Err(FliError::SizeMismatch {
            context,
            expected: len,
            found: available,
        });
    }
    file.seek(SeekFrom::Start(offset))?;

    let mut buf = Vec::with_capacity(len as usize);
    file.take(len).read_to_end(&mut buf)?;
    if (buf.len() as u64) < len {
        return Err(FliError::SizeMismatch {
            context,
            expected: len,
            found: buf.len() as u64,
        });
    }
    Ok(buf)
}

/// Inflates everything from `data_start` to the end of the file.
pub fn inflate_file(path: &Path, data_start: u64, size_hint: u64) -> Result<Vec<u8>> {
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(data_start))?;
    compression::inflate_gzip(BufReader::new(file), size_hint)
}

/// Decodes the image of a file on disk, plus the background when it comes for free.
///
/// For compressed files the whole payload is inflated and the background (if
/// declared) is returned alongside the image. Uncompressed files only read the
/// image region and return no background.
pub fn read_image(path: &Path, layout: &LayoutDescriptor, data_start: u64) -> Result<DecodedPayload> {
    if layout.compressed {
        let hint = layout.image_byte_len()?.saturating_add(layout.background_byte_len()?);
        let payload = inflate_file(path, data_start, hint)?;
        debug!("Inflated payload: {} bytes", payload.len());
        return split_payload(&payload, layout, true);
    }

    let bytes = read_region(path, data_start, layout.image_byte_len()?, "image payload")?;
    Ok(DecodedPayload {
        image: decode_region(&bytes, &layout.pixel_type, &layout.image_shape)?,
        background: None,
    })
}

/// Reads the background of an uncompressed file straight from its offset.
///
/// The background starts right after the image region:
/// `data_start + ceil(disk_bits * product(image_shape) / 8)`.
/// Returns `None` if the layout declares no background.
pub fn read_background(path: &Path, layout: &LayoutDescriptor, data_start: u64) -> Result<Option<DecodedArray>> {
    let Some(bg) = &layout.background else {
        return Ok(None);
    };
    let offset = data_start.saturating_add(layout.image_byte_len()?);
    let bytes = read_region(path, offset, layout.background_byte_len()?, "background payload")?;
    Ok(Some(decode_region(&bytes, &bg.pixel_type, &bg.shape)?))
}
