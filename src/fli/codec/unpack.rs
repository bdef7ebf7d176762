//! Sample decoding: raw payload bytes to typed, shaped arrays.
//!
//! Samples are little-endian. 12-bit formats pack two samples into three
//! bytes; every other format stores one sample per storage unit.

use byteorder::{ByteOrder, LittleEndian};
use log::trace;

use crate::fli::types::array::{DecodedArray, Sample};
use crate::fli::types::datatypes::{Packing, PixelType, SampleFormat};
use crate::fli::types::error::{FliError, Result};

/// Unpacks `count` 12-bit samples from byte triples.
///
/// For LSB packing, with `b0 b1 b2` one triple:
/// - `s0 = b0 | (b1 & 0x0F) << 8`
/// - `s1 = b2 << 4 | b1 >> 4`
///
/// For MSB packing:
/// - `s0 = b0 << 4 | b1 >> 4`
/// - `s1 = (b1 & 0x0F) << 8 | b2`
///
/// An odd trailing sample is read from the first two bytes of a final,
/// incomplete triple.
///
/// # Errors
/// - `InvalidPacking` if `packing` is neither LSB nor MSB
/// - `SizeMismatch` if `bytes` is too short for `count` samples
pub fn unpack_12bit(bytes: &[u8], count: usize, packing: Packing) -> Result<Vec<u16>> {
    if packing == Packing::None {
        return Err(FliError::InvalidPacking(packing.to_string()));
    }
    let needed = count.saturating_mul(12).div_ceil(8);
    if bytes.len() < needed {
        return Err(FliError::SizeMismatch {
            context: "12-bit packed samples",
            expected: needed as u64,
            found: bytes.len() as u64,
        });
    }

    let mut out = Vec::with_capacity(count);
    for chunk in bytes[..needed].chunks(3) {
        let b0 = chunk[0] as u16;
        let b1 = chunk[1] as u16;
        let (s0, s1) = match packing {
            Packing::Lsb => (
                b0 | (b1 & 0x0F) << 8,
                chunk.get(2).map(|&b2| (b2 as u16) << 4 | b1 >> 4),
            ),
            _ => (
                b0 << 4 | b1 >> 4,
                chunk.get(2).map(|&b2| (b1 & 0x0F) << 8 | b2 as u16),
            ),
        };
        out.push(s0);
        if let Some(s1) = s1
            && out.len() < count
        {
            out.push(s1);
        }
    }
    Ok(out)
}

fn read_le<T: Sample>(bytes: &[u8], count: usize, read_into: fn(&[u8], &mut [T])) -> Vec<T> {
    let mut out = vec![T::default(); count];
    read_into(&bytes[..count * std::mem::size_of::<T>()], &mut out);
    out
}

/// Decodes samples from the start of `bytes` into an array of shape `dims`
/// (row-major, last axis fastest).
///
/// Only the bytes covering `product(dims)` samples are consumed; anything
/// after them is ignored.
///
/// # Errors
/// `SizeMismatch` if `bytes` holds fewer samples than `dims` requires.
pub fn decode_samples(bytes: &[u8], pixel_type: &PixelType, dims: &[usize]) -> Result<DecodedArray> {
    let count = dims
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .unwrap_or(usize::MAX);
    let needed = pixel_type.byte_len(count as u64).unwrap_or(u64::MAX);
    if (bytes.len() as u64) < needed {
        return Err(FliError::SizeMismatch {
            context: "pixel payload",
            expected: needed,
            found: bytes.len() as u64,
        });
    }
    trace!("Decoding {} samples ({} bytes) as {}", count, needed, pixel_type);

    if pixel_type.is_packed_12bit() {
        let samples = unpack_12bit(bytes, count, pixel_type.packing)?;
        return DecodedArray::from_samples(samples, dims);
    }

    match pixel_type.format {
        SampleFormat::U8 => DecodedArray::from_samples(bytes[..count].to_vec(), dims),
        SampleFormat::I8 => {
            DecodedArray::from_samples(bytes[..count].iter().map(|&b| b as i8).collect(), dims)
        }
        SampleFormat::U16 => DecodedArray::from_samples(read_le(bytes, count, LittleEndian::read_u16_into), dims),
        SampleFormat::I16 => DecodedArray::from_samples(read_le(bytes, count, LittleEndian::read_i16_into), dims),
        SampleFormat::U32 => DecodedArray::from_samples(read_le(bytes, count, LittleEndian::read_u32_into), dims),
        SampleFormat::I32 => DecodedArray::from_samples(read_le(bytes, count, LittleEndian::read_i32_into), dims),
        SampleFormat::F32 => DecodedArray::from_samples(read_le(bytes, count, LittleEndian::read_f32_into), dims),
        SampleFormat::F64 => DecodedArray::from_samples(read_le(bytes, count, LittleEndian::read_f64_into), dims),
    }
}
