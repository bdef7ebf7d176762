//! Pixel type table for `.fli` payloads.
//!
//! A header names its pixel layout either with a generic `datatype`
//! (`UINT16`, `REAL32`, ...) or with a camera `pixelFormat` (`Mono12p`,
//! `BayerRG8`, ...). Both resolve to a [`PixelType`]: the storage format of the
//! decoded samples, the number of significant bits per sample and, for
//! formats that share bytes between samples, the bit packing.

use std::fmt;

use super::error::{FliError, Result};

/// Element type of decoded samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    U8,
    U16,
    U32,
    I8,
    I16,
    I32,
    F32,
    F64,
}

impl SampleFormat {
    /// Width of one stored sample in bits.
    pub fn storage_bits(&self) -> u32 {
        match self {
            SampleFormat::U8 | SampleFormat::I8 => 8,
            SampleFormat::U16 | SampleFormat::I16 => 16,
            SampleFormat::U32 | SampleFormat::I32 | SampleFormat::F32 => 32,
            SampleFormat::F64 => 64,
        }
    }
}

/// Bit alignment of samples that share bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Packing {
    /// One sample per storage unit.
    #[default]
    None,
    /// Least-significant bits first.
    Lsb,
    /// Most-significant bits first.
    Msb,
}

impl TryFrom<&str> for Packing {
    type Error = FliError;
    fn try_from(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lsb" => Ok(Self::Lsb),
            "msb" => Ok(Self::Msb),
            _ => Err(FliError::InvalidPacking(value.to_string())),
        }
    }
}

impl fmt::Display for Packing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Packing::None => write!(f, "none"),
            Packing::Lsb => write!(f, "lsb"),
            Packing::Msb => write!(f, "msb"),
        }
    }
}

/// Fully resolved pixel type of an image or background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelType {
    /// Table name the type was resolved from (`UINT16`, `Mono12p`, ...).
    pub name: String,
    pub format: SampleFormat,
    /// Significant bits per sample: 8, 10, 12, 14, 16, 32 or 64.
    pub bits: u32,
    pub packing: Packing,
}

impl PixelType {
    /// Whether two samples share three bytes on disk.
    pub fn is_packed_12bit(&self) -> bool {
        self.bits == 12
    }

    /// Bits one sample occupies on disk.
    ///
    /// Packed 12-bit formats take 12 bits; every other format takes one full
    /// storage unit, regardless of how many of its bits are significant.
    pub fn disk_bits(&self) -> u64 {
        if self.is_packed_12bit() {
            12
        } else {
            self.format.storage_bits() as u64
        }
    }

    /// Number of bytes `count` samples occupy on disk, rounded up to a whole byte.
    ///
    /// Returns `None` on overflow.
    pub fn byte_len(&self, count: u64) -> Option<u64> {
        self.disk_bits().checked_mul(count).map(|bits| bits.div_ceil(8))
    }

    /// Returns a copy with the packing replaced, when the type is sub-byte packed.
    ///
    /// Types without shared bytes ignore the override.
    pub fn with_packing(mut self, packing: Packing) -> Self {
        if self.is_packed_12bit() {
            self.packing = packing;
        }
        self
    }
}

impl fmt::Display for PixelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?}, {} bit", self.name, self.format, self.bits)?;
        if self.packing != Packing::None {
            write!(f, ", {}", self.packing)?;
        }
        write!(f, ")")
    }
}

/// `(name, storage, bits, packing)` for every known datatype and pixel format.
///
/// 12-bit entries without an explicit packing still share bytes; they default
/// to LSB packing.
const PIXEL_TYPES: &[(&str, SampleFormat, u32, Packing)] = &[
    ("UINT8", SampleFormat::U8, 8, Packing::None),
    ("UINT12", SampleFormat::U16, 12, Packing::Lsb),
    ("UINT16", SampleFormat::U16, 16, Packing::None),
    ("UINT32", SampleFormat::U32, 32, Packing::None),
    ("INT8", SampleFormat::I8, 8, Packing::None),
    ("INT16", SampleFormat::I16, 16, Packing::None),
    ("INT32", SampleFormat::I32, 32, Packing::None),
    ("REAL32", SampleFormat::F32, 32, Packing::None),
    ("REAL64", SampleFormat::F64, 64, Packing::None),
    ("Mono8", SampleFormat::U8, 8, Packing::None),
    ("Mono10", SampleFormat::U16, 16, Packing::None),
    ("Mono10p", SampleFormat::U16, 10, Packing::Lsb),
    ("Mono10pmsb", SampleFormat::U16, 10, Packing::Msb),
    ("Mono12", SampleFormat::U16, 16, Packing::None),
    ("Mono12p", SampleFormat::U16, 12, Packing::Lsb),
    ("Mono12pmsb", SampleFormat::U16, 12, Packing::Msb),
    ("Mono12Packed", SampleFormat::U16, 12, Packing::Lsb),
    ("Mono14", SampleFormat::U16, 16, Packing::None),
    ("Mono14p", SampleFormat::U16, 14, Packing::Lsb),
    ("Mono16", SampleFormat::U16, 16, Packing::None),
    ("BayerBG8", SampleFormat::U8, 8, Packing::None),
    ("BayerGB8", SampleFormat::U8, 8, Packing::None),
    ("BayerBG12", SampleFormat::U16, 16, Packing::None),
    ("BayerBG12p", SampleFormat::U16, 12, Packing::Lsb),
    ("BayerBG12pmsb", SampleFormat::U16, 12, Packing::Msb),
    ("BayerGB12", SampleFormat::U16, 16, Packing::None),
    ("BayerGB12p", SampleFormat::U16, 12, Packing::Lsb),
    ("BayerGB12pmsb", SampleFormat::U16, 12, Packing::Msb),
    ("BayerRG10", SampleFormat::U16, 16, Packing::None),
    ("BayerRG12", SampleFormat::U16, 16, Packing::None),
    ("BayerRG12p", SampleFormat::U16, 12, Packing::Lsb),
    ("BayerRG12pmsb", SampleFormat::U16, 12, Packing::Msb),
    ("BayerRG12Packed", SampleFormat::U16, 12, Packing::Lsb),
    ("BayerBG16", SampleFormat::U16, 16, Packing::None),
    ("BayerGB16", SampleFormat::U16, 16, Packing::None),
    ("BayerRG16", SampleFormat::U16, 16, Packing::None),
    ("BGR8", SampleFormat::U8, 8, Packing::None),
    ("BGR8Packed", SampleFormat::U8, 8, Packing::None),
    ("RGB8", SampleFormat::U8, 8, Packing::None),
    ("RGB8Packed", SampleFormat::U8, 8, Packing::None),
];

/// Looks up a datatype or pixel format name.
///
/// Returns `None` for names outside the table.
pub fn lookup(name: &str) -> Option<PixelType> {
    let name = name.trim();
    PIXEL_TYPES
        .iter()
        .find(|(n, ..)| *n == name)
        .map(|&(n, format, bits, packing)| PixelType {
            name: n.to_string(),
            format,
            bits,
            packing,
        })
}

/// Resolves a name against the table, failing on unknown names.
pub fn resolve(name: &str) -> Result<PixelType> {
    lookup(name).ok_or_else(|| FliError::UnsupportedDataType(name.to_string()))
}
