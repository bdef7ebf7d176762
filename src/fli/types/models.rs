//! Core data structures for `.fli` files.
//!
//! This module defines the fundamental types used throughout the library:
//! - The parsed header tree
//! - Schema versions and the normalized layout descriptor
//! - Non-fatal diagnostics and frame addressing

use std::collections::BTreeMap;
use std::fmt;

use super::datatypes::PixelType;
use super::error::{FliError, Result};

/// Chapter and section name used before any explicit marker.
pub const DEFAULT_GROUP: &str = "DEFAULT";

/// Key-value pairs of one section.
pub type Section = BTreeMap<String, String>;

/// Parsed `.fli` header: `chapter -> section -> key -> value`.
///
/// Every key-value pair belongs to the (chapter, section) pair that was active
/// when its line was read. Chapters and sections announced by a marker exist in
/// the tree even when they hold no keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderTree {
    chapters: BTreeMap<String, BTreeMap<String, Section>>,
}

impl HeaderTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value; the last write wins for a repeated key.
    pub fn insert(&mut self, chapter: &str, section: &str, key: &str, value: &str) {
        self.section_mut(chapter, section)
            .insert(key.to_string(), value.to_string());
    }

    /// Registers a chapter without any section.
    pub(crate) fn touch_chapter(&mut self, chapter: &str) {
        self.chapters.entry(chapter.to_string()).or_default();
    }

    /// Registers a section (and its chapter) without any key.
    pub(crate) fn touch_section(&mut self, chapter: &str, section: &str) {
        self.section_mut(chapter, section);
    }

    fn section_mut(&mut self, chapter: &str, section: &str) -> &mut Section {
        self.chapters
            .entry(chapter.to_string())
            .or_default()
            .entry(section.to_string())
            .or_default()
    }

    pub fn get(&self, chapter: &str, section: &str, key: &str) -> Option<&str> {
        self.section(chapter, section)
            .and_then(|s| s.get(key))
            .map(String::as_str)
    }

    pub fn section(&self, chapter: &str, section: &str) -> Option<&Section> {
        self.chapters.get(chapter).and_then(|c| c.get(section))
    }

    pub fn has_chapter(&self, chapter: &str) -> bool {
        self.chapters.contains_key(chapter)
    }

    pub fn has_section(&self, chapter: &str, section: &str) -> bool {
        self.section(chapter, section).is_some()
    }

    pub fn chapters(&self) -> impl Iterator<Item = &str> {
        self.chapters.keys().map(String::as_str)
    }

    pub fn sections(&self, chapter: &str) -> impl Iterator<Item = &str> {
        self.chapters
            .get(chapter)
            .into_iter()
            .flat_map(|c| c.keys().map(String::as_str))
    }

    /// Total number of key-value pairs.
    pub fn len(&self) -> usize {
        self.chapters
            .values()
            .flat_map(|c| c.values())
            .map(|s| s.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes the tree back in the header grammar, terminated by `{END}`.
    ///
    /// Every chapter and section is written with an explicit marker, so
    /// tokenizing the rendered text yields an identical tree.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (chapter, sections) in &self.chapters {
            out.push_str(&format!("{{{}}}\n", chapter));
            for (section, pairs) in sections {
                out.push_str(&format!("[{}]\n", section));
                for (key, value) in pairs {
                    out.push_str(&format!("{} = {}\n", key, value));
                }
            }
        }
        out.push_str("{END}");
        out
    }
}

/// Header dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    /// Legacy layout: `FLIMIMAGE.LAYOUT`, `FLIMIMAGE.INFO`, `FLIMIMAGE.BACKGROUND`.
    V1,
    /// Flat layout under `FLIMIMAGE.DEFAULT` with bracketed axis lists.
    V2,
}

/// Only the numbers 1.0 and 2.0 are accepted (`"1"`, `"1.0"` and `"1.00"` are
/// all 1.0). Minor revisions such as `"1.7"` are rejected.
impl TryFrom<&str> for SchemaVersion {
    type Error = FliError;
    fn try_from(v: &str) -> Result<Self> {
        let number: f32 = v
            .trim()
            .parse()
            .map_err(|_| FliError::UnknownSchemaVersion(v.to_string()))?;
        if number == 1.0 {
            Ok(Self::V1)
        } else if number == 2.0 {
            Ok(Self::V2)
        } else {
            Err(FliError::UnknownSchemaVersion(v.to_string()))
        }
    }
}

/// Seven-dimensional extent of an image or background, in declared order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageShape {
    pub channels: usize,
    pub x: usize,
    pub y: usize,
    pub z: usize,
    pub phases: usize,
    pub timestamps: usize,
    pub frequencies: usize,
}

impl ImageShape {
    pub fn from_array(dims: [usize; 7]) -> Self {
        let [channels, x, y, z, phases, timestamps, frequencies] = dims;
        Self {
            channels,
            x,
            y,
            z,
            phases,
            timestamps,
            frequencies,
        }
    }

    /// Dimensions in declared order: channel, x, y, z, phase, time, frequency.
    pub fn to_array(&self) -> [usize; 7] {
        [
            self.channels,
            self.x,
            self.y,
            self.z,
            self.phases,
            self.timestamps,
            self.frequencies,
        ]
    }

    /// Dimensions in storage order: frequency, time, phase, z, y, x, channel.
    ///
    /// Channel varies fastest in the flat payload.
    pub fn storage_dims(&self) -> [usize; 7] {
        let mut dims = self.to_array();
        dims.reverse();
        dims
    }

    /// Number of samples, or `None` if the product overflows `u64`.
    pub fn element_count(&self) -> Option<u64> {
        self.to_array()
            .iter()
            .try_fold(1u64, |acc, &d| acc.checked_mul(d as u64))
    }

    /// Bytes `pixel_type` samples of this shape occupy on disk.
    ///
    /// # Errors
    /// `InvalidHeaderValue` if the size does not fit in `u64`.
    pub fn byte_len(&self, pixel_type: &PixelType) -> Result<u64> {
        self.element_count()
            .and_then(|count| pixel_type.byte_len(count))
            .ok_or_else(|| FliError::InvalidHeaderValue {
                path: "image shape".to_string(),
                value: self.to_string(),
                reason: "payload size overflows u64",
            })
    }
}

impl fmt::Display for ImageShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "c={} x={} y={} z={} ph={} t={} f={}",
            self.channels, self.x, self.y, self.z, self.phases, self.timestamps, self.frequencies
        )
    }
}

/// Shape and pixel type of the dark image stored after the main image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundLayout {
    pub shape: ImageShape,
    pub pixel_type: PixelType,
}

/// Normalized, version-independent description of the binary payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutDescriptor {
    /// Version string exactly as found in the header.
    pub version: String,
    pub image_shape: ImageShape,
    pub pixel_type: PixelType,
    pub compressed: bool,
    /// `None` when the file holds no background.
    pub background: Option<BackgroundLayout>,
}

impl LayoutDescriptor {
    pub fn background_present(&self) -> bool {
        self.background.is_some()
    }

    pub fn background_shape(&self) -> Option<ImageShape> {
        self.background.as_ref().map(|bg| bg.shape)
    }

    /// Bytes the image occupies in the (decompressed) payload.
    pub fn image_byte_len(&self) -> Result<u64> {
        self.image_shape.byte_len(&self.pixel_type)
    }

    /// Bytes the background occupies in the (decompressed) payload; zero when absent.
    pub fn background_byte_len(&self) -> Result<u64> {
        match &self.background {
            Some(bg) => bg.shape.byte_len(&bg.pixel_type),
            None => Ok(0),
        }
    }
}

/// Non-fatal conditions reported while opening or decoding a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// `FLIMIMAGE.INFO` is missing; the payload is assumed uncompressed.
    MissingInfoSection,
    /// A background was requested before the image of a compressed file.
    BackgroundBeforeImage,
    /// A background was requested but the file holds none.
    NoBackground,
    /// Frame extraction was requested; only index validation is performed.
    FrameExtractionUnsupported,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingInfoSection => {
                write!(f, "INFO not found in header, assuming no compression")
            }
            Diagnostic::BackgroundBeforeImage => write!(
                f,
                "getting background before getting data is inefficient in compressed files"
            ),
            Diagnostic::NoBackground => write!(f, "no background present in file"),
            Diagnostic::FrameExtractionUnsupported => {
                write!(f, "single frame extraction is not supported")
            }
        }
    }
}

/// Addresses one frame: everything but the x/y plane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameIndex {
    pub channel: usize,
    pub z: usize,
    pub phase: usize,
    pub timestamp: usize,
    pub frequency: usize,
}
