//! Shared helpers for the version-specific layout resolvers.

use crate::fli::types::datatypes::{self, Packing, PixelType};
use crate::fli::types::error::Result;
use crate::fli::types::models::{HeaderTree, ImageShape};
use crate::fli::utils;

/// Keys of the seven dimensions in declared order, as written in 1.0 headers.
pub const DIMENSION_KEYS: [&str; 7] = [
    "channels",
    "x",
    "y",
    "z",
    "phases",
    "timestamps",
    "frequencies",
];

/// Reads all seven dimensions from one section; absent keys default to 1.
pub fn read_shape(tree: &HeaderTree, chapter: &str, section: &str) -> Result<ImageShape> {
    let mut dims = [1usize; 7];
    for (dim, key) in dims.iter_mut().zip(DIMENSION_KEYS) {
        *dim = utils::parse_dimension(tree, chapter, section, key, 1)?;
    }
    Ok(ImageShape::from_array(dims))
}

/// Applies an optional `packing` key to a 12-bit packed pixel type.
///
/// The key is ignored (and not validated) for types without shared bytes.
pub fn apply_packing(
    pixel_type: PixelType,
    tree: &HeaderTree,
    chapter: &str,
    section: &str,
) -> Result<PixelType> {
    if !pixel_type.is_packed_12bit() {
        return Ok(pixel_type);
    }
    match tree.get(chapter, section, "packing") {
        Some(raw) => Ok(pixel_type.with_packing(Packing::try_from(raw)?)),
        None => Ok(pixel_type),
    }
}

/// Resolves the pixel type named in one section.
///
/// A known `pixelFormat` wins over `datatype`. When neither key is present
/// `fallback` is used.
pub fn read_pixel_type(
    tree: &HeaderTree,
    chapter: &str,
    section: &str,
    fallback: PixelType,
) -> Result<PixelType> {
    let from_format = tree
        .get(chapter, section, "pixelFormat")
        .and_then(datatypes::lookup);

    let pixel_type = match (from_format, tree.get(chapter, section, "datatype")) {
        (Some(pixel_type), _) => pixel_type,
        (None, Some(name)) => datatypes::resolve(name)?,
        (None, None) => match tree.get(chapter, section, "pixelFormat") {
            Some(name) => datatypes::resolve(name)?,
            None => fallback,
        },
    };

    apply_packing(pixel_type, tree, chapter, section)
}
