//! Layout resolver for 2.0 headers.
//!
//! All keys sit in one flat section (`FLIMIMAGE.DEFAULT`, or `DEFAULT.DEFAULT`
//! when the file has no chapter marker). Channel, phase and frequency axes are
//! bracketed lists whose lengths give the dimensions:
//!
//! ```text
//! channels = [0]
//! phases = [0, 90, 180, 270]
//! frequencies = [40.0]
//! x = 512
//! y = 512
//! numberOfFrames = 1
//! numberOfDarkImages = 1
//! pixelFormat = Mono12p
//! ```
//!
//! 2.0 payloads are never compressed and the dark images share the image shape.

use crate::fli::format::version::IMAGE_CHAPTER;
use crate::fli::types::datatypes;
use crate::fli::types::error::{FliError, Result};
use crate::fli::types::models::{
    BackgroundLayout, DEFAULT_GROUP, HeaderTree, ImageShape, LayoutDescriptor,
};
use crate::fli::utils;

use super::common;
use super::ResolveResult;

/// Picks the section holding the flat 2.0 keys.
fn key_section(tree: &HeaderTree) -> (&'static str, &'static str) {
    if tree.has_section(IMAGE_CHAPTER, DEFAULT_GROUP) {
        (IMAGE_CHAPTER, DEFAULT_GROUP)
    } else {
        (DEFAULT_GROUP, DEFAULT_GROUP)
    }
}

/// Length of a bracketed axis list; an absent key counts as one.
///
/// # Errors
/// `InvalidHeaderValue` if the list is present but empty.
fn list_dimension(tree: &HeaderTree, chapter: &str, section: &str, key: &str) -> Result<usize> {
    let Some(raw) = tree.get(chapter, section, key) else {
        return Ok(1);
    };
    match utils::bracket_list_len(raw) {
        0 => Err(FliError::InvalidHeaderValue {
            path: utils::field_path(chapter, section, key),
            value: raw.to_string(),
            reason: "dimension must be at least 1",
        }),
        len => Ok(len),
    }
}

pub fn resolve(tree: &HeaderTree, version: String) -> Result<ResolveResult> {
    let (chapter, section) = key_section(tree);

    let x = utils::require(tree, chapter, section, "x")
        .and_then(|_| utils::parse_dimension(tree, chapter, section, "x", 1))?;
    let y = utils::require(tree, chapter, section, "y")
        .and_then(|_| utils::parse_dimension(tree, chapter, section, "y", 1))?;

    let image_shape = ImageShape {
        channels: list_dimension(tree, chapter, section, "channels")?,
        x,
        y,
        z: utils::parse_dimension(tree, chapter, section, "z", 1)?,
        phases: list_dimension(tree, chapter, section, "phases")?,
        timestamps: utils::parse_dimension(tree, chapter, section, "numberOfFrames", 1)?,
        frequencies: list_dimension(tree, chapter, section, "frequencies")?,
    };

    let pixel_format = utils::require(tree, chapter, section, "pixelFormat")?;
    let pixel_type = common::apply_packing(
        datatypes::resolve(pixel_format)?,
        tree,
        chapter,
        section,
    )?;

    let dark_images = utils::parse_count(tree, chapter, section, "numberOfDarkImages")?.unwrap_or(0);
    let background = (dark_images > 0).then(|| BackgroundLayout {
        shape: image_shape,
        pixel_type: pixel_type.clone(),
    });

    Ok((
        LayoutDescriptor {
            version,
            image_shape,
            pixel_type,
            compressed: false,
            background,
        },
        Vec::new(),
    ))
}
