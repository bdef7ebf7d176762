//! Layout resolver for 1.0 headers.
//!
//! ```text
//! {FLIMIMAGE}
//! [INFO]        version, compression
//! [LAYOUT]      channels, x, y, z, phases, timestamps, frequencies,
//!               datatype | pixelFormat, packing, hasDarkImage
//! [BACKGROUND]  same keys as LAYOUT, describing the dark image
//! ```

use log::{debug, warn};

use crate::fli::format::version::{IMAGE_CHAPTER, INFO_SECTION};
use crate::fli::types::datatypes;
use crate::fli::types::error::{FliError, Result};
use crate::fli::types::models::{BackgroundLayout, Diagnostic, HeaderTree, ImageShape, LayoutDescriptor};
use crate::fli::utils;

use super::common;
use super::ResolveResult;

pub const LAYOUT_SECTION: &str = "LAYOUT";
pub const BACKGROUND_SECTION: &str = "BACKGROUND";

pub fn resolve(tree: &HeaderTree, version: String) -> Result<ResolveResult> {
    let mut diagnostics = Vec::new();

    if !tree.has_section(IMAGE_CHAPTER, LAYOUT_SECTION) {
        return Err(FliError::MissingHeaderField {
            path: format!("{}.{}", IMAGE_CHAPTER, LAYOUT_SECTION),
        });
    }

    let image_shape = common::read_shape(tree, IMAGE_CHAPTER, LAYOUT_SECTION)?;
    let pixel_type = common::read_pixel_type(
        tree,
        IMAGE_CHAPTER,
        LAYOUT_SECTION,
        datatypes::resolve("UINT8")?,
    )?;

    let compressed = if tree.has_section(IMAGE_CHAPTER, INFO_SECTION) {
        utils::parse_count(tree, IMAGE_CHAPTER, INFO_SECTION, "compression")?.unwrap_or(0) > 0
    } else {
        warn!("{}", Diagnostic::MissingInfoSection);
        diagnostics.push(Diagnostic::MissingInfoSection);
        false
    };

    let has_dark_image =
        utils::parse_count(tree, IMAGE_CHAPTER, LAYOUT_SECTION, "hasDarkImage")?.unwrap_or(0) > 0;

    let background = if tree.has_section(IMAGE_CHAPTER, BACKGROUND_SECTION) {
        debug!("Background described by {}.{}", IMAGE_CHAPTER, BACKGROUND_SECTION);
        Some(BackgroundLayout {
            shape: common::read_shape(tree, IMAGE_CHAPTER, BACKGROUND_SECTION)?,
            pixel_type: common::read_pixel_type(
                tree,
                IMAGE_CHAPTER,
                BACKGROUND_SECTION,
                pixel_type.clone(),
            )?,
        })
    } else if has_dark_image {
        debug!("Background implied by hasDarkImage");
        Some(BackgroundLayout {
            shape: dark_image_shape(&image_shape),
            pixel_type: pixel_type.clone(),
        })
    } else {
        None
    };

    Ok((
        LayoutDescriptor {
            version,
            image_shape,
            pixel_type,
            compressed,
            background,
        },
        diagnostics,
    ))
}

/// Shape of a dark image announced only by `hasDarkImage`: one frame per
/// channel and frequency, with singleton z, phase and time axes.
pub fn dark_image_shape(image: &ImageShape) -> ImageShape {
    ImageShape {
        z: 1,
        phases: 1,
        timestamps: 1,
        ..*image
    }
}
