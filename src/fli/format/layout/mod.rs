//! # Layout Resolution Dispatcher
//!
//! Maps a parsed header onto a version-independent [`LayoutDescriptor`].
//! The schema branch lives entirely here: nothing downstream of this module
//! needs to know which header dialect produced the descriptor.

use log::{debug, info};

use crate::fli::format::version;
use crate::fli::types::error::Result;
use crate::fli::types::models::{Diagnostic, HeaderTree, LayoutDescriptor, SchemaVersion};

pub mod common;
pub mod v1;
pub mod v2;

/// Layout plus any non-fatal diagnostics raised while resolving it.
pub type ResolveResult = (LayoutDescriptor, Vec<Diagnostic>);

/// Resolves the payload layout of a header.
///
/// # Errors
/// - `UnknownSchemaVersion` if the version is absent or unsupported
/// - `MissingHeaderField` if the detected schema requires a key that is absent
/// - `InvalidHeaderValue`, `UnsupportedDataType`, `InvalidPacking` for bad values,
///   including shapes whose payload size overflows `u64`
pub fn resolve(tree: &HeaderTree) -> Result<ResolveResult> {
    let (version, schema) = version::resolve(tree)?;

    let (layout, diagnostics) = match schema {
        SchemaVersion::V1 => v1::resolve(tree, version)?,
        SchemaVersion::V2 => v2::resolve(tree, version)?,
    };

    info!(
        "Layout resolved: version={}, image=[{}], pixel={}, compressed={}, background={}",
        layout.version,
        layout.image_shape,
        layout.pixel_type,
        layout.compressed,
        layout.background_present()
    );
    if let Some(bg) = &layout.background {
        debug!("Background layout: [{}], pixel={}", bg.shape, bg.pixel_type);
    }
    let image_bytes = layout.image_byte_len()?;
    let background_bytes = layout.background_byte_len()?;
    debug!(
        "Payload size: image {} bytes, background {} bytes",
        image_bytes, background_bytes
    );

    Ok((layout, diagnostics))
}
