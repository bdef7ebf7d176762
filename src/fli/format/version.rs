//! Schema version detection.

use log::debug;

use crate::fli::types::error::{FliError, Result};
use crate::fli::types::models::{DEFAULT_GROUP, HeaderTree, SchemaVersion};

pub const IMAGE_CHAPTER: &str = "FLIMIMAGE";
pub const INFO_SECTION: &str = "INFO";
const VERSION_KEY: &str = "version";

/// Places a version key may live in, in lookup order.
///
/// 1. `FLIMIMAGE.INFO` (1.0 layout)
/// 2. `FLIMIMAGE.DEFAULT` (2.0 layout)
/// 3. `DEFAULT.DEFAULT` (2.0 layout without a chapter marker)
pub const VERSION_LOCATIONS: [(&str, &str); 3] = [
    (IMAGE_CHAPTER, INFO_SECTION),
    (IMAGE_CHAPTER, DEFAULT_GROUP),
    (DEFAULT_GROUP, DEFAULT_GROUP),
];

/// Finds the version string and the (chapter, section) it was read from.
///
/// Empty values are skipped. Returns `None` if no location holds a version.
pub fn locate(tree: &HeaderTree) -> Option<(&str, (&'static str, &'static str))> {
    VERSION_LOCATIONS.iter().find_map(|&(chapter, section)| {
        tree.get(chapter, section, VERSION_KEY)
            .filter(|v| !v.trim().is_empty())
            .map(|v| (v, (chapter, section)))
    })
}

/// Returns the raw version string, if any.
pub fn tell_version(tree: &HeaderTree) -> Option<&str> {
    locate(tree).map(|(version, _)| version)
}

/// Resolves the schema version of a header.
///
/// # Errors
/// `UnknownSchemaVersion` if no version is present or it is neither 1.x nor 2.x.
pub fn resolve(tree: &HeaderTree) -> Result<(String, SchemaVersion)> {
    let (raw, (chapter, section)) =
        locate(tree).ok_or_else(|| FliError::UnknownSchemaVersion(String::new()))?;
    let schema = SchemaVersion::try_from(raw)?;
    debug!(
        "Schema version '{}' found in {}.{} (parsed as {:?})",
        raw, chapter, section, schema
    );
    Ok((raw.to_string(), schema))
}
