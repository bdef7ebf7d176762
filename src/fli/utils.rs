//! Helpers for reading typed values out of the header tree.

use super::types::error::{FliError, Result};
use super::types::models::HeaderTree;

/// Dotted `CHAPTER.SECTION.key` path used in error messages.
pub fn field_path(chapter: &str, section: &str, key: &str) -> String {
    format!("{}.{}.{}", chapter, section, key)
}

/// Returns a value that the schema requires.
pub fn require<'a>(tree: &'a HeaderTree, chapter: &str, section: &str, key: &str) -> Result<&'a str> {
    tree.get(chapter, section, key)
        .ok_or_else(|| FliError::MissingHeaderField {
            path: field_path(chapter, section, key),
        })
}

/// Parses an optional non-negative integer field.
pub fn parse_count(tree: &HeaderTree, chapter: &str, section: &str, key: &str) -> Result<Option<usize>> {
    tree.get(chapter, section, key)
        .map(|raw| {
            raw.trim().parse::<usize>().map_err(|_| FliError::InvalidHeaderValue {
                path: field_path(chapter, section, key),
                value: raw.to_string(),
                reason: "not a non-negative integer",
            })
        })
        .transpose()
}

/// Parses an image dimension, falling back to `default` when the key is absent.
///
/// Dimensions must be at least 1.
pub fn parse_dimension(
    tree: &HeaderTree,
    chapter: &str,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize> {
    let value = parse_count(tree, chapter, section, key)?.unwrap_or(default);
    if value == 0 {
        return Err(FliError::InvalidHeaderValue {
            path: field_path(chapter, section, key),
            value: value.to_string(),
            reason: "dimension must be at least 1",
        });
    }
    Ok(value)
}

/// Counts the entries of a bracketed, comma-separated list such as `[1.0, 2.5, 4]`.
///
/// Blank entries are not counted, so `[]` has length zero.
pub fn bracket_list_len(value: &str) -> usize {
    let inner = value.trim();
    let inner = inner.strip_prefix('[').unwrap_or(inner);
    let inner = inner.strip_suffix(']').unwrap_or(inner);
    inner.split(',').filter(|item| !item.trim().is_empty()).count()
}
