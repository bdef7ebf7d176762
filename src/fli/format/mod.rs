//! File format parsing layer for `.fli` files.
//!
//! This module provides the mid-level parsing layer that bridges between
//! raw file I/O and the high-level [`FliFile`](crate::fli::reader::FliFile).
//!
//! # Module Organization
//!
//! - [`header`]: Tokenizes the text header into a chapter/section/key tree
//! - [`version`]: Detects the header dialect
//! - [`layout`]: Resolves the version-specific keys into a layout descriptor
//! - [`pixels`]: Reads, inflates and decodes the pixel payload
//!
//! # Architecture
//!
//! ```text
//! File Structure:
//! ┌─────────────────┐
//! │  Text Header    │ ← header::parse()
//! │  ... {END}      │   version::resolve(), layout::resolve()
//! ├─────────────────┤
//! │  Image samples  │ ← pixels::read_image()
//! ├─────────────────┤
//! │  Background     │ ← pixels::read_background()
//! │  (optional)     │
//! └─────────────────┘
//!   (both regions gzip-wrapped together when compressed)
//! ```

pub mod header;
pub mod layout;
pub mod pixels;
pub mod version;
