//! Codec layer for payload decompression and sample unpacking.
//!
//! # Submodules
//!
//! - [`compression`][]: gzip inflation of compressed payloads
//! - [`unpack`][]: 12-bit unpacking and little-endian sample decoding

pub mod compression;
pub mod unpack;
