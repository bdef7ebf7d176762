//! `.fli` header tokenizer.
//!
//! The header is plain ASCII text in front of the binary payload:
//!
//! ```text
//! {FLIMIMAGE}          <- chapter
//! [LAYOUT]             <- section (scoped to the active chapter)
//! channels = 1         <- key = value
//! x = 512
//! ...
//! {END}                <- terminates the header; payload follows directly
//! ```
//!
//! Scanning is byte-wise with a single mode value. Lines may end in `\n`,
//! `\r` or `\r\n`; blank lines are skipped. A key-value line with no `=` or
//! with more than one `=` is ignored.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::{debug, info, trace};

use crate::fli::types::error::{FliError, Result};
use crate::fli::types::models::{DEFAULT_GROUP, HeaderTree};

/// Literal chapter name that ends the header.
pub const END_MARKER: &str = "END";

/// Lexical mode of the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// At the start of a line, skipping leading blanks.
    LineStart,
    /// Inside `{...}`.
    Chapter,
    /// Inside `[...]`.
    Section,
    /// Reading a key name, before `=`.
    Key,
    /// Reading a value, after `=`.
    Value,
    /// Discarding the rest of the line.
    Skip,
}

fn is_eol(byte: u8) -> bool {
    byte == b'\n' || byte == b'\r'
}

fn text(buf: &[u8]) -> String {
    String::from_utf8_lossy(buf).trim().to_string()
}

/// Scans a header from the start of `reader`.
///
/// Returns the header tree and the data start offset: the number of bytes
/// consumed up to and including the closing `}` of `{END}`. Bytes after the
/// marker are not read.
///
/// # Errors
/// `HeaderTruncated` if the stream ends before `{END}`.
pub fn parse<R: Read>(reader: &mut R) -> Result<(HeaderTree, u64)> {
    let mut tree = HeaderTree::new();
    let mut chapter = DEFAULT_GROUP.to_string();
    let mut section = DEFAULT_GROUP.to_string();

    let mut mode = Mode::LineStart;
    let mut buf: Vec<u8> = Vec::with_capacity(64);
    let mut key = String::new();
    let mut position: u64 = 0;

    for byte in reader.bytes() {
        let byte = byte?;
        position += 1;

        match mode {
            Mode::LineStart => match byte {
                b' ' | b'\t' | b'\n' | b'\r' => {}
                b'{' => {
                    buf.clear();
                    mode = Mode::Chapter;
                }
                b'[' => {
                    buf.clear();
                    mode = Mode::Section;
                }
                _ => {
                    buf.clear();
                    buf.push(byte);
                    mode = Mode::Key;
                }
            },
            Mode::Chapter => {
                if byte == b'}' {
                    let name = text(&buf);
                    if name == END_MARKER {
                        debug!("Found {{END}} marker, data starts at byte {}", position);
                        info!("Header parsed: {} key-value pairs", tree.len());
                        return Ok((tree, position));
                    }
                    trace!("Chapter '{}' at byte {}", name, position);
                    tree.touch_chapter(&name);
                    chapter = name;
                    section = DEFAULT_GROUP.to_string();
                    mode = Mode::Skip;
                } else if is_eol(byte) {
                    trace!("Unterminated chapter marker ignored at byte {}", position);
                    mode = Mode::LineStart;
                } else {
                    buf.push(byte);
                }
            }
            Mode::Section => {
                if byte == b']' {
                    let name = text(&buf);
                    trace!("Section '{}' in chapter '{}'", name, chapter);
                    tree.touch_section(&chapter, &name);
                    section = name;
                    mode = Mode::Skip;
                } else if is_eol(byte) {
                    trace!("Unterminated section marker ignored at byte {}", position);
                    mode = Mode::LineStart;
                } else {
                    buf.push(byte);
                }
            }
            Mode::Key => {
                if byte == b'=' {
                    key = text(&buf);
                    buf.clear();
                    mode = Mode::Value;
                } else if is_eol(byte) {
                    mode = Mode::LineStart;
                } else {
                    buf.push(byte);
                }
            }
            Mode::Value => {
                if byte == b'=' {
                    mode = Mode::Skip;
                } else if is_eol(byte) {
                    tree.insert(&chapter, &section, &key, &text(&buf));
                    mode = Mode::LineStart;
                } else {
                    buf.push(byte);
                }
            }
            Mode::Skip => {
                if is_eol(byte) {
                    mode = Mode::LineStart;
                }
            }
        }
    }

    Err(FliError::HeaderTruncated {
        bytes_read: position,
    })
}

/// Tokenizes an in-memory header.
pub fn parse_bytes(bytes: &[u8]) -> Result<(HeaderTree, u64)> {
    let mut cursor = bytes;
    parse(&mut cursor)
}

/// Opens `path`, scans its header and closes the file again.
pub fn read_header(path: &Path) -> Result<(HeaderTree, u64)> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    parse(&mut reader)
}
