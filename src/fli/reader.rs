use std::path::{Path, PathBuf};

use log::{info, warn};

use super::format::{header, layout, pixels};
use super::types::array::DecodedArray;
use super::types::error::{FliError, Result};
use super::types::models::{Diagnostic, FrameIndex, HeaderTree, LayoutDescriptor};

/// Required file extension.
pub const FLI_EXTENSION: &str = "fli";

/// An opened `.fli` file.
///
/// Opening parses the header and resolves the layout eagerly; pixel data is
/// read on demand. Each decode call opens the file on its own and closes it
/// before returning.
///
/// The handle caches the most recently decoded background, so the decode
/// methods take `&mut self`. Open one handle per thread for concurrent access.
#[derive(Debug)]
pub struct FliFile {
    path: PathBuf,
    header: HeaderTree,
    data_start: u64,
    layout: LayoutDescriptor,
    /// Background in storage order, filled by the first decode that produces it.
    background: Option<DecodedArray>,
    diagnostics: Vec<Diagnostic>,
}

impl FliFile {
    /// Opens a `.fli` file.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The path does not end in `.fli` (checked before any read)
    /// - The file cannot be opened
    /// - The header has no `{END}` marker
    /// - The schema version is missing or unsupported
    /// - The layout keys required by that version are missing or invalid
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.extension().and_then(|e| e.to_str()) != Some(FLI_EXTENSION) {
            return Err(FliError::InvalidFileExtension(path.to_path_buf()));
        }

        info!("Opening FLI file: {}", path.display());
        let (header, data_start) = header::read_header(path)?;
        let (layout, diagnostics) = layout::resolve(&header)?;

        Ok(Self {
            path: path.to_path_buf(),
            header,
            data_start,
            layout,
            background: None,
            diagnostics,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The parsed header tree.
    pub fn header(&self) -> &HeaderTree {
        &self.header
    }

    /// Byte offset of the first payload byte.
    pub fn data_start(&self) -> u64 {
        self.data_start
    }

    /// Shape and type information, without decoding any pixels.
    pub fn describe(&self) -> &LayoutDescriptor {
        &self.layout
    }

    /// Non-fatal conditions reported so far, oldest first.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        warn!("{}: {}", self.path.display(), diagnostic);
        self.diagnostics.push(diagnostic);
    }

    /// Returns the image data.
    ///
    /// Without `squeeze` the array has the seven storage-order axes
    /// (frequency, time, phase, z, y, x, channel). With `squeeze` the axes
    /// are reordered to (x, y, phase, time, z, frequency, channel) and every
    /// axis of length one is dropped.
    ///
    /// `subtract_background` has no effect on files without a background.
    /// Subtraction floors negative results at zero.
    pub fn get_image_data(&mut self, subtract_background: bool, squeeze: bool) -> Result<DecodedArray> {
        let decoded = pixels::read_image(&self.path, &self.layout, self.data_start)?;
        if decoded.background.is_some() {
            self.background = decoded.background;
        }

        let mut image = decoded.image;
        if subtract_background && self.layout.background_present() {
            if let Some(background) = self.load_background()? {
                image = image.subtract_background(background)?;
            }
        }

        info!("Decoded image with shape {:?}", image.shape());
        Ok(if squeeze { image.squeeze() } else { image })
    }

    /// Returns the background (dark image) data, with the same axis
    /// conventions as [`get_image_data`](Self::get_image_data).
    ///
    /// Files without a background yield an empty array and a
    /// [`Diagnostic::NoBackground`].
    pub fn get_background_data(&mut self, squeeze: bool) -> Result<DecodedArray> {
        if !self.layout.background_present() {
            self.report(Diagnostic::NoBackground);
            return Ok(DecodedArray::empty(self.layout.pixel_type.format));
        }
        if self.background.is_none() && self.layout.compressed {
            self.report(Diagnostic::BackgroundBeforeImage);
        }

        let expected = self.layout.background_byte_len()?;
        let background = self
            .load_background()?
            .cloned()
            .ok_or(FliError::SizeMismatch {
                context: "background payload",
                expected,
                found: 0,
            })?;
        Ok(if squeeze { background.squeeze() } else { background })
    }

    /// Validates a frame index against the image dimensions.
    ///
    /// # Errors
    /// `IndexOutOfRange` naming the first offending dimension.
    pub fn check_frame_index(&self, index: &FrameIndex) -> Result<()> {
        let shape = &self.layout.image_shape;
        let checks = [
            ("channel", index.channel, shape.channels),
            ("z", index.z, shape.z),
            ("phase", index.phase, shape.phases),
            ("timestamp", index.timestamp, shape.timestamps),
            ("frequency", index.frequency, shape.frequencies),
        ];
        for (dimension, index, size) in checks {
            if index >= size {
                return Err(FliError::IndexOutOfRange { dimension, index, size });
            }
        }
        Ok(())
    }

    /// Single-frame access.
    ///
    /// Only the index is validated; frame extraction itself is not defined
    /// for this format, so a valid index yields an empty array and a
    /// [`Diagnostic::FrameExtractionUnsupported`].
    pub fn get_frame(&mut self, index: FrameIndex) -> Result<DecodedArray> {
        self.check_frame_index(&index)?;
        self.report(Diagnostic::FrameExtractionUnsupported);
        Ok(DecodedArray::empty(self.layout.pixel_type.format))
    }

    /// Fills the background cache if needed and returns it.
    fn load_background(&mut self) -> Result<Option<&DecodedArray>> {
        if self.background.is_none() && self.layout.background_present() {
            self.background = if self.layout.compressed {
                pixels::read_image(&self.path, &self.layout, self.data_start)?.background
            } else {
                pixels::read_background(&self.path, &self.layout, self.data_start)?
            };
        }
        Ok(self.background.as_ref())
    }
}
