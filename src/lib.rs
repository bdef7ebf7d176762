//! # fli-reader
//!
//! A reader for Lambert Instruments `.fli` fluorescence-lifetime imaging files.
//! Supports header versions 1.x and 2.x, gzip-compressed payloads, 12-bit
//! packed samples and dark-image (background) subtraction.
//!
//! ```no_run
//! use fli_reader::FliFile;
//!
//! let mut file = FliFile::open("sample.fli")?;
//! println!("{:?}", file.describe().image_shape);
//! let image = file.get_image_data(true, true)?;
//! println!("decoded {:?}", image.shape());
//! # Ok::<(), fli_reader::FliError>(())
//! ```
pub mod fli;

// Re-export the main types for convenience
pub use fli::{
    DecodedArray,
    Diagnostic,
    FliError,
    FliFile,
    FrameIndex,
    HeaderTree,
    ImageShape,
    LayoutDescriptor,
    Result,
};
