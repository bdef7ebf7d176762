//! Core `.fli` reader module.

pub mod codec;
pub mod format;
pub mod reader;
pub mod types;
pub mod utils;

pub use reader::FliFile;
pub use types::array::{DecodedArray, Sample};
pub use types::datatypes::{Packing, PixelType, SampleFormat};
pub use types::error::{FliError, Result};
pub use types::models::{
    BackgroundLayout, Diagnostic, FrameIndex, HeaderTree, ImageShape, LayoutDescriptor,
    SchemaVersion,
};
