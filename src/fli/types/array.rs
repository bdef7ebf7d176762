//! Decoded pixel arrays.
//!
//! A [`DecodedArray`] owns an n-dimensional [`ndarray::ArrayD`] whose element
//! type follows the file's pixel type. Freshly decoded arrays are
//! seven-dimensional in storage order (frequency, time, phase, z, y, x,
//! channel); [`DecodedArray::squeeze`] moves them to the canonical external
//! order (x, y, phase, time, z, frequency, channel) and drops singleton axes.

use std::fmt;
use std::ops::Sub;

use ndarray::{ArrayD, Axis, IxDyn, Zip};

use super::datatypes::SampleFormat;
use super::error::{FliError, Result};

/// Storage-order axis indices arranged as x, y, phase, time, z, frequency, channel.
pub const CANONICAL_AXES: [usize; 7] = [5, 4, 2, 1, 3, 0, 6];

/// A primitive element type a payload can decode into.
pub trait Sample:
    Copy + PartialOrd + Default + Sub<Output = Self> + fmt::Debug + Send + Sync + 'static
{
    const FORMAT: SampleFormat;

    fn to_f64(self) -> f64;

    /// Converts with `as` semantics: truncating toward zero and saturating.
    fn from_f64(value: f64) -> Self;

    /// `self - other` for `self >= other`, clamped to the type's maximum.
    fn difference(self, other: Self) -> Self;

    fn wrap(array: ArrayD<Self>) -> DecodedArray;

    fn peek(array: &DecodedArray) -> Option<&ArrayD<Self>>;

    fn take(array: DecodedArray) -> Option<ArrayD<Self>>;
}

macro_rules! impl_sample {
    ($($ty:ty => $variant:ident, $sub:ident);* $(;)?) => {
        $(
            impl Sample for $ty {
                const FORMAT: SampleFormat = SampleFormat::$variant;

                fn to_f64(self) -> f64 {
                    self as f64
                }

                fn from_f64(value: f64) -> Self {
                    value as $ty
                }

                fn difference(self, other: Self) -> Self {
                    self.$sub(other)
                }

                fn wrap(array: ArrayD<Self>) -> DecodedArray {
                    DecodedArray::$variant(array)
                }

                fn peek(array: &DecodedArray) -> Option<&ArrayD<Self>> {
                    match array {
                        DecodedArray::$variant(a) => Some(a),
                        _ => None,
                    }
                }

                fn take(array: DecodedArray) -> Option<ArrayD<Self>> {
                    match array {
                        DecodedArray::$variant(a) => Some(a),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_sample!(
    u8 => U8, saturating_sub;
    u16 => U16, saturating_sub;
    u32 => U32, saturating_sub;
    i8 => I8, saturating_sub;
    i16 => I16, saturating_sub;
    i32 => I32, saturating_sub;
    f32 => F32, sub;
    f64 => F64, sub;
);

/// Dense pixel data with the element type of the source file.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedArray {
    U8(ArrayD<u8>),
    U16(ArrayD<u16>),
    U32(ArrayD<u32>),
    I8(ArrayD<i8>),
    I16(ArrayD<i16>),
    I32(ArrayD<i32>),
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
}

/// Runs `$body` with `$arr` bound to the inner array, whatever its element type.
macro_rules! with_array {
    ($value:expr, $arr:ident => $body:expr) => {
        match $value {
            DecodedArray::U8($arr) => $body,
            DecodedArray::U16($arr) => $body,
            DecodedArray::U32($arr) => $body,
            DecodedArray::I8($arr) => $body,
            DecodedArray::I16($arr) => $body,
            DecodedArray::I32($arr) => $body,
            DecodedArray::F32($arr) => $body,
            DecodedArray::F64($arr) => $body,
        }
    };
}

/// Like `with_array!`, but rewraps the result in the same variant.
macro_rules! map_array {
    ($value:expr, $arr:ident => $body:expr) => {
        match $value {
            DecodedArray::U8($arr) => DecodedArray::U8($body),
            DecodedArray::U16($arr) => DecodedArray::U16($body),
            DecodedArray::U32($arr) => DecodedArray::U32($body),
            DecodedArray::I8($arr) => DecodedArray::I8($body),
            DecodedArray::I16($arr) => DecodedArray::I16($body),
            DecodedArray::I32($arr) => DecodedArray::I32($body),
            DecodedArray::F32($arr) => DecodedArray::F32($body),
            DecodedArray::F64($arr) => DecodedArray::F64($body),
        }
    };
}

impl DecodedArray {
    /// Builds an array from samples laid out in row-major order over `dims`.
    pub fn from_samples<T: Sample>(samples: Vec<T>, dims: &[usize]) -> Result<Self> {
        let expected: usize = dims.iter().product();
        let found = samples.len();
        let array = ArrayD::from_shape_vec(IxDyn(dims), samples).map_err(|_| {
            FliError::SizeMismatch {
                context: "decoded samples",
                expected: expected as u64,
                found: found as u64,
            }
        })?;
        Ok(T::wrap(array))
    }

    /// A one-dimensional array with no elements.
    pub fn empty(format: SampleFormat) -> Self {
        fn build<T: Sample>() -> DecodedArray {
            T::wrap(ArrayD::from_elem(IxDyn(&[0]), T::default()))
        }
        match format {
            SampleFormat::U8 => build::<u8>(),
            SampleFormat::U16 => build::<u16>(),
            SampleFormat::U32 => build::<u32>(),
            SampleFormat::I8 => build::<i8>(),
            SampleFormat::I16 => build::<i16>(),
            SampleFormat::I32 => build::<i32>(),
            SampleFormat::F32 => build::<f32>(),
            SampleFormat::F64 => build::<f64>(),
        }
    }

    pub fn sample_format(&self) -> SampleFormat {
        match self {
            DecodedArray::U8(_) => SampleFormat::U8,
            DecodedArray::U16(_) => SampleFormat::U16,
            DecodedArray::U32(_) => SampleFormat::U32,
            DecodedArray::I8(_) => SampleFormat::I8,
            DecodedArray::I16(_) => SampleFormat::I16,
            DecodedArray::I32(_) => SampleFormat::I32,
            DecodedArray::F32(_) => SampleFormat::F32,
            DecodedArray::F64(_) => SampleFormat::F64,
        }
    }

    pub fn shape(&self) -> &[usize] {
        with_array!(self, a => a.shape())
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    pub fn len(&self) -> usize {
        with_array!(self, a => a.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrows the inner array if its element type is `T`.
    pub fn as_array<T: Sample>(&self) -> Option<&ArrayD<T>> {
        T::peek(self)
    }

    /// Takes the inner array if its element type is `T`.
    pub fn into_array<T: Sample>(self) -> Option<ArrayD<T>> {
        T::take(self)
    }

    /// Copies every element into `T` with `as` conversion semantics.
    pub fn to_typed<T: Sample>(&self) -> ArrayD<T> {
        with_array!(self, a => a.mapv(|v| T::from_f64(v.to_f64())))
    }

    pub fn to_f64(&self) -> ArrayD<f64> {
        self.to_typed::<f64>()
    }

    /// Reorders a storage-order array to (x, y, phase, time, z, frequency,
    /// channel) and removes every axis of length one.
    ///
    /// Arrays that are not seven-dimensional (e.g. the empty background) are
    /// returned unchanged.
    pub fn squeeze(self) -> Self {
        map_array!(self, a => squeeze_array(a))
    }

    /// Subtracts `background` elementwise, broadcasting its singleton axes,
    /// and floors every negative difference at zero.
    ///
    /// The background is first converted to this array's element type. Integer
    /// differences above the type's maximum (a negative background under a
    /// signed image) saturate.
    pub fn subtract_background(self, background: &DecodedArray) -> Result<Self> {
        Ok(map_array!(self, a => subtract_floor(a, background)?))
    }
}

fn squeeze_array<T: Sample>(array: ArrayD<T>) -> ArrayD<T> {
    if array.ndim() != CANONICAL_AXES.len() {
        return array;
    }
    let mut out = array.permuted_axes(&CANONICAL_AXES[..]);
    for axis in (0..out.ndim()).rev() {
        if out.len_of(Axis(axis)) == 1 {
            out = out.index_axis_move(Axis(axis), 0);
        }
    }
    out.as_standard_layout().into_owned()
}

fn subtract_floor<T: Sample>(mut image: ArrayD<T>, background: &DecodedArray) -> Result<ArrayD<T>> {
    let background = background.to_typed::<T>();
    let broadcast = background
        .broadcast(image.raw_dim())
        .ok_or_else(|| FliError::ShapeMismatch {
            image: image.shape().to_vec(),
            background: background.shape().to_vec(),
        })?;
    Zip::from(&mut image).and(&broadcast).for_each(|pixel, &dark| {
        *pixel = if *pixel < dark {
            T::default()
        } else {
            pixel.difference(dark)
        };
    });
    Ok(image)
}
