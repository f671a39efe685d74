use num_traits::AsPrimitive;

use crate::buffer::PlaneBuffer;
use crate::error::ImageError;

/// The scalar type stored by a plane.
///
/// Each variant maps 1:1 to the image-type code used by the external
/// binary image format (see [`ScalarType::code`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScalarType {
    /// 8-bit unsigned integer (code 8)
    U8,
    /// 8-bit signed integer (code 10)
    I8,
    /// 16-bit unsigned integer (code 20)
    U16,
    /// 16-bit signed integer (code 16)
    I16,
    /// 32-bit unsigned integer (code 40)
    U32,
    /// 32-bit signed integer (code 32)
    I32,
    /// 64-bit signed integer (code 64)
    I64,
    /// 32-bit float (code -32)
    F32,
    /// 64-bit float (code -64)
    F64,
}

impl ScalarType {
    /// All supported scalar types, narrowest first.
    pub const ALL: [ScalarType; 9] = [
        ScalarType::U8,
        ScalarType::I8,
        ScalarType::U16,
        ScalarType::I16,
        ScalarType::U32,
        ScalarType::I32,
        ScalarType::I64,
        ScalarType::F32,
        ScalarType::F64,
    ];

    /// Resolve an image-type code.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::UnsupportedScalarType`] for unknown codes.
    pub fn from_code(code: i32) -> Result<Self, ImageError> {
        match code {
            8 => Ok(ScalarType::U8),
            10 => Ok(ScalarType::I8),
            20 => Ok(ScalarType::U16),
            16 => Ok(ScalarType::I16),
            40 => Ok(ScalarType::U32),
            32 => Ok(ScalarType::I32),
            64 => Ok(ScalarType::I64),
            -32 => Ok(ScalarType::F32),
            -64 => Ok(ScalarType::F64),
            other => Err(ImageError::UnsupportedScalarType(other)),
        }
    }

    /// The image-type code of this scalar type.
    pub fn code(self) -> i32 {
        match self {
            ScalarType::U8 => 8,
            ScalarType::I8 => 10,
            ScalarType::U16 => 20,
            ScalarType::I16 => 16,
            ScalarType::U32 => 40,
            ScalarType::I32 => 32,
            ScalarType::I64 => 64,
            ScalarType::F32 => -32,
            ScalarType::F64 => -64,
        }
    }

    /// Size of one element in bytes.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            ScalarType::U8 | ScalarType::I8 => 1,
            ScalarType::U16 | ScalarType::I16 => 2,
            ScalarType::U32 | ScalarType::I32 | ScalarType::F32 => 4,
            ScalarType::I64 | ScalarType::F64 => 8,
        }
    }

    /// Whether the type is a floating point type.
    pub fn is_float(self) -> bool {
        matches!(self, ScalarType::F32 | ScalarType::F64)
    }

    /// Whether the type can hold negative values.
    pub fn is_signed(self) -> bool {
        !matches!(self, ScalarType::U8 | ScalarType::U16 | ScalarType::U32)
    }

    /// One step up the promotion lattice used by addition and subtraction.
    ///
    /// `u8, i8 -> i16`, `u16, i16 -> i32`, `u32, i32 -> i64`, and
    /// `i64, f32, f64 -> f64`.
    pub fn promoted(self) -> Self {
        match self {
            ScalarType::U8 | ScalarType::I8 => ScalarType::I16,
            ScalarType::U16 | ScalarType::I16 => ScalarType::I32,
            ScalarType::U32 | ScalarType::I32 => ScalarType::I64,
            ScalarType::I64 | ScalarType::F32 | ScalarType::F64 => ScalarType::F64,
        }
    }

    /// The narrowest type able to represent every value of both types.
    ///
    /// 64-bit integers joined with anything they cannot hold go to `f64`.
    pub fn join(self, other: Self) -> Self {
        if self == other {
            return self;
        }

        if self.is_float() || other.is_float() {
            let widest_int = [self, other]
                .iter()
                .filter(|t| !t.is_float())
                .map(|t| t.bits())
                .max()
                .unwrap_or(0);
            let both_f32 = [self, other]
                .iter()
                .all(|t| *t == ScalarType::F32 || !t.is_float());
            // f32 represents every integer up to 16 bits exactly
            return if both_f32 && widest_int <= 16 {
                ScalarType::F32
            } else {
                ScalarType::F64
            };
        }

        if self.is_signed() == other.is_signed() {
            return if self.bits() >= other.bits() {
                self
            } else {
                other
            };
        }

        let (signed, unsigned) = if self.is_signed() {
            (self, other)
        } else {
            (other, self)
        };

        match signed.bits().max(unsigned.bits() * 2) {
            16 => ScalarType::I16,
            32 => ScalarType::I32,
            64 => ScalarType::I64,
            _ => ScalarType::F64,
        }
    }

    fn bits(self) -> usize {
        self.bytes_per_pixel() * 8
    }
}

impl std::fmt::Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            ScalarType::U8 => "u8",
            ScalarType::I8 => "i8",
            ScalarType::U16 => "u16",
            ScalarType::I16 => "i16",
            ScalarType::U32 => "u32",
            ScalarType::I32 => "i32",
            ScalarType::I64 => "i64",
            ScalarType::F32 => "f32",
            ScalarType::F64 => "f64",
        };
        write!(f, "{name}")
    }
}

impl TryFrom<i32> for ScalarType {
    type Error = ImageError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

/// Trait for the element types a plane can store.
///
/// Conversions between element types use the native `as` semantics:
/// integers wrap, floats truncate toward zero and saturate.
pub trait PixelType:
    Copy
    + Default
    + PartialOrd
    + Send
    + Sync
    + std::fmt::Debug
    + 'static
    + AsPrimitive<u8>
    + AsPrimitive<i8>
    + AsPrimitive<u16>
    + AsPrimitive<i16>
    + AsPrimitive<u32>
    + AsPrimitive<i32>
    + AsPrimitive<i64>
    + AsPrimitive<f32>
    + AsPrimitive<f64>
{
    /// The runtime tag of this element type.
    const SCALAR: ScalarType;

    /// Widen the element to `f64`.
    fn to_f64(self) -> f64;

    /// Convert a `f64` with the native conversion of the element type.
    fn from_f64(value: f64) -> Self;

    /// Convert an interpolated `f64`, rounding to nearest for integer types.
    fn from_f64_round(value: f64) -> Self {
        if Self::SCALAR.is_float() {
            Self::from_f64(value)
        } else {
            Self::from_f64(value.round())
        }
    }

    /// Wrap a typed vector into the tagged buffer.
    fn into_buffer(data: Vec<Self>) -> PlaneBuffer;

    /// Borrow the typed data if the buffer holds this element type.
    fn slice_of(buffer: &PlaneBuffer) -> Option<&[Self]>;

    /// Mutably borrow the typed data if the buffer holds this element type.
    fn slice_of_mut(buffer: &mut PlaneBuffer) -> Option<&mut [Self]>;
}

macro_rules! impl_pixel_type {
    ($t:ty, $variant:ident) => {
        impl PixelType for $t {
            const SCALAR: ScalarType = ScalarType::$variant;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(value: f64) -> Self {
                value as $t
            }

            fn into_buffer(data: Vec<Self>) -> PlaneBuffer {
                PlaneBuffer::$variant(data)
            }

            fn slice_of(buffer: &PlaneBuffer) -> Option<&[Self]> {
                match buffer {
                    PlaneBuffer::$variant(data) => Some(data),
                    _ => None,
                }
            }

            fn slice_of_mut(buffer: &mut PlaneBuffer) -> Option<&mut [Self]> {
                match buffer {
                    PlaneBuffer::$variant(data) => Some(data),
                    _ => None,
                }
            }
        }
    };
}

impl_pixel_type!(u8, U8);
impl_pixel_type!(i8, I8);
impl_pixel_type!(u16, U16);
impl_pixel_type!(i16, I16);
impl_pixel_type!(u32, U32);
impl_pixel_type!(i32, I32);
impl_pixel_type!(i64, I64);
impl_pixel_type!(f32, F32);
impl_pixel_type!(f64, F64);
