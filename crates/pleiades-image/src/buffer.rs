use num_traits::AsPrimitive;

use crate::allocator;
use crate::error::ImageError;
use crate::scalar::{PixelType, ScalarType};

/// Dispatch on the live variant of a [`PlaneBuffer`].
///
/// The body is monomorphized once per scalar type with `$data` bound to the
/// typed vector (by value, reference or mutable reference, following the
/// expression being matched).
///
/// ```
/// use pleiades_image::{with_pixels, PlaneBuffer};
///
/// let buffer = PlaneBuffer::U16(vec![1, 2, 3]);
/// let sum: f64 = with_pixels!(&buffer, |data| data.iter().map(|&v| v as f64).sum());
/// assert_eq!(sum, 6.0);
/// ```
#[macro_export]
macro_rules! with_pixels {
    ($buffer:expr, |$data:ident| $body:expr) => {
        match $buffer {
            $crate::PlaneBuffer::U8($data) => $body,
            $crate::PlaneBuffer::I8($data) => $body,
            $crate::PlaneBuffer::U16($data) => $body,
            $crate::PlaneBuffer::I16($data) => $body,
            $crate::PlaneBuffer::U32($data) => $body,
            $crate::PlaneBuffer::I32($data) => $body,
            $crate::PlaneBuffer::I64($data) => $body,
            $crate::PlaneBuffer::F32($data) => $body,
            $crate::PlaneBuffer::F64($data) => $body,
        }
    };
}

/// A contiguous pixel buffer holding exactly one of the supported scalar types.
#[derive(Clone, Debug, PartialEq)]
pub enum PlaneBuffer {
    /// 8-bit unsigned pixels
    U8(Vec<u8>),
    /// 8-bit signed pixels
    I8(Vec<i8>),
    /// 16-bit unsigned pixels
    U16(Vec<u16>),
    /// 16-bit signed pixels
    I16(Vec<i16>),
    /// 32-bit unsigned pixels
    U32(Vec<u32>),
    /// 32-bit signed pixels
    I32(Vec<i32>),
    /// 64-bit signed pixels
    I64(Vec<i64>),
    /// 32-bit float pixels
    F32(Vec<f32>),
    /// 64-bit float pixels
    F64(Vec<f64>),
}

impl PlaneBuffer {
    /// Allocate a zero-filled buffer of `len` elements of the given type.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::Allocation`] if the buffer cannot be allocated.
    pub fn zeros(scalar: ScalarType, len: usize) -> Result<Self, ImageError> {
        Ok(match scalar {
            ScalarType::U8 => PlaneBuffer::U8(allocator::try_vec_filled(len, 0)?),
            ScalarType::I8 => PlaneBuffer::I8(allocator::try_vec_filled(len, 0)?),
            ScalarType::U16 => PlaneBuffer::U16(allocator::try_vec_filled(len, 0)?),
            ScalarType::I16 => PlaneBuffer::I16(allocator::try_vec_filled(len, 0)?),
            ScalarType::U32 => PlaneBuffer::U32(allocator::try_vec_filled(len, 0)?),
            ScalarType::I32 => PlaneBuffer::I32(allocator::try_vec_filled(len, 0)?),
            ScalarType::I64 => PlaneBuffer::I64(allocator::try_vec_filled(len, 0)?),
            ScalarType::F32 => PlaneBuffer::F32(allocator::try_vec_filled(len, 0.0)?),
            ScalarType::F64 => PlaneBuffer::F64(allocator::try_vec_filled(len, 0.0)?),
        })
    }

    /// The runtime tag of the live variant.
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            PlaneBuffer::U8(_) => ScalarType::U8,
            PlaneBuffer::I8(_) => ScalarType::I8,
            PlaneBuffer::U16(_) => ScalarType::U16,
            PlaneBuffer::I16(_) => ScalarType::I16,
            PlaneBuffer::U32(_) => ScalarType::U32,
            PlaneBuffer::I32(_) => ScalarType::I32,
            PlaneBuffer::I64(_) => ScalarType::I64,
            PlaneBuffer::F32(_) => ScalarType::F32,
            PlaneBuffer::F64(_) => ScalarType::F64,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        with_pixels!(self, |data| data.len())
    }

    /// Whether the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read element `index` widened to `f64`.
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        with_pixels!(self, |data| data.get(index).map(|v| v.to_f64()))
    }

    /// Store `value` at `index` with the native conversion of the live type.
    ///
    /// Returns `false` if `index` is out of range.
    pub fn set_f64(&mut self, index: usize, value: f64) -> bool {
        with_pixels!(self, |data| match data.get_mut(index) {
            Some(slot) => {
                *slot = PixelType::from_f64(value);
                true
            }
            None => false,
        })
    }

    /// Convert every element to `target` with the native conversion.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::Allocation`] if the new buffer cannot be allocated.
    pub fn convert(&self, target: ScalarType) -> Result<PlaneBuffer, ImageError> {
        with_pixels!(self, |data| convert_slice(data, target))
    }

    /// Copy the elements into a new `f64` vector.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::Allocation`] if the vector cannot be allocated.
    pub fn to_f64_vec(&self) -> Result<Vec<f64>, ImageError> {
        with_pixels!(self, |data| {
            let mut out = allocator::try_vec_with_capacity(data.len())?;
            out.extend(data.iter().map(|v| v.to_f64()));
            Ok(out)
        })
    }

    /// Borrow the typed data.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::ScalarTypeMismatch`] if `T` is not the live type.
    pub fn as_slice<T: PixelType>(&self) -> Result<&[T], ImageError> {
        let scalar = self.scalar_type();
        T::slice_of(self).ok_or(ImageError::ScalarTypeMismatch(scalar, T::SCALAR))
    }

    /// Mutably borrow the typed data.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::ScalarTypeMismatch`] if `T` is not the live type.
    pub fn as_slice_mut<T: PixelType>(&mut self) -> Result<&mut [T], ImageError> {
        let scalar = self.scalar_type();
        T::slice_of_mut(self).ok_or(ImageError::ScalarTypeMismatch(scalar, T::SCALAR))
    }
}

fn cast_vec<T, U>(data: &[T]) -> Result<Vec<U>, ImageError>
where
    T: AsPrimitive<U>,
    U: Copy + 'static,
{
    let mut out = allocator::try_vec_with_capacity(data.len())?;
    out.extend(data.iter().map(|v| v.as_()));
    Ok(out)
}

/// Convert a typed slice into a buffer of the `target` type.
///
/// # Errors
///
/// Returns [`ImageError::Allocation`] if the new buffer cannot be allocated.
pub fn convert_slice<T: PixelType>(
    data: &[T],
    target: ScalarType,
) -> Result<PlaneBuffer, ImageError> {
    Ok(match target {
        ScalarType::U8 => PlaneBuffer::U8(cast_vec(data)?),
        ScalarType::I8 => PlaneBuffer::I8(cast_vec(data)?),
        ScalarType::U16 => PlaneBuffer::U16(cast_vec(data)?),
        ScalarType::I16 => PlaneBuffer::I16(cast_vec(data)?),
        ScalarType::U32 => PlaneBuffer::U32(cast_vec(data)?),
        ScalarType::I32 => PlaneBuffer::I32(cast_vec(data)?),
        ScalarType::I64 => PlaneBuffer::I64(cast_vec(data)?),
        ScalarType::F32 => PlaneBuffer::F32(cast_vec(data)?),
        ScalarType::F64 => PlaneBuffer::F64(cast_vec(data)?),
    })
}

impl<T: PixelType> From<Vec<T>> for PlaneBuffer {
    fn from(data: Vec<T>) -> Self {
        T::into_buffer(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeros_every_type() -> Result<(), ImageError> {
        for scalar in ScalarType::ALL {
            let buffer = PlaneBuffer::zeros(scalar, 6)?;
            assert_eq!(buffer.scalar_type(), scalar);
            assert_eq!(buffer.len(), 6);
            assert_eq!(buffer.get_f64(5), Some(0.0));
            assert_eq!(buffer.get_f64(6), None);
        }
        Ok(())
    }

    #[test]
    fn lossless_roundtrip_between_all_types() -> Result<(), ImageError> {
        // values representable by every supported type
        let values = vec![0u8, 1, 7, 42, 100, 127];
        let source = PlaneBuffer::from(values.clone());
        for first in ScalarType::ALL {
            for second in ScalarType::ALL {
                let back = source
                    .convert(first)?
                    .convert(second)?
                    .convert(ScalarType::U8)?;
                assert_eq!(back.as_slice::<u8>()?, values.as_slice());
            }
        }
        Ok(())
    }

    #[test]
    fn lossy_conversion_truncates() -> Result<(), ImageError> {
        let source = PlaneBuffer::from(vec![3.9f64, -1.5, 255.6, 1000.0]);
        let narrowed = source.convert(ScalarType::U8)?;
        assert_eq!(narrowed.as_slice::<u8>()?, &[3u8, 0, 255, 255]);

        let wrapped = PlaneBuffer::from(vec![300i32, -1]).convert(ScalarType::U8)?;
        assert_eq!(wrapped.as_slice::<u8>()?, &[44u8, 255]);
        Ok(())
    }

    #[test]
    fn typed_access_checks_tag() {
        let buffer = PlaneBuffer::from(vec![1i16, 2]);
        assert!(buffer.as_slice::<i16>().is_ok());
        assert_eq!(
            buffer.as_slice::<f32>().err(),
            Some(ImageError::ScalarTypeMismatch(ScalarType::I16, ScalarType::F32))
        );
    }

    #[test]
    fn set_f64_converts() {
        let mut buffer = PlaneBuffer::from(vec![0u16; 3]);
        assert!(buffer.set_f64(1, 12.8));
        assert!(!buffer.set_f64(3, 1.0));
        assert_eq!(buffer.get_f64(1), Some(12.0));
    }
}
