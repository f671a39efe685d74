use crate::allocator;
use crate::buffer::PlaneBuffer;
use crate::error::ImageError;
use crate::params::{Calibration, RenderParams};
use crate::scalar::{PixelType, ScalarType};
use crate::stats::StatsCache;

/// Plane size in pixels
///
/// # Examples
///
/// ```
/// use pleiades_image::ImageSize;
///
/// let size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(size.width, 10);
/// assert_eq!(size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageSize {
    /// Width of the plane in pixels
    pub width: usize,
    /// Height of the plane in pixels
    pub height: usize,
}

impl ImageSize {
    /// Number of pixels.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::Allocation`] if the product overflows.
    pub fn area(&self) -> Result<usize, ImageError> {
        allocator::checked_len(self.width, self.height)
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from(size: [usize; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

/// A single-channel 2-D image of one scalar type.
///
/// The plane owns its pixel buffer exclusively. Operations changing the size
/// or the type build a new buffer and swap it in with [`Plane::replace_buffer`],
/// so a failed operation leaves the plane untouched.
#[derive(Clone, Debug)]
pub struct Plane {
    size: ImageSize,
    buffer: PlaneBuffer,
    calibration: Calibration,
    render: RenderParams,
    stats: StatsCache,
}

impl Plane {
    /// Create a zero-filled plane.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the plane in pixels.
    /// * `scalar` - The scalar type of the pixels.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::Allocation`] if the buffer cannot be allocated.
    ///
    /// # Examples
    ///
    /// ```
    /// use pleiades_image::{ImageSize, Plane, ScalarType};
    ///
    /// let plane = Plane::new([10, 20].into(), ScalarType::I16).unwrap();
    ///
    /// assert_eq!(plane.width(), 10);
    /// assert_eq!(plane.height(), 20);
    /// assert_eq!(plane.scalar_type(), ScalarType::I16);
    /// ```
    pub fn new(size: ImageSize, scalar: ScalarType) -> Result<Self, ImageError> {
        let buffer = PlaneBuffer::zeros(scalar, size.area()?)?;
        Ok(Self::from_parts(size, buffer))
    }

    /// Create a plane from typed pixel data in row-major order.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidDataLength`] if `data` does not hold
    /// exactly `width * height` pixels.
    pub fn from_vec<T: PixelType>(size: ImageSize, data: Vec<T>) -> Result<Self, ImageError> {
        Self::from_buffer(size, T::into_buffer(data))
    }

    /// Create a plane filled with `val`.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::Allocation`] if the buffer cannot be allocated.
    pub fn from_size_val<T: PixelType>(size: ImageSize, val: T) -> Result<Self, ImageError> {
        let data = allocator::try_vec_filled(size.area()?, val)?;
        Ok(Self::from_parts(size, T::into_buffer(data)))
    }

    /// Create a plane from an already tagged buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidDataLength`] if the buffer length does not
    /// match the size.
    pub fn from_buffer(size: ImageSize, buffer: PlaneBuffer) -> Result<Self, ImageError> {
        let expected = size.area()?;
        if buffer.len() != expected {
            return Err(ImageError::InvalidDataLength(buffer.len(), expected));
        }
        Ok(Self::from_parts(size, buffer))
    }

    fn from_parts(size: ImageSize, buffer: PlaneBuffer) -> Self {
        Self {
            size,
            buffer,
            calibration: Calibration::IDENTITY,
            render: RenderParams::default(),
            stats: StatsCache::default(),
        }
    }

    /// The size of the plane.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// The width of the plane in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// The height of the plane in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Number of pixels.
    pub fn num_pixels(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the plane holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// The scalar type of the live buffer.
    pub fn scalar_type(&self) -> ScalarType {
        self.buffer.scalar_type()
    }

    /// The tagged pixel buffer.
    pub fn buffer(&self) -> &PlaneBuffer {
        &self.buffer
    }

    /// Convert the buffer to another scalar type.
    ///
    /// Every element goes through the native conversion of the target type.
    /// Converting to the current type is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::Allocation`] if the new buffer cannot be
    /// allocated; the plane is unchanged in that case.
    pub fn set_type(&mut self, scalar: ScalarType) -> Result<(), ImageError> {
        if scalar == self.scalar_type() {
            return Ok(());
        }
        let converted = self.buffer.convert(scalar)?;
        self.buffer = converted;
        self.stats.invalidate();
        Ok(())
    }

    /// Convert the buffer to the scalar type identified by an image-type code.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::UnsupportedScalarType`] for unknown codes.
    pub fn set_type_code(&mut self, code: i32) -> Result<(), ImageError> {
        self.set_type(ScalarType::from_code(code)?)
    }

    fn linear_index(&self, x: usize, y: usize) -> Result<usize, ImageError> {
        if x >= self.size.width || y >= self.size.height {
            return Err(ImageError::IndexOutOfBounds {
                x,
                y,
                width: self.size.width,
                height: self.size.height,
            });
        }
        Ok(y * self.size.width + x)
    }

    /// Read the stored code at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::IndexOutOfBounds`] outside the plane.
    pub fn get(&self, x: usize, y: usize) -> Result<f64, ImageError> {
        let index = self.linear_index(x, y)?;
        self.get_index(index)
    }

    /// Read the stored code at a row-major index.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::LinearIndexOutOfBounds`] outside the plane.
    pub fn get_index(&self, index: usize) -> Result<f64, ImageError> {
        self.buffer
            .get_f64(index)
            .ok_or(ImageError::LinearIndexOutOfBounds(index, self.buffer.len()))
    }

    /// Store `value` at `(x, y)` with the native conversion of the live type.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::IndexOutOfBounds`] outside the plane.
    pub fn set(&mut self, x: usize, y: usize, value: f64) -> Result<(), ImageError> {
        let index = self.linear_index(x, y)?;
        self.set_index(index, value)
    }

    /// Store `value` at a row-major index.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::LinearIndexOutOfBounds`] outside the plane.
    pub fn set_index(&mut self, index: usize, value: f64) -> Result<(), ImageError> {
        if !self.buffer.set_f64(index, value) {
            return Err(ImageError::LinearIndexOutOfBounds(index, self.buffer.len()));
        }
        self.stats.invalidate();
        Ok(())
    }

    /// Read the calibrated value at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::IndexOutOfBounds`] outside the plane.
    pub fn get_value(&self, x: usize, y: usize) -> Result<f64, ImageError> {
        Ok(self.calibration.apply(self.get(x, y)?))
    }

    /// Store a calibrated value at `(x, y)`.
    ///
    /// The value is mapped back to a stored code, rounded to nearest for
    /// integer planes.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::IndexOutOfBounds`] outside the plane.
    pub fn set_value(&mut self, x: usize, y: usize, value: f64) -> Result<(), ImageError> {
        let mut stored = self.calibration.invert(value);
        if !self.scalar_type().is_float() {
            stored = stored.round();
        }
        self.set(x, y, stored)
    }

    /// Borrow the typed pixel data.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::ScalarTypeMismatch`] if `T` is not the live type.
    pub fn as_slice<T: PixelType>(&self) -> Result<&[T], ImageError> {
        self.buffer.as_slice()
    }

    /// Mutably borrow the typed pixel data. Clears the statistics cache.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::ScalarTypeMismatch`] if `T` is not the live type.
    pub fn as_slice_mut<T: PixelType>(&mut self) -> Result<&mut [T], ImageError> {
        self.stats.invalidate();
        self.buffer.as_slice_mut()
    }

    /// Swap in a new buffer, possibly changing the size and the type.
    ///
    /// Returns the previous buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidDataLength`] if the buffer does not match
    /// `size`; the plane is unchanged in that case.
    pub fn replace_buffer(
        &mut self,
        size: ImageSize,
        buffer: PlaneBuffer,
    ) -> Result<PlaneBuffer, ImageError> {
        let expected = size.area()?;
        if buffer.len() != expected {
            return Err(ImageError::InvalidDataLength(buffer.len(), expected));
        }
        self.size = size;
        self.stats.invalidate();
        Ok(std::mem::replace(&mut self.buffer, buffer))
    }

    /// The calibration of the plane.
    pub fn calibration(&self) -> Calibration {
        self.calibration
    }

    /// Replace the calibration. Clears the statistics cache.
    pub fn set_calibration(&mut self, calibration: Calibration) {
        self.calibration = calibration;
        self.stats.invalidate();
    }

    /// The display parameters.
    pub fn render_params(&self) -> &RenderParams {
        &self.render
    }

    /// Mutable access to the display parameters.
    pub fn render_params_mut(&mut self) -> &mut RenderParams {
        &mut self.render
    }

    /// The statistics cache.
    pub fn stats(&self) -> &StatsCache {
        &self.stats
    }

    /// Clear the statistics cache.
    pub fn invalidate_stats(&mut self) {
        self.stats.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn plane_smoke() -> Result<(), ImageError> {
        let plane = Plane::new([10, 20].into(), ScalarType::U16)?;
        assert_eq!(plane.size().width, 10);
        assert_eq!(plane.size().height, 20);
        assert_eq!(plane.num_pixels(), 200);
        assert_eq!(plane.get(9, 19)?, 0.0);
        Ok(())
    }

    #[test]
    fn from_vec_checks_length() {
        let res = Plane::from_vec([3, 2].into(), vec![0u8; 5]);
        assert_eq!(res.err(), Some(ImageError::InvalidDataLength(5, 6)));
    }

    #[test]
    fn pixel_access() -> Result<(), ImageError> {
        let mut plane = Plane::from_vec([3, 2].into(), vec![0i16, 1, 2, 3, 4, 5])?;
        assert_eq!(plane.get(1, 1)?, 4.0);
        assert_eq!(plane.get_index(2)?, 2.0);

        plane.set(2, 0, -7.9)?;
        assert_eq!(plane.get(2, 0)?, -7.0);

        assert_eq!(
            plane.get(3, 0),
            Err(ImageError::IndexOutOfBounds {
                x: 3,
                y: 0,
                width: 3,
                height: 2
            })
        );
        assert_eq!(
            plane.set_index(6, 1.0),
            Err(ImageError::LinearIndexOutOfBounds(6, 6))
        );
        Ok(())
    }

    #[test]
    fn set_type_converts_and_invalidates() -> Result<(), ImageError> {
        let mut plane = Plane::from_vec([2, 2].into(), vec![1.5f32, -2.5, 300.0, 4.0])?;
        plane.stats().set_extrema(-2.5, 300.0);

        plane.set_type(ScalarType::U8)?;
        assert_eq!(plane.scalar_type(), ScalarType::U8);
        assert_eq!(plane.as_slice::<u8>()?, &[1u8, 0, 255, 4]);
        assert!(plane.stats().is_empty());

        assert_eq!(
            plane.set_type_code(3),
            Err(ImageError::UnsupportedScalarType(3))
        );
        assert_eq!(plane.scalar_type(), ScalarType::U8);

        plane.set_type_code(-64)?;
        assert_eq!(plane.scalar_type(), ScalarType::F64);
        Ok(())
    }

    #[test]
    fn calibrated_values() -> Result<(), ImageError> {
        let mut plane = Plane::from_vec([2, 1].into(), vec![-32768i16, 0])?;
        plane.set_calibration(Calibration::new(1.0, 32768.0));
        assert_relative_eq!(plane.get_value(0, 0)?, 0.0);
        assert_relative_eq!(plane.get_value(1, 0)?, 32768.0);

        plane.set_value(1, 0, 40000.0)?;
        assert_eq!(plane.get(1, 0)?, 7232.0);
        Ok(())
    }

    #[test]
    fn replace_buffer_checks_size() -> Result<(), ImageError> {
        let mut plane = Plane::new([4, 4].into(), ScalarType::U8)?;
        let res = plane.replace_buffer([2, 2].into(), PlaneBuffer::F64(vec![0.0; 3]));
        assert_eq!(res.err(), Some(ImageError::InvalidDataLength(3, 4)));
        assert_eq!(plane.width(), 4);

        let old = plane.replace_buffer([2, 2].into(), PlaneBuffer::F64(vec![1.0; 4]))?;
        assert_eq!(old.len(), 16);
        assert_eq!(plane.size(), ImageSize::from([2, 2]));
        assert_eq!(plane.scalar_type(), ScalarType::F64);
        Ok(())
    }
}
