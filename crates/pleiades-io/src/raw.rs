use bytemuck::Pod;
use pleiades_image::{
    allocator, Calibration, ImageError, ImageSize, PixelType, Plane, PlaneBuffer, ScalarType,
};

use crate::{
    error::IoError,
    sink::{HeaderValue, PlaneSink},
};

/// Pixel types with a big-endian representation on the wire.
trait BigEndian: PixelType + Pod {
    fn from_big_endian(self) -> Self;
    fn to_big_endian(self) -> Self;
}

macro_rules! impl_big_endian {
    ($($t:ty),*) => {
        $(
            impl BigEndian for $t {
                #[inline]
                fn from_big_endian(self) -> Self {
                    <$t>::from_be(self)
                }
                #[inline]
                fn to_big_endian(self) -> Self {
                    <$t>::to_be(self)
                }
            }
        )*
    };
}

impl_big_endian!(u8, i8, u16, i16, u32, i32, i64);

impl BigEndian for f32 {
    #[inline]
    fn from_big_endian(self) -> Self {
        f32::from_bits(u32::from_be(self.to_bits()))
    }
    #[inline]
    fn to_big_endian(self) -> Self {
        f32::from_bits(self.to_bits().to_be())
    }
}

impl BigEndian for f64 {
    #[inline]
    fn from_big_endian(self) -> Self {
        f64::from_bits(u64::from_be(self.to_bits()))
    }
    #[inline]
    fn to_big_endian(self) -> Self {
        f64::from_bits(self.to_bits().to_be())
    }
}

/// Create a plane from raw big-endian pixel data.
///
/// # Arguments
///
/// * `code` - The scalar type code of the data (8, 10, 20, 16, 40, 32, 64, -32 or -64).
/// * `width` - The plane width.
/// * `height` - The plane height.
/// * `scale` - The calibration scale.
/// * `zero` - The calibration zero point.
/// * `raw` - Exactly `width * height` values in row-major order.
///
/// # Errors
///
/// Returns [`ImageError::UnsupportedScalarType`] for an unknown code and
/// [`IoError::DataLength`] if `raw` does not match the plane size.
///
/// # Example
///
/// ```
/// use pleiades_image::ScalarType;
/// use pleiades_io::load;
///
/// let plane = load(16, 2, 1, 1.0, 32768.0, &[0x80, 0x00, 0x00, 0x01]).unwrap();
///
/// assert_eq!(plane.scalar_type(), ScalarType::I16);
/// assert_eq!(plane.get(0, 0).unwrap(), -32768.0);
/// assert_eq!(plane.get_value(1, 0).unwrap(), 32769.0);
/// ```
pub fn load(
    code: i32,
    width: usize,
    height: usize,
    scale: f64,
    zero: f64,
    raw: &[u8],
) -> Result<Plane, IoError> {
    let scalar = ScalarType::from_code(code)?;
    let size = ImageSize { width, height };

    let expected = allocator::checked_len(width, height)?
        .checked_mul(scalar.bytes_per_pixel())
        .ok_or(ImageError::Allocation(usize::MAX))?;
    if raw.len() != expected {
        return Err(IoError::DataLength(expected, raw.len()));
    }

    let buffer = match scalar {
        ScalarType::U8 => decode::<u8>(raw),
        ScalarType::I8 => decode::<i8>(raw),
        ScalarType::U16 => decode::<u16>(raw),
        ScalarType::I16 => decode::<i16>(raw),
        ScalarType::U32 => decode::<u32>(raw),
        ScalarType::I32 => decode::<i32>(raw),
        ScalarType::I64 => decode::<i64>(raw),
        ScalarType::F32 => decode::<f32>(raw),
        ScalarType::F64 => decode::<f64>(raw),
    };

    let mut plane = Plane::from_buffer(size, buffer)?;
    plane.set_calibration(Calibration::new(scale, zero));

    log::debug!("loaded {size} plane of {scalar}");

    Ok(plane)
}

fn decode<T: BigEndian>(raw: &[u8]) -> PlaneBuffer {
    let mut pixels: Vec<T> = bytemuck::pod_collect_to_vec(raw);
    for v in pixels.iter_mut() {
        *v = v.from_big_endian();
    }
    PlaneBuffer::from(pixels)
}

/// Write one plane of a multi-plane container.
///
/// The header keys `BITPIX` (the scalar type code), `NAXIS1`, `NAXIS2`,
/// `BSCALE` and `BZERO` are written first, plus `PEDESTAL` when the
/// calibration carries one, followed by the pixel data as big-endian bytes.
///
/// # Arguments
///
/// * `plane` - The plane to store.
/// * `plane_index` - The index of the plane in the container.
/// * `sink` - The destination.
///
/// # Errors
///
/// Returns the errors of the sink, or [`ImageError::Allocation`] if the byte
/// buffer cannot be allocated.
///
/// # Example
///
/// ```
/// use pleiades_image::Plane;
/// use pleiades_io::{store, MemorySink};
///
/// let plane = Plane::from_vec([2, 1].into(), vec![1u16, 258]).unwrap();
/// let mut sink = MemorySink::new();
///
/// store(&plane, 0, &mut sink).unwrap();
///
/// let stored = sink.plane(0).unwrap();
/// assert_eq!(stored.int("BITPIX"), Some(20));
/// assert_eq!(stored.data, vec![0, 1, 1, 2]);
/// ```
pub fn store(plane: &Plane, plane_index: usize, sink: &mut impl PlaneSink) -> Result<(), IoError> {
    let calibration = plane.calibration();
    let scalar = plane.scalar_type();

    sink.write_key(plane_index, "BITPIX", HeaderValue::Int(scalar.code() as i64))?;
    sink.write_key(plane_index, "NAXIS1", HeaderValue::Int(plane.width() as i64))?;
    sink.write_key(plane_index, "NAXIS2", HeaderValue::Int(plane.height() as i64))?;
    sink.write_key(plane_index, "BSCALE", HeaderValue::Float(calibration.scale))?;
    sink.write_key(plane_index, "BZERO", HeaderValue::Float(calibration.zero))?;
    if calibration.pedestal != 0.0 {
        sink.write_key(
            plane_index,
            "PEDESTAL",
            HeaderValue::Float(calibration.pedestal),
        )?;
    }

    let bytes = match plane.buffer() {
        PlaneBuffer::U8(data) => encode(data),
        PlaneBuffer::I8(data) => encode(data),
        PlaneBuffer::U16(data) => encode(data),
        PlaneBuffer::I16(data) => encode(data),
        PlaneBuffer::U32(data) => encode(data),
        PlaneBuffer::I32(data) => encode(data),
        PlaneBuffer::I64(data) => encode(data),
        PlaneBuffer::F32(data) => encode(data),
        PlaneBuffer::F64(data) => encode(data),
    }?;
    sink.write_data(plane_index, &bytes)?;

    log::debug!("stored {} plane of {scalar} at index {plane_index}", plane.size());

    Ok(())
}

fn encode<T: BigEndian>(data: &[T]) -> Result<Vec<u8>, ImageError> {
    let mut swapped = allocator::try_vec_with_capacity::<T>(data.len())?;
    swapped.extend(data.iter().map(|v| v.to_big_endian()));
    Ok(bytemuck::cast_slice(&swapped).to_vec())
}
