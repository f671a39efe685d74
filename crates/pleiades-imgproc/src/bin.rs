use pleiades_image::{Calibration, ImageError, ImageSize, Plane, PlaneBuffer};

use crate::{convert, parallel};

/// Largest supported binning factor.
pub const MAX_BIN_FACTOR: usize = 10;

/// Combine each `n x n` block of pixels into one pixel holding their sum.
///
/// The output is `width / n` by `height / n`; trailing rows and columns that
/// do not fill a block are dropped. Sums are taken over the physical values
/// and stored as `f64` with identity calibration, since the dynamic range
/// grows with the block area.
///
/// # Arguments
///
/// * `plane` - The plane to bin, updated in place.
/// * `n` - The binning factor, between 1 and [`MAX_BIN_FACTOR`].
///
/// # Errors
///
/// Returns [`ImageError::Argument`] if `n` is out of range.
///
/// # Example
///
/// ```
/// use pleiades_image::{Plane, ScalarType};
/// use pleiades_imgproc::bin::bin;
///
/// let mut plane = Plane::from_size_val([4, 4].into(), 1u8).unwrap();
///
/// bin(&mut plane, 2).unwrap();
///
/// assert_eq!(plane.scalar_type(), ScalarType::F64);
/// assert_eq!(plane.as_slice::<f64>().unwrap(), &[4.0; 4]);
/// ```
pub fn bin(plane: &mut Plane, n: usize) -> Result<(), ImageError> {
    if !(1..=MAX_BIN_FACTOR).contains(&n) {
        return Err(ImageError::Argument(format!(
            "bin factor {n} outside 1..={MAX_BIN_FACTOR}"
        )));
    }

    let src = convert::to_physical(plane)?;
    let src_width = plane.width();
    let dst_size = ImageSize {
        width: plane.width() / n,
        height: plane.height() / n,
    };

    let dst = parallel::build_rows(dst_size.width, dst_size.height, 0.0f64, |y, dst_row| {
        for (x, dst_pixel) in dst_row.iter_mut().enumerate() {
            *dst_pixel = (y * n..(y + 1) * n)
                .map(|sy| {
                    let offset = sy * src_width + x * n;
                    src[offset..offset + n].iter().sum::<f64>()
                })
                .sum();
        }
        Ok(())
    })?;

    log::debug!("bin {} by {n} -> {dst_size}", plane.size());

    plane.replace_buffer(dst_size, PlaneBuffer::F64(dst))?;
    plane.set_calibration(Calibration::IDENTITY);
    Ok(())
}
