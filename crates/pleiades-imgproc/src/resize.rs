use pleiades_image::{Calibration, ImageError, ImageSize, Plane, PlaneBuffer};

use crate::interpolation::bilinear_zero_border;
use crate::{convert, parallel};

/// Resample a plane to a new size with bilinear interpolation.
///
/// Output pixel `x` samples source coordinate `x * width / new_width` (and
/// likewise for rows). Neighbours past the source edges contribute zero.
/// Interpolation runs on the physical values; the output is stored as `f64`
/// with identity calibration.
///
/// # Arguments
///
/// * `plane` - The plane to resample, updated in place.
/// * `new_size` - The output size.
///
/// # Errors
///
/// Returns [`ImageError::Argument`] if the new size is empty.
///
/// # Example
///
/// ```
/// use pleiades_image::{ImageSize, Plane};
/// use pleiades_imgproc::resize::resample;
///
/// let mut plane = Plane::from_vec([4, 4].into(), vec![2u8; 16]).unwrap();
///
/// resample(&mut plane, ImageSize { width: 2, height: 2 }).unwrap();
///
/// assert_eq!(plane.as_slice::<f64>().unwrap(), &[2.0; 4]);
/// ```
pub fn resample(plane: &mut Plane, new_size: ImageSize) -> Result<(), ImageError> {
    if new_size.width == 0 || new_size.height == 0 {
        return Err(ImageError::Argument(format!(
            "cannot resample to the empty {new_size}"
        )));
    }

    let size = plane.size();
    let src = convert::to_physical(plane)?;
    let scale_x = size.width as f64 / new_size.width as f64;
    let scale_y = size.height as f64 / new_size.height as f64;

    let dst = parallel::build_rows(new_size.width, new_size.height, 0.0f64, |y, dst_row| {
        let v = y as f64 * scale_y;
        for (x, dst_pixel) in dst_row.iter_mut().enumerate() {
            let u = x as f64 * scale_x;
            *dst_pixel = bilinear_zero_border(&src, size.width, size.height, u, v);
        }
        Ok(())
    })?;

    log::debug!("resample {size} -> {new_size}");

    plane.replace_buffer(new_size, PlaneBuffer::F64(dst))?;
    plane.set_calibration(Calibration::IDENTITY);
    Ok(())
}
