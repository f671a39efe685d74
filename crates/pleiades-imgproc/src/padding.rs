use pleiades_image::{with_pixels, ImageError, ImageSize, PixelType, Plane, PlaneBuffer};

use crate::parallel;

/// Place the plane at the center of a larger canvas.
///
/// The content is offset by `((new_width - width) / 2, (new_height - height) / 2)`
/// and the new border cells hold `background`, a stored code converted to
/// the plane type. The type and the calibration are kept.
///
/// # Arguments
///
/// * `plane` - The plane to pad, updated in place.
/// * `new_size` - The size of the canvas.
/// * `background` - The value of the new cells.
///
/// # Errors
///
/// Returns [`ImageError::Argument`] if the canvas is smaller than the plane
/// in either dimension.
///
/// # Example
///
/// ```
/// use pleiades_image::Plane;
/// use pleiades_imgproc::padding::pad;
///
/// let mut plane = Plane::from_vec([1, 1].into(), vec![5i8]).unwrap();
///
/// pad(&mut plane, [3, 2].into(), -1.0).unwrap();
///
/// assert_eq!(plane.as_slice::<i8>().unwrap(), &[-1, 5, -1, -1, -1, -1]);
/// ```
pub fn pad(plane: &mut Plane, new_size: ImageSize, background: f64) -> Result<(), ImageError> {
    let size = plane.size();
    if new_size.width < size.width || new_size.height < size.height {
        return Err(ImageError::Argument(format!(
            "cannot pad {size} to the smaller {new_size}"
        )));
    }

    let buffer = with_pixels!(plane.buffer(), |src| {
        pad_kernel(src, size, new_size, background).map(PlaneBuffer::from)
    })?;
    plane.replace_buffer(new_size, buffer)?;
    Ok(())
}

fn pad_kernel<T: PixelType>(
    src: &[T],
    size: ImageSize,
    new_size: ImageSize,
    background: f64,
) -> Result<Vec<T>, ImageError> {
    let left = (new_size.width - size.width) / 2;
    let top = (new_size.height - size.height) / 2;
    let fill = T::from_f64_round(background);

    parallel::build_rows(new_size.width, new_size.height, fill, |y, dst_row| {
        if y < top || y >= top + size.height {
            return Ok(());
        }
        let src_y = y - top;
        dst_row[left..left + size.width]
            .copy_from_slice(&src[src_y * size.width..(src_y + 1) * size.width]);
        Ok(())
    })
}
