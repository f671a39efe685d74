use pleiades_image::{with_pixels, ImageError, ImageSize, PixelType, Plane, PlaneBuffer};

use crate::parallel;

/// Crop a plane to a rectangular region.
///
/// The type and the calibration of the plane are kept.
///
/// # Arguments
///
/// * `plane` - The plane to crop, updated in place.
/// * `x` - The x-coordinate of the top-left corner of the region.
/// * `y` - The y-coordinate of the top-left corner of the region.
/// * `size` - The size of the region.
///
/// # Errors
///
/// Returns [`ImageError::Argument`] if the region is empty or not fully
/// inside the plane.
///
/// # Examples
///
/// ```rust
/// use pleiades_image::{ImageSize, Plane};
/// use pleiades_imgproc::crop::crop;
///
/// let mut plane = Plane::from_vec(ImageSize { width: 4, height: 4 }, vec![
///     0u8, 1, 2, 3,
///     4u8, 5, 6, 7,
///     8u8, 9, 10, 11,
///     12u8, 13, 14, 15
/// ]).unwrap();
///
/// crop(&mut plane, 1, 1, ImageSize { width: 2, height: 2 }).unwrap();
///
/// assert_eq!(plane.as_slice::<u8>().unwrap(), &[5u8, 6, 9, 10]);
/// ```
pub fn crop(plane: &mut Plane, x: usize, y: usize, size: ImageSize) -> Result<(), ImageError> {
    if size.width == 0 || size.height == 0 {
        return Err(ImageError::Argument(format!("empty crop region {size}")));
    }
    let inside = x
        .checked_add(size.width)
        .is_some_and(|right| right <= plane.width())
        && y
            .checked_add(size.height)
            .is_some_and(|bottom| bottom <= plane.height());
    if !inside {
        return Err(ImageError::Argument(format!(
            "crop region at ({x}, {y}) of {size} exceeds {}",
            plane.size()
        )));
    }

    let src_width = plane.width();
    let buffer = with_pixels!(plane.buffer(), |src| {
        crop_kernel(src, src_width, x, y, size).map(PlaneBuffer::from)
    })?;
    plane.replace_buffer(size, buffer)?;
    Ok(())
}

fn crop_kernel<T: PixelType>(
    src: &[T],
    src_width: usize,
    x: usize,
    y: usize,
    size: ImageSize,
) -> Result<Vec<T>, ImageError> {
    parallel::build_rows(size.width, size.height, T::default(), |row, dst_row| {
        // get the slice at the top left corner
        let offset = (y + row) * src_width + x;
        dst_row.copy_from_slice(&src[offset..offset + size.width]);
        Ok(())
    })
}
