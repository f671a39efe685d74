use pleiades_image::{allocator, with_pixels, ImageError, PixelType, Plane, PlaneBuffer};

use crate::interpolation::bilinear_zero_border;
use crate::parallel;

/// Shift a plane by a whole number of pixels.
///
/// Output pixel `(x, y)` takes source pixel `(x - dx, y - dy)`; cells with no
/// source pixel are zero. The type and the calibration are kept.
///
/// # Example
///
/// ```
/// use pleiades_image::Plane;
/// use pleiades_imgproc::warp::translate;
///
/// let mut plane = Plane::from_vec([3, 2].into(), vec![1u8, 2, 3, 4, 5, 6]).unwrap();
///
/// translate(&mut plane, 1, -1).unwrap();
///
/// assert_eq!(plane.as_slice::<u8>().unwrap(), &[0, 4, 5, 0, 0, 0]);
/// ```
pub fn translate(plane: &mut Plane, dx: i64, dy: i64) -> Result<(), ImageError> {
    let size = plane.size();
    let buffer = with_pixels!(plane.buffer(), |src| {
        shift_kernel(src, size.width, size.height, dx, dy).map(PlaneBuffer::from)
    })?;
    plane.replace_buffer(size, buffer)?;
    Ok(())
}

/// Shift a plane by a fractional number of pixels with bilinear
/// interpolation.
///
/// Neighbours outside the source count as zero, so newly exposed cells are
/// zero. Whole-pixel shifts take the exact path of [`translate`].
///
/// # Errors
///
/// Returns [`ImageError::Argument`] if a shift is not finite.
pub fn translate_subpixel(plane: &mut Plane, dx: f64, dy: f64) -> Result<(), ImageError> {
    if !dx.is_finite() || !dy.is_finite() {
        return Err(ImageError::Argument(format!("translation by ({dx}, {dy})")));
    }
    if dx.fract() == 0.0 && dy.fract() == 0.0 {
        return translate(plane, dx as i64, dy as i64);
    }

    let size = plane.size();
    let buffer = with_pixels!(plane.buffer(), |src| {
        subpixel_kernel(src, size.width, size.height, dx, dy).map(PlaneBuffer::from)
    })?;
    plane.replace_buffer(size, buffer)?;
    Ok(())
}

fn shift_kernel<T: PixelType>(
    src: &[T],
    width: usize,
    height: usize,
    dx: i64,
    dy: i64,
) -> Result<Vec<T>, ImageError> {
    // no source pixel survives; below this |dx| < width and |dy| < height
    if dx.unsigned_abs() >= width as u64 || dy.unsigned_abs() >= height as u64 {
        return allocator::try_vec_filled(allocator::checked_len(width, height)?, T::default());
    }
    let (w, h) = (width as i64, height as i64);
    parallel::build_rows(width, height, T::default(), |y, dst_row| {
        let src_y = y as i64 - dy;
        if src_y < 0 || src_y >= h {
            return Ok(());
        }
        let src_row = &src[src_y as usize * width..(src_y as usize + 1) * width];
        let n = (w - dx.abs()) as usize;
        if dx >= 0 {
            dst_row[dx as usize..].copy_from_slice(&src_row[..n]);
        } else {
            dst_row[..n].copy_from_slice(&src_row[dx.unsigned_abs() as usize..]);
        }
        Ok(())
    })
}

fn subpixel_kernel<T: PixelType>(
    src: &[T],
    width: usize,
    height: usize,
    dx: f64,
    dy: f64,
) -> Result<Vec<T>, ImageError> {
    parallel::build_rows(width, height, T::default(), |y, dst_row| {
        let v = y as f64 - dy;
        for (x, dst_pixel) in dst_row.iter_mut().enumerate() {
            let u = x as f64 - dx;
            *dst_pixel = T::from_f64_round(bilinear_zero_border(src, width, height, u, v));
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_translate_out_of_range() -> Result<(), ImageError> {
        let mut plane = Plane::from_vec([2, 2].into(), vec![1i32, 2, 3, 4])?;
        translate(&mut plane, 5, 0)?;
        assert_eq!(plane.as_slice::<i32>()?, &[0; 4]);
        Ok(())
    }

    #[test]
    fn test_translate_extreme_shifts() -> Result<(), ImageError> {
        let mut plane = Plane::from_vec([2, 2].into(), vec![1u8, 2, 3, 4])?;
        translate(&mut plane, i64::MIN, 0)?;
        assert_eq!(plane.as_slice::<u8>()?, &[0; 4]);

        let mut plane = Plane::from_vec([2, 2].into(), vec![1u8, 2, 3, 4])?;
        translate(&mut plane, 0, i64::MIN)?;
        assert_eq!(plane.as_slice::<u8>()?, &[0; 4]);

        // saturates to i64::MIN on the whole-pixel path
        let mut plane = Plane::from_vec([2, 2].into(), vec![1u8, 2, 3, 4])?;
        translate_subpixel(&mut plane, -1e300, 0.0)?;
        assert_eq!(plane.as_slice::<u8>()?, &[0; 4]);

        let mut plane = Plane::from_vec([2, 2].into(), vec![1u8, 2, 3, 4])?;
        translate(&mut plane, i64::MAX, i64::MAX)?;
        assert_eq!(plane.as_slice::<u8>()?, &[0; 4]);
        Ok(())
    }

    #[test]
    fn test_translate_negative_x() -> Result<(), ImageError> {
        let mut plane = Plane::from_vec([4, 1].into(), vec![1u16, 2, 3, 4])?;
        translate(&mut plane, -1, 0)?;
        assert_eq!(plane.as_slice::<u16>()?, &[2, 3, 4, 0]);
        Ok(())
    }

    #[test]
    fn test_translate_subpixel_half() -> Result<(), ImageError> {
        let mut plane = Plane::from_vec([4, 1].into(), vec![0.0f64, 10.0, 20.0, 30.0])?;
        translate_subpixel(&mut plane, 0.5, 0.0)?;
        let out = plane.as_slice::<f64>()?;
        // the exposed first cell only sees half of the first source pixel
        assert_relative_eq!(out[0], 0.0);
        assert_relative_eq!(out[1], 5.0);
        assert_relative_eq!(out[2], 15.0);
        assert_relative_eq!(out[3], 25.0);
        Ok(())
    }

    #[test]
    fn test_translate_subpixel_whole_matches_exact() -> Result<(), ImageError> {
        let data: Vec<u8> = (0..16).collect();
        let mut a = Plane::from_vec([4, 4].into(), data.clone())?;
        let mut b = Plane::from_vec([4, 4].into(), data)?;
        translate(&mut a, 1, 2)?;
        translate_subpixel(&mut b, 1.0, 2.0)?;
        assert_eq!(a.buffer(), b.buffer());
        Ok(())
    }
}
