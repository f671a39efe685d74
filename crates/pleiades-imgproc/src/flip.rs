use pleiades_image::{with_pixels, ImageError, PixelType, Plane, PlaneBuffer};

use crate::parallel;

/// Mirror the plane along the x coordinate, reversing every row.
///
/// # Example
///
/// ```
/// use pleiades_image::Plane;
/// use pleiades_imgproc::flip::mirror_axis_x;
///
/// let mut plane = Plane::from_vec([3, 2].into(), vec![0u8, 1, 2, 3, 4, 5]).unwrap();
///
/// mirror_axis_x(&mut plane).unwrap();
///
/// assert_eq!(plane.as_slice::<u8>().unwrap(), &[2, 1, 0, 5, 4, 3]);
/// ```
pub fn mirror_axis_x(plane: &mut Plane) -> Result<(), ImageError> {
    let size = plane.size();
    let buffer = with_pixels!(plane.buffer(), |src| {
        horizontal_kernel(src, size.width, size.height).map(PlaneBuffer::from)
    })?;
    plane.replace_buffer(size, buffer)?;
    Ok(())
}

/// Mirror the plane along the y coordinate, reversing the row order.
///
/// # Example
///
/// ```
/// use pleiades_image::Plane;
/// use pleiades_imgproc::flip::mirror_axis_y;
///
/// let mut plane = Plane::from_vec([3, 2].into(), vec![0u8, 1, 2, 3, 4, 5]).unwrap();
///
/// mirror_axis_y(&mut plane).unwrap();
///
/// assert_eq!(plane.as_slice::<u8>().unwrap(), &[3, 4, 5, 0, 1, 2]);
/// ```
pub fn mirror_axis_y(plane: &mut Plane) -> Result<(), ImageError> {
    let size = plane.size();
    let buffer = with_pixels!(plane.buffer(), |src| {
        vertical_kernel(src, size.width, size.height).map(PlaneBuffer::from)
    })?;
    plane.replace_buffer(size, buffer)?;
    Ok(())
}

fn horizontal_kernel<T: PixelType>(
    src: &[T],
    width: usize,
    height: usize,
) -> Result<Vec<T>, ImageError> {
    parallel::build_rows(width, height, T::default(), |y, dst_row| {
        let src_row = &src[y * width..(y + 1) * width];
        dst_row
            .iter_mut()
            .zip(src_row.iter().rev())
            .for_each(|(d, s)| *d = *s);
        Ok(())
    })
}

fn vertical_kernel<T: PixelType>(
    src: &[T],
    width: usize,
    height: usize,
) -> Result<Vec<T>, ImageError> {
    parallel::build_rows(width, height, T::default(), |y, dst_row| {
        let src_y = height - 1 - y;
        dst_row.copy_from_slice(&src[src_y * width..(src_y + 1) * width]);
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pleiades_image::ScalarType;

    #[test]
    fn test_mirror_twice_is_identity() -> Result<(), ImageError> {
        let data: Vec<f32> = (0..35).map(|i| i as f32 * 1.5).collect();
        for scalar in ScalarType::ALL {
            let mut plane = Plane::from_vec([7, 5].into(), data.clone())?;
            plane.set_type(scalar)?;
            let original = plane.buffer().clone();

            mirror_axis_x(&mut plane)?;
            assert_ne!(plane.buffer(), &original);
            mirror_axis_x(&mut plane)?;
            assert_eq!(plane.buffer(), &original);

            mirror_axis_y(&mut plane)?;
            mirror_axis_y(&mut plane)?;
            assert_eq!(plane.buffer(), &original);
        }
        Ok(())
    }

    #[test]
    fn test_mirror_y_odd_rows() -> Result<(), ImageError> {
        let mut plane = Plane::from_vec([1, 3].into(), vec![1i64, 2, 3])?;
        mirror_axis_y(&mut plane)?;
        assert_eq!(plane.as_slice::<i64>()?, &[3, 2, 1]);
        Ok(())
    }
}
