use pleiades_image::{allocator, with_pixels, Calibration, ImageError, PixelType, Plane};

use crate::parallel;

/// Copy a plane into a new buffer of calibrated `f64` values.
///
/// # Arguments
///
/// * `plane` - The input plane.
///
/// # Returns
///
/// The physical values in row-major order.
///
/// # Errors
///
/// Returns [`ImageError::Allocation`] if the buffer cannot be allocated.
///
/// # Example
///
/// ```
/// use pleiades_image::{Calibration, Plane};
/// use pleiades_imgproc::convert::to_physical;
///
/// let mut plane = Plane::from_vec([2, 1].into(), vec![10u8, 20]).unwrap();
/// plane.set_calibration(Calibration::new(0.5, 1.0));
///
/// assert_eq!(to_physical(&plane).unwrap(), vec![6.0, 11.0]);
/// ```
pub fn to_physical(plane: &Plane) -> Result<Vec<f64>, ImageError> {
    let mut dst = allocator::try_vec_filled(plane.num_pixels(), 0.0f64)?;
    let calibration = plane.calibration();
    with_pixels!(plane.buffer(), |src| physical_kernel(src, &mut dst, calibration))?;
    Ok(dst)
}

fn physical_kernel<T: PixelType>(
    src: &[T],
    dst: &mut [f64],
    calibration: Calibration,
) -> Result<(), ImageError> {
    parallel::for_each_partition(dst, 1, |range, dst_chunk| {
        if calibration.is_identity() {
            for (d, s) in dst_chunk.iter_mut().zip(&src[range]) {
                *d = s.to_f64();
            }
        } else {
            for (d, s) in dst_chunk.iter_mut().zip(&src[range]) {
                *d = calibration.apply(s.to_f64());
            }
        }
        Ok(())
    })
}
