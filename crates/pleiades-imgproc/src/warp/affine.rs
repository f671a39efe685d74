use pleiades_image::{
    allocator, with_pixels, ImageError, ImageSize, PixelType, Plane, PlaneBuffer, TrsParams,
};

use crate::interpolation::bilinear_interpolation;
use crate::parallel;

/// Inverts a 2x3 affine transformation matrix.
///
/// Arguments:
///
/// * `m` - The 2x3 affine transformation matrix.
///
/// Returns:
///
/// The inverted 2x3 affine transformation matrix. A singular matrix inverts
/// to the zero matrix.
pub fn invert_affine_transform(m: &[f64; 6]) -> [f64; 6] {
    let (a, b, c, d, e, f) = (m[0], m[1], m[2], m[3], m[4], m[5]);

    let determinant = a * e - b * d;
    let inv_determinant = if determinant != 0.0 {
        1.0 / determinant
    } else {
        0.0
    };

    let new_a = e * inv_determinant;
    let new_b = -b * inv_determinant;
    let new_d = -d * inv_determinant;
    let new_e = a * inv_determinant;
    let new_c = -(new_a * c + new_b * f);
    let new_f = -(new_d * c + new_e * f);

    [new_a, new_b, new_c, new_d, new_e, new_f]
}

/// Returns a 2x3 rotation matrix for a 2D rotation around a center point.
///
/// The rotation matrix is defined as:
///
/// | alpha  beta  tx |
/// | -beta  alpha ty |
///
/// where:
///
/// alpha = scale * cos(angle)
/// beta = scale * sin(angle)
/// tx = (1 - alpha) * center.x - beta * center.y
/// ty = beta * center.x + (1 - alpha) * center.y
///
/// # Arguments
///
/// * `center` - The center point of the rotation.
/// * `angle` - The angle of rotation in radians.
/// * `scale` - The scale factor.
///
/// # Example
///
/// ```
/// use pleiades_imgproc::warp::{get_rotation_matrix2d, transform_point};
///
/// let m = get_rotation_matrix2d((50.0, 50.0), std::f64::consts::FRAC_PI_2, 1.0);
/// let (u, v) = transform_point(75.0, 50.0, &m);
///
/// assert!((u - 50.0).abs() < 1e-9);
/// assert!((v - 25.0).abs() < 1e-9);
/// ```
pub fn get_rotation_matrix2d(center: (f64, f64), angle: f64, scale: f64) -> [f64; 6] {
    let alpha = scale * angle.cos();
    let beta = scale * angle.sin();

    let tx = (1.0 - alpha) * center.0 - beta * center.1;
    let ty = beta * center.0 + (1.0 - alpha) * center.1;

    [alpha, beta, tx, -beta, alpha, ty]
}

/// Returns the forward 2x3 matrix of a translate-rotate-scale transform.
pub fn get_trs_matrix2d(params: &TrsParams) -> [f64; 6] {
    let mut m = get_rotation_matrix2d(params.center, params.angle, params.scale);
    m[2] += params.translation.0;
    m[5] += params.translation.1;
    m.iter_mut().for_each(|v| *v /= params.pixel_size);
    m
}

/// Applies an affine transformation to a point.
pub fn transform_point(x: f64, y: f64, m: &[f64; 6]) -> (f64, f64) {
    let u = m[0] * x + m[1] * y + m[2];
    let v = m[3] * x + m[4] * y + m[5];
    (u, v)
}

/// Per-pixel flags marking output pixels that map outside the source.
#[derive(Clone, Debug, PartialEq)]
pub struct OutsideMask {
    size: ImageSize,
    data: Vec<bool>,
}

impl OutsideMask {
    /// Create a mask with every pixel flagged as inside.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::Allocation`] if the mask cannot be allocated.
    pub fn new(size: ImageSize) -> Result<Self, ImageError> {
        let data = allocator::try_vec_filled(size.area()?, false)?;
        Ok(Self { size, data })
    }

    /// The size of the mask.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// The flags in row-major order.
    pub fn as_slice(&self) -> &[bool] {
        &self.data
    }

    /// Whether `(x, y)` was flagged as outside, `None` past the mask.
    pub fn is_outside(&self, x: usize, y: usize) -> Option<bool> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        self.data.get(y * self.size.width + x).copied()
    }

    /// Number of pixels flagged as outside.
    pub fn count_outside(&self) -> usize {
        self.data.iter().filter(|&&outside| outside).count()
    }
}

#[inline]
fn is_inside(u: f64, v: f64, width: usize, height: usize) -> bool {
    u >= 0.0 && u < width as f64 && v >= 0.0 && v < height as f64
}

fn warp_kernel<T: PixelType>(
    src: &[T],
    src_size: ImageSize,
    dst_size: ImageSize,
    m_inv: &[f64; 6],
) -> Result<Vec<T>, ImageError> {
    let (width, height) = (src_size.width, src_size.height);
    parallel::build_rows(dst_size.width, dst_size.height, T::default(), |y, dst_row| {
        for (x, dst_pixel) in dst_row.iter_mut().enumerate() {
            let (u, v) = transform_point(x as f64, y as f64, m_inv);
            // check if the position is within the bounds of the src plane
            if is_inside(u, v, width, height) {
                let value = bilinear_interpolation(src, width, height, u, v);
                *dst_pixel = T::from_f64_round(value);
            }
        }
        Ok(())
    })
}

fn warp_plane(plane: &mut Plane, dst_size: ImageSize, m: &[f64; 6]) -> Result<(), ImageError> {
    // invert affine transform matrix to find corresponding positions in src from dst
    let m_inv = invert_affine_transform(m);
    let src_size = plane.size();
    let buffer = with_pixels!(plane.buffer(), |src| {
        warp_kernel(src, src_size, dst_size, &m_inv).map(PlaneBuffer::from)
    })?;
    plane.replace_buffer(dst_size, buffer)?;
    Ok(())
}

/// Rotate a plane around `(origin_x, origin_y)`.
///
/// The output is enlarged to the bounding box of the four rotated corners so
/// no source pixel is lost. Output pixels mapping outside the source are
/// zero. The type and the calibration of the plane are kept; interpolated
/// values are rounded to nearest on integer planes.
///
/// # Arguments
///
/// * `plane` - The plane to rotate, updated in place.
/// * `origin_x` - The x coordinate of the rotation center.
/// * `origin_y` - The y coordinate of the rotation center.
/// * `angle` - The rotation angle in radians.
///
/// # Errors
///
/// Returns [`ImageError::Argument`] if the angle is not finite.
pub fn rotate(
    plane: &mut Plane,
    origin_x: f64,
    origin_y: f64,
    angle: f64,
) -> Result<(), ImageError> {
    if !angle.is_finite() || !origin_x.is_finite() || !origin_y.is_finite() {
        return Err(ImageError::Argument(format!(
            "rotation of {angle} around ({origin_x}, {origin_y})"
        )));
    }

    let mut m = get_rotation_matrix2d((origin_x, origin_y), angle, 1.0);

    let (w, h) = (plane.width() as f64, plane.height() as f64);
    let corners = [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)].map(|(x, y)| transform_point(x, y, &m));
    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for (u, v) in corners {
        min_x = min_x.min(u);
        max_x = max_x.max(u);
        min_y = min_y.min(v);
        max_y = max_y.max(v);
    }

    // absorb rounding noise so a quarter turn keeps the size
    let dst_size = ImageSize {
        width: (max_x - min_x - 1e-9).ceil().max(0.0) as usize,
        height: (max_y - min_y - 1e-9).ceil().max(0.0) as usize,
    };

    // shift so the bounding box starts at the origin
    m[2] -= min_x;
    m[5] -= min_y;

    log::debug!(
        "rotate {} by {angle} rad around ({origin_x}, {origin_y}) -> {dst_size}",
        plane.size()
    );

    warp_plane(plane, dst_size, &m)
}

/// Apply a translate-rotate-scale transform, keeping the plane size.
///
/// This is the alignment primitive used to register one plane onto another.
/// Output pixels mapping outside the source are zero and, when a mask is
/// given, flagged in it. The type and the calibration are kept.
///
/// # Arguments
///
/// * `plane` - The plane to transform, updated in place.
/// * `params` - The transform parameters.
/// * `mask` - Optional mask, of the plane size, receiving the outside flags.
///
/// # Errors
///
/// Returns [`ImageError::Argument`] for a zero or non-finite scale or pixel
/// size, and [`ImageError::DimensionMismatch`] if the mask size differs from
/// the plane size. The plane and the mask are unchanged on error.
///
/// # Example
///
/// ```
/// use pleiades_image::{Plane, TrsParams};
/// use pleiades_imgproc::warp::{transform, OutsideMask};
///
/// let mut plane = Plane::from_vec([3, 1].into(), vec![1.0f32, 2.0, 3.0]).unwrap();
/// let mut mask = OutsideMask::new(plane.size()).unwrap();
///
/// let params = TrsParams { translation: (1.0, 0.0), ..Default::default() };
/// transform(&mut plane, &params, Some(&mut mask)).unwrap();
///
/// assert_eq!(plane.as_slice::<f32>().unwrap(), &[0.0, 1.0, 2.0]);
/// assert_eq!(mask.as_slice(), &[true, false, false]);
/// ```
pub fn transform(
    plane: &mut Plane,
    params: &TrsParams,
    mask: Option<&mut OutsideMask>,
) -> Result<(), ImageError> {
    let valid = |v: f64| v.is_finite() && v != 0.0;
    if !valid(params.scale) || !valid(params.pixel_size) || !params.angle.is_finite() {
        return Err(ImageError::Argument(format!("invalid transform {params:?}")));
    }

    let size = plane.size();
    if let Some(mask) = &mask {
        if mask.size() != size {
            return Err(ImageError::DimensionMismatch(
                size.width,
                size.height,
                mask.size().width,
                mask.size().height,
            ));
        }
    }

    let m = get_trs_matrix2d(params);
    let m_inv = invert_affine_transform(&m);

    let flags = match &mask {
        Some(_) => Some(parallel::build_rows(size.width, size.height, false, |y, row| {
            for (x, flag) in row.iter_mut().enumerate() {
                let (u, v) = transform_point(x as f64, y as f64, &m_inv);
                *flag = !is_inside(u, v, size.width, size.height);
            }
            Ok(())
        })?),
        None => None,
    };

    warp_plane(plane, size, &m)?;

    if let (Some(mask), Some(flags)) = (mask, flags) {
        mask.data = flags;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pleiades_image::{Calibration, ScalarType};
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    #[test]
    fn test_invert_affine() {
        let m = get_rotation_matrix2d((3.0, -2.0), 0.7, 1.5);
        let m_inv = invert_affine_transform(&m);
        let (u, v) = transform_point(10.0, 4.0, &m);
        let (x, y) = transform_point(u, v, &m_inv);
        assert_relative_eq!(x, 10.0, epsilon = 1e-9);
        assert_relative_eq!(y, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rotate_quarter_turn() -> Result<(), ImageError> {
        let mut plane = Plane::new([100, 100].into(), ScalarType::F32)?;
        plane.set(75, 50, 1000.0)?;

        rotate(&mut plane, 50.0, 50.0, FRAC_PI_2)?;

        assert_eq!(plane.size(), ImageSize::from([100, 100]));
        assert!(plane.get(50, 25)? > 900.0);
        assert!(plane.get(75, 50)? < 1.0);
        Ok(())
    }

    #[test]
    fn test_rotate_grows_bounding_box() -> Result<(), ImageError> {
        let mut plane = Plane::from_size_val([10, 20].into(), 7u16)?;
        plane.set_calibration(Calibration::new(2.0, 1.0));

        rotate(&mut plane, 5.0, 10.0, FRAC_PI_4)?;
        // 10 cos + 20 sin and 10 sin + 20 cos, both 21.21
        assert_eq!(plane.size(), ImageSize::from([22, 22]));
        assert_eq!(plane.scalar_type(), ScalarType::U16);
        assert_eq!(plane.calibration(), Calibration::new(2.0, 1.0));
        // the corners fall outside the rotated content
        assert_eq!(plane.get(0, 0)?, 0.0);
        assert_eq!(plane.get(11, 11)?, 7.0);
        Ok(())
    }

    #[test]
    fn test_rotate_half_turn() -> Result<(), ImageError> {
        let mut plane = Plane::from_vec([3, 3].into(), (0..9).map(|v| v as f64).collect())?;
        rotate(&mut plane, 1.5, 1.5, PI)?;
        assert_eq!(plane.size(), ImageSize::from([3, 3]));
        // output x samples source 3 - x
        assert_relative_eq!(plane.get(1, 1)?, 8.0, epsilon = 1e-6);
        assert_relative_eq!(plane.get(2, 2)?, 4.0, epsilon = 1e-6);
        Ok(())
    }

    #[test]
    fn test_transform_identity_and_mask() -> Result<(), ImageError> {
        let data: Vec<i16> = (0..20).collect();
        let mut plane = Plane::from_vec([5, 4].into(), data.clone())?;
        let mut mask = OutsideMask::new(plane.size())?;

        transform(&mut plane, &TrsParams::default(), Some(&mut mask))?;
        assert_eq!(plane.as_slice::<i16>()?, data.as_slice());
        assert_eq!(mask.count_outside(), 0);

        let shift = TrsParams {
            translation: (0.0, -2.0),
            ..Default::default()
        };
        transform(&mut plane, &shift, Some(&mut mask))?;
        assert_eq!(&plane.as_slice::<i16>()?[..10], &data[10..]);
        assert_eq!(&plane.as_slice::<i16>()?[10..], &[0; 10]);
        assert_eq!(mask.count_outside(), 10);
        assert_eq!(mask.is_outside(0, 3), Some(true));
        assert_eq!(mask.is_outside(0, 0), Some(false));
        assert_eq!(mask.is_outside(5, 0), None);
        Ok(())
    }

    #[test]
    fn test_transform_scale() -> Result<(), ImageError> {
        let mut plane = Plane::from_vec([4, 1].into(), vec![10.0f64, 20.0, 30.0, 40.0])?;
        let params = TrsParams {
            scale: 2.0,
            ..Default::default()
        };
        transform(&mut plane, &params, None)?;
        // output x samples source x / 2
        assert_eq!(plane.as_slice::<f64>()?, &[10.0, 15.0, 20.0, 25.0]);
        Ok(())
    }

    #[test]
    fn test_transform_invalid() -> Result<(), ImageError> {
        let mut plane = Plane::new([4, 4].into(), ScalarType::U8)?;
        let params = TrsParams {
            scale: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            transform(&mut plane, &params, None),
            Err(ImageError::Argument(_))
        ));

        let mut mask = OutsideMask::new([2, 2].into())?;
        assert_eq!(
            transform(&mut plane, &TrsParams::default(), Some(&mut mask)),
            Err(ImageError::DimensionMismatch(4, 4, 2, 2))
        );
        Ok(())
    }
}
