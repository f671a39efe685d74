use pleiades_image::PixelType;

/// Kernel for bilinear interpolation with clamped neighbours.
///
/// `(u, v)` must lie in `[0, width) x [0, height)`.
///
/// # Arguments
///
/// * `data` - The row-major pixel data.
/// * `width` - The number of columns.
/// * `height` - The number of rows.
/// * `u` - The x coordinate of the pixel to interpolate.
/// * `v` - The y coordinate of the pixel to interpolate.
///
/// # Returns
///
/// The interpolated value of the stored codes.
pub fn bilinear_interpolation<T: PixelType>(
    data: &[T],
    width: usize,
    height: usize,
    u: f64,
    v: f64,
) -> f64 {
    let iu = u.trunc() as usize;
    let iv = v.trunc() as usize;

    let iu0 = iu.min(width - 1);
    let iv0 = iv.min(height - 1);

    let frac_u = u.fract();
    let frac_v = v.fract();

    let frac_uu = 1.0 - frac_u;
    let frac_vv = 1.0 - frac_v;

    let w00 = frac_uu * frac_vv;
    let w01 = frac_u * frac_vv;
    let w10 = frac_uu * frac_v;
    let w11 = frac_u * frac_v;

    let iu1 = if iu0 + 1 < width { iu0 + 1 } else { iu0 };
    let iv1 = if iv0 + 1 < height { iv0 + 1 } else { iv0 };

    let p00 = data[iv0 * width + iu0].to_f64();
    let p01 = data[iv0 * width + iu1].to_f64();
    let p10 = data[iv1 * width + iu0].to_f64();
    let p11 = data[iv1 * width + iu1].to_f64();

    p00 * w00 + p01 * w01 + p10 * w10 + p11 * w11
}

/// Kernel for bilinear interpolation where neighbours outside the plane
/// count as zero.
///
/// Any `(u, v)` is accepted; points farther than one pixel from the plane
/// interpolate to zero.
pub fn bilinear_zero_border<T: PixelType>(
    data: &[T],
    width: usize,
    height: usize,
    u: f64,
    v: f64,
) -> f64 {
    let u0 = u.floor();
    let v0 = v.floor();
    let frac_u = u - u0;
    let frac_v = v - v0;

    let sample = |x: f64, y: f64| -> f64 {
        if x < 0.0 || y < 0.0 || x >= width as f64 || y >= height as f64 {
            return 0.0;
        }
        data[y as usize * width + x as usize].to_f64()
    };

    sample(u0, v0) * (1.0 - frac_u) * (1.0 - frac_v)
        + sample(u0 + 1.0, v0) * frac_u * (1.0 - frac_v)
        + sample(u0, v0 + 1.0) * (1.0 - frac_u) * frac_v
        + sample(u0 + 1.0, v0 + 1.0) * frac_u * frac_v
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bilinear_center() {
        let data = [0u8, 10, 20, 30];
        assert_relative_eq!(bilinear_interpolation(&data, 2, 2, 0.5, 0.5), 15.0);
        assert_relative_eq!(bilinear_interpolation(&data, 2, 2, 1.0, 1.0), 30.0);
        assert_relative_eq!(bilinear_interpolation(&data, 2, 2, 1.5, 0.0), 10.0);
    }

    #[test]
    fn test_bilinear_zero_border() {
        let data = [8.0f64; 4];
        assert_relative_eq!(bilinear_zero_border(&data, 2, 2, 0.0, 0.0), 8.0);
        assert_relative_eq!(bilinear_zero_border(&data, 2, 2, 1.5, 0.0), 4.0);
        assert_relative_eq!(bilinear_zero_border(&data, 2, 2, -0.5, -0.5), 2.0);
        assert_relative_eq!(bilinear_zero_border(&data, 2, 2, 5.0, 0.0), 0.0);
    }
}
