use pleiades_image::{
    allocator, with_pixels, Calibration, ImageError, PixelType, Plane, RenderParams,
    TransferFunction,
};

use crate::parallel;

// steepness of the logistic curve
const SIGMOID_GAIN: f64 = 10.0;

#[inline]
fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-SIGMOID_GAIN * (x - 0.5)).exp())
}

/// Evaluate a transfer curve on a normalized value in `[0, 1]`.
///
/// `exponent` is only used by [`TransferFunction::Gamma`].
pub fn transfer(function: TransferFunction, exponent: f64, x: f64) -> f64 {
    match function {
        TransferFunction::Linear => x,
        TransferFunction::Gamma => x.powf(1.0 / exponent),
        TransferFunction::Log => (1.0 + 9.0 * x).log10(),
        TransferFunction::Sqrt => x.sqrt(),
        TransferFunction::Square => x * x,
        TransferFunction::Cbrt => x.cbrt(),
        TransferFunction::Sigmoid => {
            let (lo, hi) = (logistic(0.0), logistic(1.0));
            (logistic(x) - lo) / (hi - lo)
        }
    }
}

/// Map the calibrated pixels of a plane to 8-bit display levels.
///
/// Uses the plane's [`RenderParams`]. For each physical value `v`, with black
/// point `B` and white point `W`:
///
/// - `B == W` gives 0
/// - `v <= B` gives 0 and `v >= W` gives 255
/// - otherwise `round(f((v - B) / (W - B)) * 255)` with `f` the transfer curve
///
/// Inverting flips every level with `255 ^ level`.
///
/// # Arguments
///
/// * `plane` - The plane to render.
/// * `dst` - The output bytes, one per pixel in row-major order.
///
/// # Errors
///
/// Returns [`ImageError::InvalidDataLength`] if `dst` does not hold one byte
/// per pixel, and [`ImageError::Argument`] for a non-positive gamma exponent.
///
/// # Example
///
/// ```
/// use pleiades_image::Plane;
/// use pleiades_imgproc::render::render_to_bytes;
///
/// let mut plane = Plane::from_vec([4, 1].into(), vec![0u16, 100, 150, 300]).unwrap();
/// plane.render_params_mut().black = 100.0;
/// plane.render_params_mut().white = 200.0;
///
/// let mut bytes = [0u8; 4];
/// render_to_bytes(&plane, &mut bytes).unwrap();
///
/// assert_eq!(bytes, [0, 0, 128, 255]);
/// ```
pub fn render_to_bytes(plane: &Plane, dst: &mut [u8]) -> Result<(), ImageError> {
    if dst.len() != plane.num_pixels() {
        return Err(ImageError::InvalidDataLength(dst.len(), plane.num_pixels()));
    }

    let params = *plane.render_params();
    if params.transfer == TransferFunction::Gamma
        && (params.exponent.is_nan() || params.exponent <= 0.0)
    {
        return Err(ImageError::Argument(format!(
            "gamma exponent must be positive, got {}",
            params.exponent
        )));
    }

    let calibration = plane.calibration();
    let exponent = params.exponent;

    // one monomorphized kernel per transfer curve
    match params.transfer {
        TransferFunction::Linear => render(plane, dst, calibration, &params, |x| x),
        TransferFunction::Gamma => {
            let inv_gamma = 1.0 / exponent;
            render(plane, dst, calibration, &params, move |x| x.powf(inv_gamma))
        }
        TransferFunction::Log => render(plane, dst, calibration, &params, |x| {
            transfer(TransferFunction::Log, exponent, x)
        }),
        TransferFunction::Sqrt => render(plane, dst, calibration, &params, f64::sqrt),
        TransferFunction::Square => render(plane, dst, calibration, &params, |x| x * x),
        TransferFunction::Cbrt => render(plane, dst, calibration, &params, f64::cbrt),
        TransferFunction::Sigmoid => render(plane, dst, calibration, &params, |x| {
            transfer(TransferFunction::Sigmoid, exponent, x)
        }),
    }
}

/// Render a plane into a newly allocated byte buffer.
///
/// See [`render_to_bytes`].
///
/// # Errors
///
/// Returns [`ImageError::Allocation`] if the buffer cannot be allocated, or
/// the errors of [`render_to_bytes`].
pub fn render_to_vec(plane: &Plane) -> Result<Vec<u8>, ImageError> {
    let mut dst = allocator::try_vec_filled(plane.num_pixels(), 0u8)?;
    render_to_bytes(plane, &mut dst)?;
    Ok(dst)
}

fn render<F>(
    plane: &Plane,
    dst: &mut [u8],
    calibration: Calibration,
    params: &RenderParams,
    f: F,
) -> Result<(), ImageError>
where
    F: Fn(f64) -> f64 + Sync,
{
    with_pixels!(plane.buffer(), |src| render_kernel(src, dst, calibration, params, &f))
}

fn render_kernel<T, F>(
    src: &[T],
    dst: &mut [u8],
    calibration: Calibration,
    params: &RenderParams,
    f: &F,
) -> Result<(), ImageError>
where
    T: PixelType,
    F: Fn(f64) -> f64 + Sync,
{
    let (black, white) = (params.black, params.white);
    let range = white - black;
    let mask = if params.invert { u8::MAX } else { 0 };

    parallel::for_each_partition(dst, 1, |pixels, dst_chunk| {
        for (d, s) in dst_chunk.iter_mut().zip(&src[pixels]) {
            let v = calibration.apply(s.to_f64());
            let level = if black == white || v <= black {
                0
            } else if v >= white {
                u8::MAX
            } else {
                (f((v - black) / range) * 255.0).round() as u8
            };
            *d = level ^ mask;
        }
        Ok(())
    })
}
