// reference: https://www.strchr.com/standard_deviation_in_one_pass
use pleiades_image::{with_pixels, Calibration, PixelType, Plane};

use crate::parallel;

#[derive(Clone, Copy, Default)]
struct Moments {
    sum: f64,
    sq_sum: f64,
    count: usize,
}

#[derive(Clone, Copy)]
struct Extrema {
    min: f64,
    max: f64,
}

impl Default for Extrema {
    fn default() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

fn moments_kernel<T: PixelType>(data: &[T], calibration: Calibration) -> Moments {
    let partials = parallel::map_partitions(data.len(), |range| {
        data[range]
            .iter()
            .map(|v| calibration.apply(v.to_f64()))
            .fold(Moments::default(), |acc, v| Moments {
                sum: acc.sum + v,
                sq_sum: acc.sq_sum + v * v,
                count: acc.count + 1,
            })
    });
    partials.iter().fold(Moments::default(), |acc, p| Moments {
        sum: acc.sum + p.sum,
        sq_sum: acc.sq_sum + p.sq_sum,
        count: acc.count + p.count,
    })
}

fn extrema_kernel<T: PixelType>(data: &[T], calibration: Calibration) -> Extrema {
    let partials = parallel::map_partitions(data.len(), |range| {
        data[range]
            .iter()
            .map(|v| calibration.apply(v.to_f64()))
            .fold(Extrema::default(), |acc, v| Extrema {
                min: acc.min.min(v),
                max: acc.max.max(v),
            })
    });
    partials.iter().fold(Extrema::default(), |acc, p| Extrema {
        min: acc.min.min(p.min),
        max: acc.max.max(p.max),
    })
}

/// Compute the minimum and maximum physical values in one pass.
///
/// Both values are cached on the plane until its next mutation. An empty
/// plane reports `(0.0, 0.0)`.
///
/// # Example
///
/// ```
/// use pleiades_image::Plane;
/// use pleiades_imgproc::stats::min_max;
///
/// let plane = Plane::from_vec([2, 2].into(), vec![3u16, 9, 1, 4]).unwrap();
///
/// assert_eq!(min_max(&plane), (1.0, 9.0));
/// ```
pub fn min_max(plane: &Plane) -> (f64, f64) {
    let cache = plane.stats();
    if let (Some(min), Some(max)) = (cache.min(), cache.max()) {
        return (min, max);
    }

    let (min, max) = if plane.is_empty() {
        (0.0, 0.0)
    } else {
        let calibration = plane.calibration();
        let extrema = with_pixels!(plane.buffer(), |data| extrema_kernel(data, calibration));
        (extrema.min, extrema.max)
    };
    cache.set_extrema(min, max);
    (min, max)
}

/// Compute the mean and the population standard deviation of the physical
/// values in one pass.
///
/// Both values are cached on the plane until its next mutation. An empty
/// plane reports `(0.0, 0.0)`.
pub fn mean_stdev(plane: &Plane) -> (f64, f64) {
    let cache = plane.stats();
    if let (Some(mean), Some(stdev)) = (cache.mean(), cache.stdev()) {
        return (mean, stdev);
    }

    let (mean, stdev) = if plane.is_empty() {
        (0.0, 0.0)
    } else {
        let calibration = plane.calibration();
        let moments = with_pixels!(plane.buffer(), |data| moments_kernel(data, calibration));
        let n = moments.count as f64;
        let mean = moments.sum / n;
        let variance = (moments.sq_sum / n - mean * mean).max(0.0);
        (mean, variance.sqrt())
    };
    log::debug!(
        "statistics of {} plane: mean {mean}, stdev {stdev}",
        plane.size()
    );
    cache.set_moments(mean, stdev);
    (mean, stdev)
}

/// The minimum physical value.
pub fn min_value(plane: &Plane) -> f64 {
    min_max(plane).0
}

/// The maximum physical value.
pub fn max_value(plane: &Plane) -> f64 {
    min_max(plane).1
}

/// The mean physical value.
pub fn mean_value(plane: &Plane) -> f64 {
    mean_stdev(plane).0
}

/// The population standard deviation of the physical values.
pub fn stdev_value(plane: &Plane) -> f64 {
    mean_stdev(plane).1
}

/// The sum of the physical values. Not cached.
pub fn sum(plane: &Plane) -> f64 {
    let calibration = plane.calibration();
    with_pixels!(plane.buffer(), |data| moments_kernel(data, calibration)).sum
}
