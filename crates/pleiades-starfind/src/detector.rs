use pleiades_image::Plane;
use pleiades_imgproc::convert::to_physical;

use crate::{
    config::DetectorParams, error::StarFindError, noise::sigma_clipped_stats,
    source::DetectedSource,
};

// visiting order of the bright walk, first maximum wins
const NEIGHBOURS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

// row above, row below, left column, right column
const SIDES: [[(isize, isize); 3]; 4] = [
    [(-1, -1), (0, -1), (1, -1)],
    [(-1, 1), (0, 1), (1, 1)],
    [(-1, -1), (-1, 0), (-1, 1)],
    [(1, -1), (1, 0), (1, 1)],
];

#[derive(Clone, Copy, Debug)]
struct Noise {
    mean: f64,
    sigma: f64,
}

#[derive(Default, Debug)]
struct ScanCounters {
    candidates: usize,
    duplicates: usize,
    bad_radius: usize,
    off_region: usize,
}

/// Private float copy of the scanned plane.
struct Scratch {
    data: Vec<f64>,
    width: usize,
    height: usize,
}

impl Scratch {
    #[inline]
    fn at(&self, x: usize, y: usize) -> f64 {
        self.data[y * self.width + x]
    }

    fn row(&self, y: usize) -> &[f64] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    #[inline]
    fn offset(&self, x: usize, y: usize, dx: isize, dy: isize) -> Option<(usize, usize)> {
        let x = x.checked_add_signed(dx)?;
        let y = y.checked_add_signed(dy)?;
        (x < self.width && y < self.height).then_some((x, y))
    }

    fn global_noise(&self, params: &DetectorParams) -> Noise {
        let side = params.noise_window.min(self.width).min(self.height);
        let (x0, y0) = ((self.width - side) / 2, (self.height - side) / 2);

        let mut samples = Vec::with_capacity(side * side);
        for y in y0..y0 + side {
            samples.extend_from_slice(&self.row(y)[x0..x0 + side]);
        }

        let (mean, sigma) =
            sigma_clipped_stats(&samples, params.clip_kappa, params.clip_iterations);
        Noise { mean, sigma }
    }

    fn strip_noise(&self, x: usize, y: usize, params: &DetectorParams) -> Noise {
        let start = x.saturating_sub(params.window_size / 2);
        let end = (start + params.window_size).min(self.width);
        let (mean, sigma) = sigma_clipped_stats(
            &self.row(y)[start..end],
            params.clip_kappa,
            params.clip_iterations,
        );
        Noise { mean, sigma }
    }

    fn fill_border(&mut self, border: usize, value: f64) {
        let (width, height) = (self.width, self.height);
        for (y, row) in self.data.chunks_exact_mut(width).enumerate() {
            if y < border || y >= height - border {
                row.fill(value);
            } else {
                row[..border].fill(value);
                row[width - border..].fill(value);
            }
        }
    }

    // a smooth profile has at least one full side of neighbours above threshold
    fn has_full_side(&self, x: usize, y: usize, threshold: f64) -> bool {
        SIDES.iter().any(|side| {
            side.iter().all(|&(dx, dy)| {
                self.offset(x, y, dx, dy)
                    .is_some_and(|(nx, ny)| self.at(nx, ny) > threshold)
            })
        })
    }

    fn walk(&self, x: usize, y: usize, max_walk: usize) -> (usize, usize) {
        let (mut px, mut py) = (x, y);
        loop {
            let mut best = (px, py);
            let mut best_value = self.at(px, py);
            for &(dx, dy) in NEIGHBOURS.iter() {
                let Some((nx, ny)) = self.offset(px, py, dx, dy) else {
                    continue;
                };
                let v = self.at(nx, ny);
                if v > best_value {
                    best = (nx, ny);
                    best_value = v;
                }
            }
            if best == (px, py) || best.0.abs_diff(x) > max_walk || best.1.abs_diff(y) > max_walk
            {
                return (px, py);
            }
            (px, py) = best;
        }
    }

    // mean of the square ring at chebyshev distance `r`, 0 if it lies outside
    fn ring_mean(&self, px: usize, py: usize, r: usize) -> f64 {
        let r = r as isize;
        let (mut sum, mut count) = (0.0, 0usize);
        for dy in -r..=r {
            let step = if dy.abs() == r { 1 } else { 2 * r as usize };
            for dx in (-r..=r).step_by(step) {
                if let Some((x, y)) = self.offset(px, py, dx, dy) {
                    sum += self.at(x, y);
                    count += 1;
                }
            }
        }
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }

    fn radius(&self, px: usize, py: usize, noise: Noise, limit: usize) -> Option<usize> {
        (1..=limit).find(|&r| self.ring_mean(px, py, r) - noise.mean <= noise.sigma)
    }

    fn centroid(&self, px: usize, py: usize) -> (f64, f64) {
        let c = self.at(px, py);
        let along = |a: Option<(usize, usize)>, b: Option<(usize, usize)>| match (a, b) {
            (Some(l), Some(r)) => vertex(self.at(l.0, l.1), c, self.at(r.0, r.1)),
            _ => 0.0,
        };
        let dx = along(self.offset(px, py, -1, 0), self.offset(px, py, 1, 0));
        let dy = along(self.offset(px, py, 0, -1), self.offset(px, py, 0, 1));
        (px as f64 + dx, py as f64 + dy)
    }

    fn flux(&self, px: usize, py: usize, radius: usize, background: f64) -> f64 {
        let (x0, x1) = (px.saturating_sub(radius), (px + radius).min(self.width - 1));
        let (y0, y1) = (py.saturating_sub(radius), (py + radius).min(self.height - 1));
        (y0..=y1)
            .flat_map(|y| self.row(y)[x0..=x1].iter())
            .filter(|&&v| v > background)
            .map(|&v| v - background)
            .sum()
    }
}

// offset of the parabola vertex through (-1, l), (0, c), (1, r)
#[inline]
fn vertex(l: f64, c: f64, r: f64) -> f64 {
    let denom = l - 2.0 * c + r;
    if denom == 0.0 {
        0.0
    } else {
        0.5 * (l - r) / denom
    }
}

/// Find point sources in a plane.
///
/// The plane is copied into a private buffer of physical values clamped at
/// [`DetectorParams::saturation`]; the plane itself is never modified. The
/// scan runs sequentially over the rows inside the border, so detections are
/// reported in scan order of their first candidate pixel.
///
/// For every candidate above the local threshold the detector walks uphill to
/// the local peak, drops peaks within [`DetectorParams::min_separation`] of an
/// accepted source, measures the radius where the profile meets the local
/// background, fits a parabolic sub-pixel centroid and integrates the
/// background-subtracted flux.
///
/// # Arguments
///
/// * `plane` - The plane to scan.
/// * `params` - The detector parameters.
///
/// # Returns
///
/// The detected sources with their magnitudes filled in.
///
/// # Errors
///
/// Returns [`StarFindError::InvalidParameters`] if `params` fails
/// [`DetectorParams::validate`], or an image error if the working buffer
/// cannot be allocated.
///
/// # Example
///
/// ```
/// use pleiades_image::Plane;
/// use pleiades_starfind::{find_stars, DetectorParams};
///
/// let plane = Plane::from_size_val([64, 64].into(), 100u16).unwrap();
/// let stars = find_stars(&plane, &DetectorParams::default()).unwrap();
///
/// assert!(stars.is_empty());
/// ```
pub fn find_stars(
    plane: &Plane,
    params: &DetectorParams,
) -> Result<Vec<DetectedSource>, StarFindError> {
    params.validate()?;

    let (width, height) = (plane.width(), plane.height());
    let border = params.border.max(1);
    if width <= 2 * border || height <= 2 * border {
        log::debug!("plane {} leaves nothing to scan inside a {border} pixel border", plane.size());
        return Ok(Vec::new());
    }

    let mut data = to_physical(plane)?;
    for v in data.iter_mut() {
        *v = if v.is_nan() { 0.0 } else { v.min(params.saturation) };
    }
    let mut scratch = Scratch {
        data,
        width,
        height,
    };

    let global = scratch.global_noise(params);
    log::debug!(
        "global noise: mean {:.3}, sigma {:.3}",
        global.mean,
        global.sigma
    );
    scratch.fill_border(border, global.mean);

    let (x_end, y_end) = (width - border, height - border);
    let mut counters = ScanCounters::default();
    let mut peaks: Vec<(usize, usize)> = Vec::new();
    let mut sources = Vec::new();
    let mut local = global;

    for y in border..y_end {
        for x in border..x_end {
            if (x - border) % params.window_stride == 0 {
                local = scratch.strip_noise(x, y, params);
            }

            let threshold = local.mean + params.significance * local.sigma;
            let value = scratch.at(x, y);
            if value <= threshold
                || value <= params.min_peak
                || !scratch.has_full_side(x, y, threshold)
            {
                continue;
            }
            counters.candidates += 1;

            let (px, py) = scratch.walk(x, y, params.max_walk);
            let duplicate = peaks.iter().any(|&(sx, sy)| {
                sx.abs_diff(px) <= params.min_separation && sy.abs_diff(py) <= params.min_separation
            });
            if duplicate {
                counters.duplicates += 1;
                continue;
            }

            let radius = match scratch.radius(px, py, local, params.max_radius) {
                Some(r) if r >= params.min_radius => r,
                _ => {
                    counters.bad_radius += 1;
                    continue;
                }
            };

            let (cx, cy) = scratch.centroid(px, py);
            let inside = |c: f64, end: usize| c >= border as f64 && c < end as f64;
            if !inside(cx, x_end) || !inside(cy, y_end) {
                counters.off_region += 1;
                continue;
            }

            let flux_limit = 2 * params.max_radius;
            let flux_radius = scratch
                .radius(px, py, local, flux_limit)
                .unwrap_or(flux_limit);
            let flux = scratch.flux(px, py, flux_radius, local.mean);

            log::trace!("source at ({cx:.2}, {cy:.2}) radius {radius} flux {flux:.1}");
            peaks.push((px, py));
            sources.push(DetectedSource::new(
                cx,
                cy,
                radius,
                scratch.at(px, py),
                flux,
            ));
        }
    }

    sources.iter_mut().for_each(DetectedSource::update_magnitude);

    log::debug!(
        "star scan: {} candidates, {} duplicates, {} radius rejects, {} off region, {} accepted",
        counters.candidates,
        counters.duplicates,
        counters.bad_radius,
        counters.off_region,
        sources.len()
    );

    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pleiades_image::ImageError;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn noisy_plane(
        width: usize,
        height: usize,
        seed: u64,
        extra: impl Fn(usize, usize) -> f64,
    ) -> Result<Plane, ImageError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let data: Vec<f32> = (0..width * height)
            .map(|i| {
                let noise = rng.random_range(-10.0f64..10.0);
                (100.0 + noise + extra(i % width, i / width)) as f32
            })
            .collect();
        Plane::from_vec([width, height].into(), data)
    }

    fn gaussian(cx: f64, cy: f64, amplitude: f64) -> impl Fn(usize, usize) -> f64 {
        move |x, y| {
            let r2 = (x as f64 - cx).powi(2) + (y as f64 - cy).powi(2);
            amplitude * (-r2 / 4.5).exp()
        }
    }

    #[test]
    fn test_vertex() {
        assert_relative_eq!(vertex(0.0, 1.0, 1.0), 0.5);
        assert_relative_eq!(vertex(1.0, 2.0, 1.0), 0.0);
        assert_eq!(vertex(3.0, 3.0, 3.0), 0.0);
    }

    #[test]
    fn test_walk_reaches_peak() -> Result<(), StarFindError> {
        let plane = noisy_plane(48, 48, 3, gaussian(30.0, 20.0, 800.0))?;
        let scratch = Scratch {
            data: to_physical(&plane)?,
            width: 48,
            height: 48,
        };
        assert_eq!(scratch.walk(27, 18, 50), (30, 20));
        // walk stops before leaving the allowed box
        assert_eq!(scratch.walk(26, 20, 2), (28, 20));
        Ok(())
    }

    #[test]
    fn test_hot_pixel_is_ignored() -> Result<(), StarFindError> {
        let plane = noisy_plane(64, 64, 5, |x, y| if (x, y) == (30, 33) { 5000.0 } else { 0.0 })?;
        assert!(find_stars(&plane, &DetectorParams::default())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_saturation_clamps_peak() -> Result<(), StarFindError> {
        let plane = noisy_plane(64, 64, 7, gaussian(32.0, 32.0, 5000.0))?;
        let params = DetectorParams {
            saturation: 2000.0,
            ..Default::default()
        };
        let stars = find_stars(&plane, &params)?;
        assert_eq!(stars.len(), 1);
        assert_eq!(stars[0].peak, 2000.0);
        // the walk stops on the first pixel of the flat top
        assert!((stars[0].x - 32.0).abs() <= 2.5);
        assert!((stars[0].y - 32.0).abs() <= 2.5);
        Ok(())
    }

    #[test]
    fn test_star_in_border_is_ignored() -> Result<(), StarFindError> {
        let plane = noisy_plane(64, 64, 9, gaussian(4.0, 30.0, 1000.0))?;
        assert!(find_stars(&plane, &DetectorParams::default())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_small_plane_and_invalid_params() -> Result<(), StarFindError> {
        let plane = noisy_plane(20, 40, 1, |_, _| 0.0)?;
        assert!(find_stars(&plane, &DetectorParams::default())?.is_empty());

        let params = DetectorParams {
            window_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            find_stars(&plane, &params),
            Err(StarFindError::InvalidParameters(_))
        ));
        Ok(())
    }
}
