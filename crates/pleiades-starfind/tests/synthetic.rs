use pleiades_image::{Calibration, Plane};
use pleiades_starfind::{find_stars, DetectedSource, DetectorParams, StarFindError};
use rand::{rngs::StdRng, Rng, SeedableRng};

const BACKGROUND: f64 = 100.0;
// uniform noise in [-10, 10), sigma ~ 5.8
const NOISE: f64 = 10.0;
const PSF_SIGMA: f64 = 1.5;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Gaussian sources `(x, y, amplitude)` on a uniform-noise background.
fn star_field(width: usize, height: usize, stars: &[(f64, f64, f64)], seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..width * height)
        .map(|i| {
            let (x, y) = ((i % width) as f64, (i / width) as f64);
            let signal: f64 = stars
                .iter()
                .map(|&(sx, sy, amplitude)| {
                    let r2 = (x - sx).powi(2) + (y - sy).powi(2);
                    amplitude * (-r2 / (2.0 * PSF_SIGMA * PSF_SIGMA)).exp()
                })
                .sum();
            BACKGROUND + signal + rng.random_range(-NOISE..NOISE)
        })
        .collect()
}

fn detect(
    width: usize,
    height: usize,
    stars: &[(f64, f64, f64)],
) -> Result<Vec<DetectedSource>, StarFindError> {
    detect_with(width, height, stars, &DetectorParams::default())
}

fn detect_with(
    width: usize,
    height: usize,
    stars: &[(f64, f64, f64)],
    params: &DetectorParams,
) -> Result<Vec<DetectedSource>, StarFindError> {
    let data: Vec<f32> = star_field(width, height, stars, 42)
        .into_iter()
        .map(|v| v as f32)
        .collect();
    let plane = Plane::from_vec([width, height].into(), data)?;
    find_stars(&plane, params)
}

#[test]
fn single_source_is_found() -> Result<(), StarFindError> {
    init_logger();
    let stars = detect(128, 128, &[(64.0, 60.0, 1000.0)])?;

    assert_eq!(stars.len(), 1);
    let star = stars[0];
    assert!((star.x - 64.0).abs() < 1.0, "x = {}", star.x);
    assert!((star.y - 60.0).abs() < 1.0, "y = {}", star.y);
    // peak pixel is background plus amplitude, within the noise
    assert!((star.peak - 1100.0).abs() <= NOISE + 1.0, "peak = {}", star.peak);
    assert!(star.radius >= 2 && star.radius <= 8, "radius = {}", star.radius);
    assert!(star.flux > 10000.0, "flux = {}", star.flux);
    assert!(star.magnitude() < -10.0);
    Ok(())
}

#[test]
fn close_sources_collapse() -> Result<(), StarFindError> {
    init_logger();
    // two resolved peaks 5 px apart, each a distinct walk target
    let pair = [(60.0, 64.0, 1000.0), (65.0, 64.0, 1000.0)];

    let stars = detect_with(128, 128, &pair, &DetectorParams::default())?;
    assert_eq!(stars.len(), 1);

    let params = DetectorParams {
        min_separation: 2,
        ..Default::default()
    };
    let stars = detect_with(128, 128, &pair, &params)?;
    assert_eq!(stars.len(), 2);
    let mut xs: Vec<f64> = stars.iter().map(|s| s.x).collect();
    xs.sort_by(f64::total_cmp);
    assert!((xs[0] - 60.0).abs() < 1.0, "x = {xs:?}");
    assert!((xs[1] - 65.0).abs() < 1.0, "x = {xs:?}");
    Ok(())
}

#[test]
fn separated_sources_are_both_found() -> Result<(), StarFindError> {
    init_logger();
    let stars = detect(128, 128, &[(40.0, 40.0, 1000.0), (90.0, 85.0, 800.0)])?;

    assert_eq!(stars.len(), 2);
    // scan order
    assert!((stars[0].x - 40.0).abs() < 1.0 && (stars[0].y - 40.0).abs() < 1.0);
    assert!((stars[1].x - 90.0).abs() < 1.0 && (stars[1].y - 85.0).abs() < 1.0);
    assert!(stars[0].flux > stars[1].flux);
    assert!(stars[0].magnitude() < stars[1].magnitude());
    Ok(())
}

#[test]
fn pure_noise_has_no_sources() -> Result<(), StarFindError> {
    init_logger();
    assert!(detect(128, 128, &[])?.is_empty());
    Ok(())
}

#[test]
fn calibrated_integer_plane() -> Result<(), StarFindError> {
    init_logger();
    // signed 16-bit codes with the usual unsigned offset
    let codes: Vec<i16> = star_field(96, 96, &[(50.0, 45.0, 3000.0)], 7)
        .into_iter()
        .map(|v| (v.round() - 32768.0) as i16)
        .collect();
    let mut plane = Plane::from_vec([96, 96].into(), codes)?;
    plane.set_calibration(Calibration::new(1.0, 32768.0));

    let stars = find_stars(&plane, &DetectorParams::default())?;
    assert_eq!(stars.len(), 1);
    assert!((stars[0].x - 50.0).abs() < 1.0);
    assert!((stars[0].y - 45.0).abs() < 1.0);
    assert!(stars[0].peak > 3000.0);
    Ok(())
}

#[test]
fn min_peak_rejects_faint_sources() -> Result<(), StarFindError> {
    init_logger();
    let data: Vec<f32> = star_field(128, 128, &[(40.0, 40.0, 1000.0), (90.0, 85.0, 300.0)], 42)
        .into_iter()
        .map(|v| v as f32)
        .collect();
    let plane = Plane::from_vec([128, 128].into(), data)?;
    let params = DetectorParams {
        min_peak: 600.0,
        ..Default::default()
    };

    let stars = find_stars(&plane, &params)?;
    assert_eq!(stars.len(), 1);
    assert!((stars[0].x - 40.0).abs() < 1.0);
    Ok(())
}
