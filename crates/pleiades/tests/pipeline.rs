use pleiades::image::ScalarType;
use pleiades::imgproc::{flip, render, stats};
use pleiades::io::{load, store, MemorySink};
use pleiades::starfind::{find_stars, DetectorParams};
use rand::{rngs::StdRng, Rng, SeedableRng};

const WIDTH: usize = 120;
const HEIGHT: usize = 100;

fn raw_star_field(star: (f64, f64)) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(11);
    (0..WIDTH * HEIGHT)
        .flat_map(|i| {
            let (x, y) = ((i % WIDTH) as f64, (i / WIDTH) as f64);
            let r2 = (x - star.0).powi(2) + (y - star.1).powi(2);
            let v = 500.0 + 2000.0 * (-r2 / 4.5).exp() + rng.random_range(-10.0..10.0);
            (v.round() as u16).to_be_bytes()
        })
        .collect()
}

#[test]
fn load_detect_mirror_store() -> Result<(), Box<dyn std::error::Error>> {
    let raw = raw_star_field((30.0, 55.0));
    let mut plane = load(ScalarType::U16.code(), WIDTH, HEIGHT, 1.0, 0.0, &raw)?;
    assert_eq!(plane.scalar_type(), ScalarType::U16);

    let stars = find_stars(&plane, &DetectorParams::default())?;
    assert_eq!(stars.len(), 1);
    assert!((stars[0].x - 30.0).abs() < 1.0);
    assert!((stars[0].y - 55.0).abs() < 1.0);

    flip::mirror_axis_x(&mut plane)?;
    let stars = find_stars(&plane, &DetectorParams::default())?;
    assert_eq!(stars.len(), 1);
    assert!((stars[0].x - (WIDTH - 1 - 30) as f64).abs() < 1.0);

    let (mean, stdev) = stats::mean_stdev(&plane);
    let levels = plane.render_params().auto_levels(mean, stdev);
    *plane.render_params_mut() = levels;
    let bytes = render::render_to_vec(&plane)?;
    assert_eq!(bytes[55 * WIDTH + WIDTH - 1 - 30], 255);

    let mut sink = MemorySink::new();
    store(&plane, 0, &mut sink)?;
    let stored = sink.plane(0).ok_or("plane 0 was not stored")?;
    let reloaded = load(20, WIDTH, HEIGHT, 1.0, 0.0, &stored.data)?;
    assert_eq!(reloaded.buffer(), plane.buffer());
    Ok(())
}
