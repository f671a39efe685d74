use criterion::{criterion_group, criterion_main, Criterion};
use pleiades_image::{ImageSize, Plane, ScalarType};
use std::hint::black_box;

fn sample_plane() -> Plane {
    Plane::from_size_val(
        ImageSize {
            width: 2048,
            height: 2048,
        },
        1200u16,
    )
    .unwrap()
}

fn bench_plane(c: &mut Criterion) {
    let mut group = c.benchmark_group("Plane");

    for target in [ScalarType::I32, ScalarType::F32, ScalarType::F64] {
        group.bench_function(format!("set_type_u16_{target}"), |b| {
            b.iter_batched(
                sample_plane,
                |mut plane| {
                    black_box(&mut plane).set_type(target).unwrap();
                    plane
                },
                criterion::BatchSize::LargeInput,
            )
        });
    }

    group.bench_function("get_value", |b| {
        let plane = sample_plane();
        b.iter(|| {
            let mut acc = 0.0;
            for y in (0..plane.height()).step_by(16) {
                for x in (0..plane.width()).step_by(16) {
                    acc += plane.get_value(x, y).unwrap();
                }
            }
            black_box(acc)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_plane);
criterion_main!(benches);
