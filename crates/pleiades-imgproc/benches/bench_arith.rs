use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use pleiades_image::Plane;
use pleiades_imgproc::{arith, stats};

fn bench_arith(c: &mut Criterion) {
    let mut group = c.benchmark_group("Arith");

    for (width, height) in [(512, 512), (2048, 2048), (4096, 4096)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

        let parameter_string = format!("{}x{}", width, height);

        let image_size = [*width, *height].into();
        let lhs = Plane::from_size_val(image_size, 1000u16).unwrap();
        let rhs = Plane::from_size_val(image_size, 17u16).unwrap();

        group.bench_with_input(
            BenchmarkId::new("add_u16", &parameter_string),
            &(&lhs, &rhs),
            |b, i| {
                b.iter_batched(
                    || i.0.clone(),
                    |mut plane| {
                        arith::add(black_box(&mut plane), arith::Operand::Plane(i.1)).unwrap();
                        plane
                    },
                    criterion::BatchSize::LargeInput,
                )
            },
        );

        group.bench_with_input(
            BenchmarkId::new("div_scalar", &parameter_string),
            &lhs,
            |b, i| {
                b.iter_batched(
                    || i.clone(),
                    |mut plane| {
                        arith::div(black_box(&mut plane), arith::Operand::Scalar(3.0)).unwrap();
                        plane
                    },
                    criterion::BatchSize::LargeInput,
                )
            },
        );

        group.bench_with_input(
            BenchmarkId::new("mean_stdev", &parameter_string),
            &lhs,
            |b, i| {
                b.iter_batched(
                    || i.clone(),
                    |plane| black_box(stats::mean_stdev(&plane)),
                    criterion::BatchSize::LargeInput,
                )
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_arith);
criterion_main!(benches);
