use chart_engine::downsample::{decimate_points, lttb};
use chart_engine::{Sample, SampleMeta, TimedPoint};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, black_box};

const MINUTE: i64 = 60_000;

/// Minute readings with an annotation roughly every thousand samples and a
/// missing reading every few thousand.
fn withdrawal_samples(n: usize) -> Vec<Sample> {
    (0..n)
        .map(|i| {
            let t = i as i64 * MINUTE;
            if i % 4_001 == 4_000 {
                return Sample::missing(t);
            }
            let s = Sample::value(t, 40.0 + (i as f64 * 0.01).sin() * 10.0);
            if i % 997 == 0 { s.with_meta(SampleMeta::comment("meter read")) } else { s }
        })
        .collect()
}

/// Timed points with a synthetic gap after every 500 readings.
fn gapped_points(n: usize) -> Vec<TimedPoint> {
    let mut out = Vec::with_capacity(n + n / 500);
    for (i, s) in withdrawal_samples(n).iter().enumerate() {
        out.push(TimedPoint::from_sample(s));
        if i % 500 == 499 {
            out.push(TimedPoint::gap(s.timestamp as f64 + 6_000.0));
        }
    }
    out
}

fn bench_decimation(c: &mut Criterion) {
    let mut group = c.benchmark_group("decimation");
    for &n in &[50_000usize, 200_000usize] {
        let samples = withdrawal_samples(n);
        let xy: Vec<(f64, f64)> = samples.iter().filter_map(|s| Some((s.timestamp as f64, s.finite_value()?))).collect();
        let points = gapped_points(n);
        // 2 points per pixel on a 600px and a 1800px chart
        for &target in &[1_200usize, 3_600usize] {
            group.bench_with_input(BenchmarkId::new("lttb_xy", format!("n{n}_t{target}")), &target, |b, &t| {
                b.iter(|| black_box(lttb(&xy, t)));
            });
            group.bench_with_input(BenchmarkId::new("samples", format!("n{n}_t{target}")), &target, |b, &t| {
                b.iter(|| black_box(decimate_points(&samples, t)));
            });
            group.bench_with_input(BenchmarkId::new("gapped_points", format!("n{n}_t{target}")), &target, |b, &t| {
                b.iter(|| black_box(decimate_points(&points, t)));
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_decimation);
criterion_main!(benches);
