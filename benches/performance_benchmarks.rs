use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use readyrs::{form, readiness, trends, WellnessRecord};

/// Performance benchmarks for the scoring engines
///
/// Series sizes cover a single day up to a full year of wellness records.

fn bench_readiness_calculation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Readiness Calculation");
    let calculator = readiness::ReadinessCalculator::new();

    for &days in &[1, 7, 30, 90, 365] {
        let series = create_wellness_series(days);

        group.throughput(Throughput::Elements(days as u64));
        group.bench_with_input(
            BenchmarkId::new("calculate_readiness", days),
            &series,
            |b, series| {
                b.iter(|| calculator.calculate(black_box(series)));
            },
        );
    }

    group.finish();
}

fn bench_form_calculation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Form Calculation");
    let calculator = form::FormCalculator::new();

    for &days in &[1, 7, 30, 90, 365] {
        let series = create_wellness_series(days);

        group.throughput(Throughput::Elements(days as u64));
        group.bench_with_input(
            BenchmarkId::new("calculate_form", days),
            &series,
            |b, series| {
                b.iter(|| calculator.calculate(black_box(series)));
            },
        );
    }

    group.finish();
}

fn bench_metric_trends(c: &mut Criterion) {
    let mut group = c.benchmark_group("Metric Trends");

    for &days in &[30, 365] {
        let series = create_wellness_series(days);

        group.bench_with_input(BenchmarkId::new("metric_trends", days), &series, |b, series| {
            b.iter(|| trends::metric_trends(black_box(series)));
        });
    }

    group.finish();
}

fn bench_wellness_deserialization(c: &mut Criterion) {
    let json = serde_json::to_string(&create_wellness_series(90)).unwrap();

    c.bench_function("deserialize_wellness_90_days", |b| {
        b.iter(|| {
            let records: Vec<WellnessRecord> = serde_json::from_str(black_box(&json)).unwrap();
            records
        });
    });
}

// Helper functions for benchmark data generation

fn create_wellness_series(days: usize) -> Vec<WellnessRecord> {
    (0..days)
        .map(|i| WellnessRecord {
            // Every seventh day has no HRV reading, as with a forgotten wearable
            hrv: (i % 7 != 6).then(|| 48.0 + (i % 11) as f64 * 1.5),
            resting_hr: Some(47.0 + (i % 5) as f64),
            sleep_secs: Some(24000.0 + (i % 9) as f64 * 900.0),
            ctl: Some(35.0 + i as f64 * 0.05),
            atl: Some(30.0 + (i % 10) as f64 * 2.5),
            ..WellnessRecord::new(format!("day-{}", i))
        })
        .collect()
}

criterion_group!(
    benches,
    bench_readiness_calculation,
    bench_form_calculation,
    bench_metric_trends,
    bench_wellness_deserialization
);

criterion_main!(benches);
