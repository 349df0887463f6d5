use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sleeprs::chronotype::adjust_time_labels;
use sleeprs::export::{export_schedule, ExportFormat};
use sleeprs::schedule::compute_schedule;
use sleeprs::{AgeBand, Chronotype, CycleCalculator, Direction, TimeOfDay};

/// Benchmarks for the schedule engine
///
/// Every anchor of the day is computed so midnight wrap-around paths are
/// covered alongside the common cases.

fn all_anchors(step: i64) -> Vec<TimeOfDay> {
    (0..1440).step_by(step as usize).map(TimeOfDay::from_minutes).collect()
}

fn bench_candidate_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Candidate Generation");
    let anchors = all_anchors(1);
    group.throughput(Throughput::Elements(anchors.len() as u64));

    group.bench_function("bedtimes", |b| {
        b.iter(|| {
            for anchor in &anchors {
                black_box(CycleCalculator::bedtimes(*anchor));
            }
        })
    });
    group.bench_function("best_wake_time", |b| {
        b.iter(|| {
            for anchor in &anchors {
                black_box(CycleCalculator::best_wake_time(*anchor));
            }
        })
    });

    group.finish();
}

fn bench_compute_schedule(c: &mut Criterion) {
    let mut group = c.benchmark_group("Compute Schedule");
    let anchors = all_anchors(15);

    for chronotype in [Chronotype::Early, Chronotype::Intermediate, Chronotype::Late] {
        for direction in [Direction::WakeToBed, Direction::BedToWake] {
            group.throughput(Throughput::Elements(anchors.len() as u64));
            group.bench_with_input(
                BenchmarkId::new(format!("{}", direction), chronotype),
                &anchors,
                |b, anchors| {
                    b.iter(|| {
                        for anchor in anchors {
                            black_box(compute_schedule(*anchor, direction, chronotype, AgeBand::Adult));
                        }
                    })
                },
            );
        }
    }

    group.finish();
}

fn bench_label_filtering(c: &mut Criterion) {
    let mut group = c.benchmark_group("Chronotype Label Filter");

    for &size in &[4usize, 16, 64] {
        let labels: Vec<String> = all_anchors(1440 / size as i64)
            .into_iter()
            .take(size)
            .map(|time| time.to_string())
            .collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("late", size), &labels, |b, labels| {
            b.iter(|| black_box(adjust_time_labels(labels, Chronotype::Late)))
        });
    }

    group.finish();
}

fn bench_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("Rendering");
    let result = compute_schedule(
        TimeOfDay::from_minutes(420),
        Direction::WakeToBed,
        Chronotype::Intermediate,
        AgeBand::Adult,
    );

    for format in [ExportFormat::Table, ExportFormat::Json, ExportFormat::Text, ExportFormat::Csv] {
        group.bench_with_input(BenchmarkId::new("export", format), &result, |b, result| {
            b.iter(|| {
                let mut out = Vec::with_capacity(4096);
                export_schedule(result, format, &mut out).ok();
                black_box(out)
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_candidate_generation,
    bench_compute_schedule,
    bench_label_filtering,
    bench_rendering
);
criterion_main!(benches);
