use std::hint::black_box;

use cadence::config::Configuration;
use cadence::math::Consistency;
use cadence::{InputTrace, Millis, Recorder, compute_with_trace};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

/// A passage of `words` words and an input with a 10% error rate
fn passage(words: usize) -> (String, String) {
    let target = vec!["keyboard"; words].join(" ");
    let input = target
        .chars()
        .enumerate()
        .map(|(i, char)| if i % 10 == 0 { 'x' } else { char })
        .collect();
    (target, input)
}

fn trace_for(target: &str, input: &str, interval_ms: Millis) -> InputTrace {
    let mut recorder = Recorder::new();
    recorder.start(0);
    let mut typed = String::with_capacity(input.len());

    for (i, char) in input.chars().enumerate() {
        typed.push(char);
        recorder.record_sample(target, &typed, i as Millis * interval_ms);
    }

    recorder.into_trace()
}

fn benchmark_compute(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute");
    let config = Configuration::default();

    for words in [25, 100, 500] {
        let (target, input) = passage(words);
        let trace = trace_for(&target, &input, 150);
        let end = trace.last().map_or(0, |s| s.timestamp_ms);

        group.bench_with_input(
            BenchmarkId::new("with_trace", words),
            &(target.as_str(), input.as_str()),
            |b, &(target, input)| {
                b.iter(|| {
                    compute_with_trace(
                        black_box(target),
                        black_box(input),
                        black_box(0),
                        black_box(end),
                        black_box(&trace),
                        black_box(&config),
                    )
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("without_trace", words),
            &(target.as_str(), input.as_str()),
            |b, &(target, input)| {
                b.iter(|| cadence::compute(black_box(target), black_box(input), 0, black_box(end)))
            },
        );
    }

    group.finish();
}

fn benchmark_recording(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_sample");

    for words in [25, 100] {
        let (target, input) = passage(words);

        group.bench_with_input(BenchmarkId::new("full_session", words), &words, |b, _| {
            b.iter(|| trace_for(black_box(&target), black_box(&input), 150))
        });
    }

    group.finish();
}

fn benchmark_consistency(c: &mut Criterion) {
    let mut group = c.benchmark_group("consistency");

    for count in [10, 100, 1000] {
        let speeds: Vec<f64> = (0..count).map(|i| 40.0 + (i % 7) as f64 * 3.5).collect();

        group.bench_with_input(BenchmarkId::new("calculate", count), &speeds, |b, speeds| {
            b.iter(|| Consistency::calculate(black_box(speeds)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_compute,
    benchmark_recording,
    benchmark_consistency
);
criterion_main!(benches);
