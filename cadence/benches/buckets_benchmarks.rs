use std::hint::black_box;

use cadence::config::Configuration;
use cadence::{DEFAULT_BIN_COUNT, Event, Millis, Session, aggregate, compute_with_trace};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

/// Type a passage with every 7th character wrong and every 20th deleted and retyped
fn finished_session(words: usize) -> Session {
    let passage = vec!["algorithm"; words];
    let target = passage.join(" ");
    let mut session = Session::new(passage).expect("passage is not empty");
    let mut typed = String::new();
    let mut now: Millis = 0;

    for (i, char) in target.chars().enumerate() {
        if i % 20 == 19 {
            typed.push('q');
            session = session.apply(Event::input(typed.clone(), now));
            typed.pop();
            now += 120;
            session = session.apply(Event::input(typed.clone(), now));
            now += 120;
        }

        typed.push(if i % 7 == 3 { 'z' } else { char });
        session = session.apply(Event::input(typed.clone(), now));
        now += 160;
    }

    session
}

fn benchmark_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");
    let config = Configuration::default();

    for words in [25, 100, 500] {
        let session = finished_session(words);
        let request = session.completion().expect("session is finished");
        let record = compute_with_trace(
            &request.target_text(),
            &request.input_text,
            request.start_timestamp_ms,
            request.end_timestamp_ms,
            &request.sample_trace,
            &config,
        );

        for bins in [DEFAULT_BIN_COUNT, 100] {
            group.bench_with_input(
                BenchmarkId::new(format!("{bins}_bins"), words),
                &bins,
                |b, &bins| {
                    b.iter(|| {
                        aggregate(
                            black_box(&record),
                            black_box(&request.sample_trace),
                            black_box(bins),
                            black_box(&config),
                        )
                    })
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, benchmark_aggregate);
criterion_main!(benches);
