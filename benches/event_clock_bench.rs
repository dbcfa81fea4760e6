use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use park_sim::events::{EventClock, EventKind};
use park_sim::rng::Pcg32;

const EVENT_COUNTS: &[usize] = &[128, 1_024, 8_192, 65_536];

fn build_times(count: usize) -> Vec<f64> {
    let mut rng = Pcg32::seeded(3);
    (0..count).map(|_| rng.uniform01() * 1_000.0).collect()
}

fn kind_for(idx: usize) -> EventKind {
    match idx % 4 {
        0 => EventKind::Arrival,
        1 => EventKind::EntryComplete,
        2 => EventKind::ExitStart,
        _ => EventKind::ExitComplete,
    }
}

fn bench_event_clock(c: &mut Criterion) {
    let mut group = c.benchmark_group("event_clock");

    for &count in EVENT_COUNTS {
        group.bench_with_input(BenchmarkId::new("schedule_pop", count), &count, |b, &count| {
            b.iter_batched(
                || build_times(count),
                |times| {
                    let mut clock = EventClock::new();
                    for (idx, time) in times.into_iter().enumerate() {
                        clock.schedule(time, kind_for(idx), idx as u64);
                    }
                    while let Some(event) = clock.pop() {
                        black_box(event);
                    }
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_event_clock);
criterion_main!(benches);
