use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use park_sim::engine::run_replication;
use park_sim::models::{
    CapacityParams, DemandParams, ParkingDurationParams, Scenario, ServiceParams,
    SimulationConfig, Variability,
};
use park_sim::rng::Pcg32;

const ARRIVAL_RATES: &[f64] = &[60.0, 240.0, 960.0];

fn build_scenario(rate: f64) -> Scenario {
    Scenario {
        name: format!("rate-{}", rate),
        demand: DemandParams {
            arrival_rate_per_hour: rate,
            peak_multiplier: 1.5,
            peak_start_minute: 0,
            peak_duration_minutes: 120.0,
        },
        capacity: CapacityParams {
            floors: 4,
            spots_per_floor: 100,
        },
        parking_duration: ParkingDurationParams {
            mean_minutes: 90.0,
            variability: Variability::Medium,
        },
        entry: ServiceParams {
            channels: 3,
            mean_service_time_seconds: 8.0,
        },
        exit: ServiceParams {
            channels: 3,
            mean_service_time_seconds: 12.0,
        },
    }
}

fn bench_replication(c: &mut Criterion) {
    let mut group = c.benchmark_group("replication");
    let config = SimulationConfig::default();

    for &rate in ARRIVAL_RATES {
        let scenario = build_scenario(rate);
        group.bench_with_input(
            BenchmarkId::new("arrivals_per_hour", rate),
            &scenario,
            |b, scenario| {
                b.iter_batched(
                    || Pcg32::seeded(42),
                    |rng| black_box(run_replication(scenario, &config, rng)),
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_replication);
criterion_main!(benches);
