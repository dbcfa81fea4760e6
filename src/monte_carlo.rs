use log::debug;
use rayon::prelude::*;

use crate::engine::run_replication;
use crate::models::{Scenario, SimulationConfig, Thresholds};
use crate::rng::Pcg32;
use crate::state::{
    Bottleneck, EntryWaitMetrics, ExitWaitMetrics, RunMetrics, ScenarioMetrics, ScenarioResult,
};
use crate::stats::{self, BOOTSTRAP_RESAMPLES, CONFIDENCE_LEVEL};

/// Runs every replication of a scenario. Replication `i` is seeded with
/// `master_seed + i`; results come back in replication order regardless of
/// which worker ran them.
pub fn run_replications(scenario: &Scenario, config: &SimulationConfig) -> Vec<RunMetrics> {
    (0..u64::from(config.iterations))
        .into_par_iter()
        .map(|idx| {
            let rng = Pcg32::seeded(config.derived_seed(idx));
            run_replication(scenario, config, rng)
        })
        .collect()
}

/// Pools raw replications into scenario metrics. Bootstrap draws come from a
/// single generator seeded at `master_seed + iterations`, rejection interval
/// first, exit p95 interval second.
pub fn aggregate(
    runs: &[RunMetrics],
    scenario: &Scenario,
    config: &SimulationConfig,
) -> ScenarioMetrics {
    if runs.is_empty() {
        return ScenarioMetrics::default();
    }

    let mut rng = Pcg32::seeded(config.derived_seed(u64::from(config.iterations)));
    let replications = runs.len() as f64;

    let mut entry_waits = Vec::new();
    let mut exit_waits = Vec::new();
    let mut occupancy_sum = 0.0;
    let mut occupancy_count = 0usize;
    let mut exit_queue_sum = 0.0;
    let mut exit_queue_count = 0usize;
    let mut total_arrivals = 0u64;
    let mut total_exits = 0u64;
    let mut total_rejections = 0u64;
    let mut max_occupancy = 0u64;
    let mut max_entry_queue = 0u64;
    let mut max_exit_queue = 0u64;
    let mut total_time_full = 0.0;

    for run in runs {
        entry_waits.extend_from_slice(&run.entry_wait_seconds);
        exit_waits.extend_from_slice(&run.exit_wait_minutes);
        occupancy_sum += run.occupancy_samples.iter().map(|&v| v as f64).sum::<f64>();
        occupancy_count += run.occupancy_samples.len();
        exit_queue_sum += run.exit_queue_samples.iter().map(|&v| v as f64).sum::<f64>();
        exit_queue_count += run.exit_queue_samples.len();
        total_arrivals += run.total_arrivals;
        total_exits += run.total_exits;
        total_rejections += run.rejections;
        max_occupancy = max_occupancy.max(run.max_occupancy);
        max_entry_queue = max_entry_queue.max(run.max_entry_queue);
        max_exit_queue = max_exit_queue.max(run.max_exit_queue);
        total_time_full += run.time_at_full_capacity;
    }

    let avg_arrivals = total_arrivals as f64 / replications;
    let avg_exits = total_exits as f64 / replications;

    let rejection_rate = if total_arrivals == 0 {
        0.0
    } else {
        total_rejections as f64 / total_arrivals as f64
    };
    let rejection_ratios: Vec<f64> = runs.iter().map(RunMetrics::rejection_ratio).collect();
    let rejection_rate_ci = stats::bootstrap_ci(
        &rejection_ratios,
        |sample| stats::mean(sample),
        &mut rng,
        BOOTSTRAP_RESAMPLES,
        CONFIDENCE_LEVEL,
    )
    .clamp(0.0, 1.0);

    stats::sort(&mut entry_waits);
    stats::sort(&mut exit_waits);

    let exit_p95_ci = stats::bootstrap_ci(
        &exit_waits,
        |sample| stats::percentile_unsorted(sample, 95.0),
        &mut rng,
        BOOTSTRAP_RESAMPLES,
        CONFIDENCE_LEVEL,
    )
    .clamp(0.0, f64::INFINITY);

    let total_capacity = scenario.total_capacity();
    let avg_occupancy = ratio(occupancy_sum, occupancy_count as f64);
    let avg_occupancy_pct = if total_capacity == 0 {
        0.0
    } else {
        avg_occupancy / total_capacity as f64
    };

    let window = config.collection_window();
    let pct_time_full = ratio(total_time_full / replications, window).min(1.0);
    let throughput_per_hour = ratio(avg_exits, window) * 60.0;

    ScenarioMetrics {
        avg_occupancy_pct,
        max_occupancy,
        pct_time_full,
        rejection_rate,
        rejection_rate_ci,
        entry_wait: EntryWaitMetrics {
            avg_seconds: stats::mean(&entry_waits),
            p95_seconds: stats::percentile(&entry_waits, 95.0),
            queue_max: max_entry_queue,
        },
        exit_wait: ExitWaitMetrics {
            avg_minutes: stats::mean(&exit_waits),
            p90_minutes: stats::percentile(&exit_waits, 90.0),
            p95_minutes: stats::percentile(&exit_waits, 95.0),
            p95_ci: exit_p95_ci,
            p99_minutes: stats::percentile(&exit_waits, 99.0),
            queue_max: max_exit_queue,
            queue_avg: ratio(exit_queue_sum, exit_queue_count as f64),
        },
        throughput_per_hour,
        arrivals_total: avg_arrivals.round() as u64,
        exits_total: avg_exits.round() as u64,
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

pub fn classify_bottleneck(metrics: &ScenarioMetrics, thresholds: &Thresholds) -> Bottleneck {
    let entry_failed = metrics.rejection_rate > thresholds.rejection_rate;
    let exit_failed = metrics.exit_wait.p95_minutes > thresholds.exit_p95_sla_minutes;
    match (entry_failed, exit_failed) {
        (false, false) => Bottleneck::None,
        (true, false) => Bottleneck::Entry,
        (false, true) => Bottleneck::Exit,
        (true, true) => Bottleneck::Both,
    }
}

pub fn run_scenario(scenario: &Scenario, config: &SimulationConfig) -> ScenarioResult {
    let runs = run_replications(scenario, config);
    let metrics = aggregate(&runs, scenario, config);
    let bottleneck = classify_bottleneck(&metrics, &config.thresholds);

    debug!(
        "scenario '{}': rejection {:.4}, exit p95 {:.3} min, bottleneck {}",
        scenario.name, metrics.rejection_rate, metrics.exit_wait.p95_minutes, bottleneck
    );

    ScenarioResult {
        scenario_name: scenario.name.clone(),
        capacity: scenario.total_capacity(),
        metrics,
        bottleneck,
        passed: bottleneck == Bottleneck::None,
    }
}

/// One result per scenario, in input order.
pub fn run_scenarios(scenarios: &[Scenario], config: &SimulationConfig) -> Vec<ScenarioResult> {
    scenarios
        .par_iter()
        .map(|scenario| run_scenario(scenario, config))
        .collect()
}
