use std::fmt::Write;

use crate::error::{Error, Result};
use crate::models::{Scenario, SimulationRequest, Variability};
use crate::state::{ScenarioResult, SimulationResponse};

pub trait Formatter {
    fn write(&self, response: &SimulationResponse) -> Result<String>;
}

pub struct HumanFormatter;
pub struct SummaryFormatter;
pub struct JsonFormatter;

impl Formatter for HumanFormatter {
    fn write(&self, response: &SimulationResponse) -> Result<String> {
        let mut out = String::new();
        let metadata = &response.metadata;
        let _ = writeln!(out, "Metadata:");
        let _ = writeln!(out, "engine_version: {}", metadata.engine_version);
        let _ = writeln!(out, "rng_algorithm: {}", metadata.rng_algorithm);
        let _ = writeln!(out, "master_seed: {}", metadata.master_seed);
        let _ = writeln!(out, "iterations: {}", metadata.iterations);
        let _ = writeln!(out, "warm_up_minutes: {}", metadata.warm_up_minutes);
        let _ = writeln!(out, "timestamp_utc: {}", metadata.timestamp_utc);
        let _ = writeln!(out, "execution_time_ms: {}", metadata.execution_time_ms);

        if let Some(warning) = &response.warning {
            for line in warning.lines() {
                let _ = writeln!(out, "Warning: {}", line);
            }
        }

        for result in &response.results {
            write_result(&mut out, result);
        }
        Ok(out)
    }
}

fn write_result(out: &mut String, result: &ScenarioResult) {
    let m = &result.metrics;
    let _ = writeln!(out, "Scenario: {}", result.scenario_name);
    let _ = writeln!(out, "capacity: {}", result.capacity);
    let _ = writeln!(
        out,
        "result: {} (bottleneck: {})",
        pass_label(result.passed),
        result.bottleneck
    );
    let _ = writeln!(
        out,
        "occupancy: avg {:.2}%, max {}, time full {:.2}%",
        m.avg_occupancy_pct * 100.0,
        m.max_occupancy,
        m.pct_time_full * 100.0
    );
    let _ = writeln!(
        out,
        "rejection_rate: {:.4} (95% CI {:.4}..{:.4})",
        m.rejection_rate,
        m.rejection_rate_ci.lower(),
        m.rejection_rate_ci.upper()
    );
    let _ = writeln!(
        out,
        "entry_wait: avg {:.2}s, p95 {:.2}s, queue max {}",
        m.entry_wait.avg_seconds, m.entry_wait.p95_seconds, m.entry_wait.queue_max
    );
    let exit = &m.exit_wait;
    let _ = writeln!(
        out,
        "exit_wait: avg {:.2} min, p90 {:.2} min, p95 {:.2} min (95% CI {:.2}..{:.2}), p99 {:.2} min",
        exit.avg_minutes,
        exit.p90_minutes,
        exit.p95_minutes,
        exit.p95_ci.lower(),
        exit.p95_ci.upper(),
        exit.p99_minutes
    );
    let _ = writeln!(
        out,
        "exit_queue: max {}, avg {:.2}",
        exit.queue_max, exit.queue_avg
    );
    let _ = writeln!(out, "throughput: {:.2} vehicles/h", m.throughput_per_hour);
    let _ = writeln!(out, "arrivals: {}, exits: {}", m.arrivals_total, m.exits_total);
}

fn pass_label(passed: bool) -> &'static str {
    if passed {
        "PASS"
    } else {
        "FAIL"
    }
}

impl Formatter for SummaryFormatter {
    fn write(&self, response: &SimulationResponse) -> Result<String> {
        let mut out = String::new();
        for result in &response.results {
            let _ = writeln!(
                out,
                "{}: {} (bottleneck: {}, rejection: {:.2}%, exit p95: {:.2} min)",
                result.scenario_name,
                pass_label(result.passed),
                result.bottleneck,
                result.metrics.rejection_rate * 100.0,
                result.metrics.exit_wait.p95_minutes
            );
        }
        Ok(out)
    }
}

impl Formatter for JsonFormatter {
    fn write(&self, response: &SimulationResponse) -> Result<String> {
        let mut json = serde_json::to_string_pretty(response)
            .map_err(|err| Error::Serialize(err.to_string()))?;
        json.push('\n');
        Ok(json)
    }
}

/// Merged configuration as printed by `show-config`.
pub fn describe_request(request: &SimulationRequest, warning: Option<&str>) -> String {
    let mut out = String::new();
    let config = &request.config;
    let _ = writeln!(out, "Iterations: {}", config.iterations);
    let _ = writeln!(out, "Master seed: {}", config.master_seed);
    let _ = writeln!(out, "Warm-up: {} min", config.warm_up_minutes);
    let _ = writeln!(
        out,
        "Stabilization buffer: {} min",
        config.stabilization_buffer_minutes
    );
    let _ = writeln!(
        out,
        "Thresholds: rejection <= {}, exit p95 <= {} min",
        config.thresholds.rejection_rate, config.thresholds.exit_p95_sla_minutes
    );
    let _ = writeln!(out, "Scenarios:");
    for scenario in &request.scenarios {
        describe_scenario(&mut out, scenario);
    }
    if let Some(warning) = warning {
        for line in warning.lines() {
            let _ = writeln!(out, "Warning: {}", line);
        }
    }
    out
}

fn describe_scenario(out: &mut String, scenario: &Scenario) {
    let demand = &scenario.demand;
    let _ = writeln!(
        out,
        "- {} (capacity: {} = {}x{})",
        scenario.name,
        scenario.total_capacity(),
        scenario.capacity.floors,
        scenario.capacity.spots_per_floor
    );
    let _ = writeln!(
        out,
        "  demand: {}/h, peak x{} from minute {} for {} min",
        demand.arrival_rate_per_hour,
        demand.peak_multiplier,
        demand.peak_start_minute,
        demand.peak_duration_minutes
    );
    let _ = writeln!(
        out,
        "  parking: mean {} min, variability {}",
        scenario.parking_duration.mean_minutes, scenario.parking_duration.variability
    );
    let _ = writeln!(
        out,
        "  entry: {} channel(s) at {}s, exit: {} channel(s) at {}s",
        scenario.entry.channels,
        scenario.entry.mean_service_time_seconds,
        scenario.exit.channels,
        scenario.exit.mean_service_time_seconds
    );
}

pub fn describe_variability() -> String {
    let mut out = String::new();
    for tier in Variability::ALL {
        let _ = writeln!(out, "{} (cv {})", tier, tier.cv());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{
        Bottleneck, ConfidenceInterval, ScenarioMetrics, SimulationMetadata,
    };

    fn response() -> SimulationResponse {
        let mut metrics = ScenarioMetrics {
            rejection_rate: 0.0625,
            rejection_rate_ci: ConfidenceInterval(0.05, 0.075),
            ..ScenarioMetrics::default()
        };
        metrics.exit_wait.p95_minutes = 1.5;
        SimulationResponse {
            results: vec![ScenarioResult {
                scenario_name: "downtown".to_string(),
                capacity: 200,
                metrics,
                bottleneck: Bottleneck::Entry,
                passed: false,
            }],
            metadata: SimulationMetadata {
                engine_version: "0.1.0".to_string(),
                rng_algorithm: "PCG-XSH-RR".to_string(),
                master_seed: 42,
                iterations: 10,
                warm_up_minutes: 30.0,
                timestamp_utc: "2026-01-01T00:00:00.000Z".to_string(),
                execution_time_ms: 5,
            },
            warning: None,
        }
    }

    #[test]
    fn summary_is_one_line_per_scenario() {
        let out = SummaryFormatter.write(&response()).unwrap();
        assert_eq!(
            out,
            "downtown: FAIL (bottleneck: ENTRY, rejection: 6.25%, exit p95: 1.50 min)\n"
        );
    }

    #[test]
    fn human_output_includes_metadata_and_metrics() {
        let mut response = response();
        response.warning = Some("first\nsecond".to_string());
        let out = HumanFormatter.write(&response).unwrap();
        assert!(out.starts_with("Metadata:\nengine_version: 0.1.0\n"));
        assert!(out.contains("Warning: first\nWarning: second\n"));
        assert!(out.contains("Scenario: downtown\ncapacity: 200\nresult: FAIL (bottleneck: ENTRY)\n"));
        assert!(out.contains("rejection_rate: 0.0625 (95% CI 0.0500..0.0750)\n"));
    }

    #[test]
    fn json_omits_missing_warning() {
        let out = JsonFormatter.write(&response()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(value.get("warning").is_none());
        assert_eq!(value["results"][0]["bottleneck"], "ENTRY");
        assert_eq!(value["results"][0]["metrics"]["rejection_rate_ci"][1], 0.075);
        assert_eq!(value["metadata"]["rng_algorithm"], "PCG-XSH-RR");
    }

    #[test]
    fn variability_listing() {
        assert_eq!(
            describe_variability(),
            "LOW (cv 0.3)\nMEDIUM (cv 0.6)\nHIGH (cv 1)\n"
        );
    }
}
