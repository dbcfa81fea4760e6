use crate::error::{Error, Result, ValidationIssue};
use crate::models::{Scenario, ServiceParams, SimulationConfig, SimulationRequest};

pub const MAX_SCENARIOS: usize = 10;
pub const MAX_ITERATIONS: u32 = 2_000;
const CAPACITY_WARNING_RATIO: f64 = 0.8;

/// Checks a request before it reaches the engine. Every problem found is
/// reported at once.
pub fn validate_request(request: &SimulationRequest) -> Result<()> {
    let mut issues = Vec::new();
    let count = request.scenarios.len();
    if count == 0 {
        issues.push(ValidationIssue::new(
            "scenarios",
            "at least one scenario is required",
        ));
    } else if count > MAX_SCENARIOS {
        issues.push(ValidationIssue::new(
            "scenarios",
            format!("too many scenarios: {} (maximum {})", count, MAX_SCENARIOS),
        ));
    }

    for (idx, scenario) in request.scenarios.iter().enumerate() {
        validate_scenario(&format!("scenarios.{}", idx), scenario, &mut issues);
    }
    validate_config(&request.config, &mut issues);

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(issues))
    }
}

fn validate_scenario(path: &str, scenario: &Scenario, issues: &mut Vec<ValidationIssue>) {
    if scenario.name.trim().is_empty() {
        issues.push(ValidationIssue::new(
            format!("{}.name", path),
            "scenario name is required",
        ));
    }

    let demand = &scenario.demand;
    positive(
        issues,
        format!("{}.demand.arrival_rate_per_hour", path),
        demand.arrival_rate_per_hour,
    );
    if !demand.peak_multiplier.is_finite() || demand.peak_multiplier < 1.0 {
        issues.push(ValidationIssue::new(
            format!("{}.demand.peak_multiplier", path),
            "peak multiplier must be at least 1.0",
        ));
    }
    positive(
        issues,
        format!("{}.demand.peak_duration_minutes", path),
        demand.peak_duration_minutes,
    );

    if scenario.capacity.floors < 1 {
        issues.push(ValidationIssue::new(
            format!("{}.capacity.floors", path),
            "must be at least 1 floor",
        ));
    }
    if scenario.capacity.spots_per_floor < 1 {
        issues.push(ValidationIssue::new(
            format!("{}.capacity.spots_per_floor", path),
            "must be at least 1 spot per floor",
        ));
    }

    positive(
        issues,
        format!("{}.parking_duration.mean_minutes", path),
        scenario.parking_duration.mean_minutes,
    );

    validate_service(&format!("{}.entry", path), &scenario.entry, issues);
    validate_service(&format!("{}.exit", path), &scenario.exit, issues);
}

fn validate_service(path: &str, service: &ServiceParams, issues: &mut Vec<ValidationIssue>) {
    if service.channels < 1 {
        issues.push(ValidationIssue::new(
            format!("{}.channels", path),
            "must have at least 1 channel",
        ));
    }
    positive(
        issues,
        format!("{}.mean_service_time_seconds", path),
        service.mean_service_time_seconds,
    );
}

fn validate_config(config: &SimulationConfig, issues: &mut Vec<ValidationIssue>) {
    if config.iterations < 1 || config.iterations > MAX_ITERATIONS {
        issues.push(ValidationIssue::new(
            "config.iterations",
            format!("iterations must be between 1 and {}", MAX_ITERATIONS),
        ));
    }
    non_negative(issues, "config.warm_up_minutes", config.warm_up_minutes);
    non_negative(
        issues,
        "config.stabilization_buffer_minutes",
        config.stabilization_buffer_minutes,
    );

    let rejection = config.thresholds.rejection_rate;
    if !rejection.is_finite() || !(0.0..=1.0).contains(&rejection) {
        issues.push(ValidationIssue::new(
            "config.thresholds.rejection_rate",
            "must be between 0 and 1",
        ));
    }
    positive(
        issues,
        "config.thresholds.exit_p95_sla_minutes",
        config.thresholds.exit_p95_sla_minutes,
    );
}

fn positive(issues: &mut Vec<ValidationIssue>, field: impl Into<String>, value: f64) {
    if !value.is_finite() || value <= 0.0 {
        issues.push(ValidationIssue::new(field, "must be a positive number"));
    }
}

fn non_negative(issues: &mut Vec<ValidationIssue>, field: impl Into<String>, value: f64) {
    if !value.is_finite() || value < 0.0 {
        issues.push(ValidationIssue::new(field, "must be a non-negative number"));
    }
}

/// Advisory only: flags scenarios whose expected peak arrivals exceed 80% of
/// the lot. Lines for several scenarios are joined with newlines.
pub fn capacity_warning(scenarios: &[Scenario]) -> Option<String> {
    let warnings: Vec<String> = scenarios
        .iter()
        .filter(|scenario| {
            scenario.expected_peak_arrivals()
                > scenario.total_capacity() as f64 * CAPACITY_WARNING_RATIO
        })
        .map(|scenario| {
            format!(
                "Scenario \"{}\": Peak arrivals may exceed 80% of capacity. \
                 Consider increasing capacity or reducing peak duration.",
                scenario.name
            )
        })
        .collect();

    if warnings.is_empty() {
        None
    } else {
        Some(warnings.join("\n"))
    }
}
