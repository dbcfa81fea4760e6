use chrono::{SecondsFormat, Utc};
use log::{info, warn};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::models::SimulationRequest;
use crate::monte_carlo::run_scenarios;
use crate::rng;
use crate::state::{SimulationMetadata, SimulationResponse};
use crate::validation::{capacity_warning, validate_request};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Validates and runs every scenario in the request on the global rayon pool.
pub fn simulate(request: &SimulationRequest) -> Result<SimulationResponse> {
    validate_request(request)?;

    let warning = capacity_warning(&request.scenarios);
    if let Some(message) = &warning {
        warn!("capacity warning: {}", message);
    }

    let config = &request.config;
    info!(
        "simulating {} scenario(s), {} iterations each, seed {}",
        request.scenarios.len(),
        config.iterations,
        config.master_seed
    );

    let started = Instant::now();
    let results = run_scenarios(&request.scenarios, config);
    let execution_time_ms = started.elapsed().as_millis() as u64;
    info!("simulation finished in {}ms", execution_time_ms);

    Ok(SimulationResponse {
        results,
        metadata: SimulationMetadata {
            engine_version: ENGINE_VERSION.to_string(),
            rng_algorithm: rng::ALGORITHM.to_string(),
            master_seed: config.master_seed,
            iterations: config.iterations,
            warm_up_minutes: config.warm_up_minutes,
            timestamp_utc: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            execution_time_ms,
        },
        warning,
    })
}

/// Like [`simulate`], but on a dedicated pool with `threads` workers.
pub fn simulate_with_threads(
    request: &SimulationRequest,
    threads: usize,
) -> Result<SimulationResponse> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|err| Error::ThreadPool(err.to_string()))?;
    pool.install(|| simulate(request))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CapacityParams, DemandParams, ParkingDurationParams, Scenario, ServiceParams,
        SimulationConfig, Variability,
    };

    fn request() -> SimulationRequest {
        SimulationRequest {
            scenarios: vec![Scenario {
                name: "small".to_string(),
                demand: DemandParams {
                    arrival_rate_per_hour: 30.0,
                    peak_multiplier: 1.0,
                    peak_start_minute: 0,
                    peak_duration_minutes: 60.0,
                },
                capacity: CapacityParams {
                    floors: 1,
                    spots_per_floor: 40,
                },
                parking_duration: ParkingDurationParams {
                    mean_minutes: 30.0,
                    variability: Variability::Low,
                },
                entry: ServiceParams {
                    channels: 1,
                    mean_service_time_seconds: 10.0,
                },
                exit: ServiceParams {
                    channels: 1,
                    mean_service_time_seconds: 10.0,
                },
            }],
            config: SimulationConfig {
                iterations: 3,
                master_seed: 9,
                ..SimulationConfig::default()
            },
        }
    }

    #[test]
    fn response_carries_metadata() {
        let response = simulate(&request()).unwrap();
        assert_eq!(response.results.len(), 1);
        let metadata = &response.metadata;
        assert_eq!(metadata.engine_version, ENGINE_VERSION);
        assert_eq!(metadata.rng_algorithm, "PCG-XSH-RR");
        assert_eq!(metadata.master_seed, 9);
        assert_eq!(metadata.iterations, 3);
        assert_eq!(metadata.warm_up_minutes, 30.0);
        assert!(metadata.timestamp_utc.ends_with('Z'));
    }

    #[test]
    fn warning_is_attached_for_tight_lots() {
        let quiet = simulate(&request()).unwrap();
        assert_eq!(quiet.warning, None);

        let mut tight = request();
        tight.scenarios[0].demand.arrival_rate_per_hour = 60.0;
        let response = simulate(&tight).unwrap();
        assert!(response.warning.unwrap().starts_with("Scenario \"small\""));
    }

    #[test]
    fn invalid_request_never_runs() {
        let mut bad = request();
        bad.config.iterations = 0;
        assert!(matches!(simulate(&bad), Err(Error::Validation(_))));
    }

    #[test]
    fn dedicated_pool_matches_global_pool() {
        let global = simulate(&request()).unwrap();
        let pooled = simulate_with_threads(&request(), 2).unwrap();
        assert_eq!(global.results, pooled.results);
    }
}
