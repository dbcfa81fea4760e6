use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub demand: DemandParams,
    pub capacity: CapacityParams,
    pub parking_duration: ParkingDurationParams,
    pub entry: ServiceParams,
    pub exit: ServiceParams,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct DemandParams {
    pub arrival_rate_per_hour: f64,
    #[serde(default = "default_peak_multiplier")]
    pub peak_multiplier: f64,
    #[serde(default)]
    pub peak_start_minute: u32,
    pub peak_duration_minutes: f64,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct CapacityParams {
    pub floors: u32,
    pub spots_per_floor: u32,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ParkingDurationParams {
    pub mean_minutes: f64,
    #[serde(default)]
    pub variability: Variability,
}

/// Entry or exit gate bank.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ServiceParams {
    pub channels: u32,
    pub mean_service_time_seconds: f64,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Variability {
    Low,
    #[default]
    Medium,
    High,
}

impl Variability {
    pub const ALL: [Variability; 3] = [Variability::Low, Variability::Medium, Variability::High];

    /// Coefficient of variation of the parking duration.
    pub fn cv(self) -> f64 {
        match self {
            Variability::Low => 0.3,
            Variability::Medium => 0.6,
            Variability::High => 1.0,
        }
    }
}

impl fmt::Display for Variability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Variability::Low => "LOW",
            Variability::Medium => "MEDIUM",
            Variability::High => "HIGH",
        };
        write!(f, "{}", label)
    }
}

impl Scenario {
    pub fn total_capacity(&self) -> u64 {
        u64::from(self.capacity.floors) * u64::from(self.capacity.spots_per_floor)
    }

    /// Base arrival rate per minute.
    pub fn base_rate(&self) -> f64 {
        self.demand.arrival_rate_per_hour / 60.0
    }

    /// Arrival rate per minute inside the peak window.
    pub fn peak_rate(&self) -> f64 {
        self.demand.arrival_rate_per_hour * self.demand.peak_multiplier / 60.0
    }

    /// Arrivals expected over the whole peak window.
    pub fn expected_peak_arrivals(&self) -> f64 {
        self.peak_rate() * self.demand.peak_duration_minutes
    }

    /// `(mu, sigma)` of the lognormal whose mean matches the configured
    /// parking duration.
    pub fn lognormal_params(&self) -> (f64, f64) {
        let cv = self.parking_duration.variability.cv();
        let sigma2 = (1.0 + cv * cv).ln();
        let mu = self.parking_duration.mean_minutes.ln() - sigma2 / 2.0;
        (mu, sigma2.sqrt())
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Thresholds {
    #[serde(default = "default_rejection_rate")]
    pub rejection_rate: f64,
    #[serde(default = "default_exit_p95_sla_minutes")]
    pub exit_p95_sla_minutes: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            rejection_rate: default_rejection_rate(),
            exit_p95_sla_minutes: default_exit_p95_sla_minutes(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct SimulationConfig {
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    #[serde(default = "default_master_seed")]
    pub master_seed: i64,
    #[serde(default = "default_warm_up_minutes")]
    pub warm_up_minutes: f64,
    #[serde(default = "default_stabilization_buffer_minutes")]
    pub stabilization_buffer_minutes: f64,
    #[serde(default)]
    pub thresholds: Thresholds,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            master_seed: default_master_seed(),
            warm_up_minutes: default_warm_up_minutes(),
            stabilization_buffer_minutes: default_stabilization_buffer_minutes(),
            thresholds: Thresholds::default(),
        }
    }
}

impl SimulationConfig {
    /// Simulated minutes during which arrivals are generated.
    pub fn horizon(&self, scenario: &Scenario) -> f64 {
        self.warm_up_minutes
            + f64::from(scenario.demand.peak_start_minute)
            + scenario.demand.peak_duration_minutes
            + self.stabilization_buffer_minutes
    }

    /// Generator seed for the run `offset` places after the master seed.
    /// Negative master seeds wrap into the 64-bit generator state.
    pub fn derived_seed(&self, offset: u64) -> u64 {
        (self.master_seed as u64).wrapping_add(offset)
    }

    /// Window used to normalise time-at-full and throughput.
    pub fn collection_window(&self) -> f64 {
        self.warm_up_minutes + self.stabilization_buffer_minutes
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct SimulationRequest {
    pub scenarios: Vec<Scenario>,
    #[serde(default)]
    pub config: SimulationConfig,
}

fn default_peak_multiplier() -> f64 {
    1.0
}

fn default_rejection_rate() -> f64 {
    0.05
}

fn default_exit_p95_sla_minutes() -> f64 {
    3.0
}

fn default_iterations() -> u32 {
    500
}

fn default_master_seed() -> i64 {
    42
}

fn default_warm_up_minutes() -> f64 {
    30.0
}

fn default_stabilization_buffer_minutes() -> f64 {
    60.0
}
