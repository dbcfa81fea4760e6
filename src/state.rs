use serde::Serialize;
use std::fmt;

/// Where a live vehicle is in its visit. Rejected vehicles are never
/// recorded and departed ones are dropped, so only in-lot phases exist here.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Vehicle {
    Entering { parking_minutes: f64 },
    Parked,
    Exiting { exit_started_at: f64 },
}

impl Vehicle {
    pub fn entering(parking_minutes: f64) -> Self {
        Vehicle::Entering { parking_minutes }
    }

    /// Moves an entering vehicle onto a spot and returns when it will leave.
    pub fn park(&mut self, at: f64) -> Option<f64> {
        match *self {
            Vehicle::Entering { parking_minutes } => {
                *self = Vehicle::Parked;
                Some(at + parking_minutes)
            }
            _ => None,
        }
    }

    pub fn begin_exit(&mut self, at: f64) -> bool {
        match *self {
            Vehicle::Parked => {
                *self = Vehicle::Exiting {
                    exit_started_at: at,
                };
                true
            }
            _ => false,
        }
    }

    pub fn exit_started_at(&self) -> Option<f64> {
        match self {
            Vehicle::Exiting { exit_started_at } => Some(*exit_started_at),
            _ => None,
        }
    }
}

/// Raw observations from one replication.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunMetrics {
    pub total_arrivals: u64,
    pub total_exits: u64,
    pub rejections: u64,
    pub entry_wait_seconds: Vec<f64>,
    pub exit_wait_minutes: Vec<f64>,
    pub occupancy_samples: Vec<u64>,
    pub exit_queue_samples: Vec<u64>,
    pub max_occupancy: u64,
    pub max_entry_queue: u64,
    pub max_exit_queue: u64,
    pub time_at_full_capacity: f64,
}

impl RunMetrics {
    pub fn rejection_ratio(&self) -> f64 {
        if self.total_arrivals == 0 {
            0.0
        } else {
            self.rejections as f64 / self.total_arrivals as f64
        }
    }
}

/// Bootstrap interval, serialized as `[lower, upper]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ConfidenceInterval(pub f64, pub f64);

impl ConfidenceInterval {
    pub fn lower(&self) -> f64 {
        self.0
    }

    pub fn upper(&self) -> f64 {
        self.1
    }

    pub fn width(&self) -> f64 {
        self.1 - self.0
    }

    pub fn clamp(self, min: f64, max: f64) -> Self {
        Self(self.0.max(min), self.1.min(max))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EntryWaitMetrics {
    pub avg_seconds: f64,
    pub p95_seconds: f64,
    pub queue_max: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ExitWaitMetrics {
    pub avg_minutes: f64,
    pub p90_minutes: f64,
    pub p95_minutes: f64,
    pub p95_ci: ConfidenceInterval,
    pub p99_minutes: f64,
    pub queue_max: u64,
    pub queue_avg: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ScenarioMetrics {
    pub avg_occupancy_pct: f64,
    pub max_occupancy: u64,
    pub pct_time_full: f64,
    pub rejection_rate: f64,
    pub rejection_rate_ci: ConfidenceInterval,
    pub entry_wait: EntryWaitMetrics,
    pub exit_wait: ExitWaitMetrics,
    pub throughput_per_hour: f64,
    pub arrivals_total: u64,
    pub exits_total: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Bottleneck {
    None,
    Entry,
    Exit,
    Both,
}

impl fmt::Display for Bottleneck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Bottleneck::None => "NONE",
            Bottleneck::Entry => "ENTRY",
            Bottleneck::Exit => "EXIT",
            Bottleneck::Both => "BOTH",
        };
        write!(f, "{}", label)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub capacity: u64,
    pub metrics: ScenarioMetrics,
    pub bottleneck: Bottleneck,
    pub passed: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationMetadata {
    pub engine_version: String,
    pub rng_algorithm: String,
    pub master_seed: i64,
    pub iterations: u32,
    pub warm_up_minutes: f64,
    pub timestamp_utc: String,
    pub execution_time_ms: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationResponse {
    pub results: Vec<ScenarioResult>,
    pub metadata: SimulationMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicle_walks_through_lot_phases() {
        let mut vehicle = Vehicle::entering(30.0);
        assert!(!vehicle.begin_exit(11.0));
        assert_eq!(vehicle.park(12.0), Some(42.0));
        assert_eq!(vehicle, Vehicle::Parked);
        assert_eq!(vehicle.park(13.0), None);
        assert_eq!(vehicle.exit_started_at(), None);
        assert!(vehicle.begin_exit(42.0));
        assert!(!vehicle.begin_exit(43.0));
        assert_eq!(vehicle.exit_started_at(), Some(42.0));
    }

    #[test]
    fn rejection_ratio_guards_empty_runs() {
        let mut run = RunMetrics::default();
        assert_eq!(run.rejection_ratio(), 0.0);
        run.total_arrivals = 8;
        run.rejections = 2;
        assert_eq!(run.rejection_ratio(), 0.25);
    }

    #[test]
    fn interval_serializes_as_pair_and_clamps() {
        let ci = ConfidenceInterval(-0.2, 1.4).clamp(0.0, 1.0);
        assert_eq!(ci, ConfidenceInterval(0.0, 1.0));
        assert_eq!(ci.width(), 1.0);
        assert_eq!(serde_json::to_string(&ci).unwrap(), "[0.0,1.0]");
    }

    #[test]
    fn bottleneck_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Bottleneck::Both).unwrap(), "\"BOTH\"");
        assert_eq!(Bottleneck::Entry.to_string(), "ENTRY");
    }
}
