use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

pub const ROOMY_TOML: &str = r#"
[[scenarios]]
name = "roomy"

[scenarios.demand]
arrival_rate_per_hour = 30.0
peak_multiplier = 1.5
peak_start_minute = 0
peak_duration_minutes = 60.0

[scenarios.capacity]
floors = 2
spots_per_floor = 80

[scenarios.parking_duration]
mean_minutes = 90.0
variability = "HIGH"

[scenarios.entry]
channels = 2
mean_service_time_seconds = 12.0

[scenarios.exit]
channels = 2
mean_service_time_seconds = 20.0

[config]
iterations = 5
master_seed = 7
"#;

pub fn write_temp_config(contents: &str, extension: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time should be available")
        .as_nanos();
    path.push(format!("park-sim-{}.{}", nanos, extension));
    fs::write(&path, contents).expect("config write should succeed");
    path
}
