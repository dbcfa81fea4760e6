use log::trace;
use std::collections::HashMap;

use crate::events::{EventClock, EventKind, ScheduledEvent};
use crate::models::{Scenario, SimulationConfig};
use crate::rng::Pcg32;
use crate::state::{RunMetrics, Vehicle};
use crate::station::ServiceStation;

const SAMPLE_INTERVAL_MINUTES: f64 = 1.0;

/// One replication of a scenario. Times are minutes from the start of the
/// run; nothing is measured before the warm-up boundary.
pub struct SimulationEngine<'a> {
    scenario: &'a Scenario,
    config: &'a SimulationConfig,
    rng: Pcg32,
    total_capacity: u64,
    horizon: f64,
    peak_window: (f64, f64),
    max_arrival_rate: f64,
    entry_rate: f64,
    exit_rate: f64,
    lognormal: (f64, f64),
    clock: EventClock,
    entry: ServiceStation,
    exit: ServiceStation,
    vehicles: HashMap<u64, Vehicle>,
    occupancy: u64,
    pending_entries: u64,
    next_vehicle_id: u64,
    last_occupancy_change: f64,
    last_sample: f64,
    metrics: RunMetrics,
}

impl<'a> SimulationEngine<'a> {
    pub fn new(scenario: &'a Scenario, config: &'a SimulationConfig, rng: Pcg32) -> Self {
        let peak_start = config.warm_up_minutes + f64::from(scenario.demand.peak_start_minute);
        let peak_end = peak_start + scenario.demand.peak_duration_minutes;

        Self {
            scenario,
            config,
            rng,
            total_capacity: scenario.total_capacity(),
            horizon: config.horizon(scenario),
            peak_window: (peak_start, peak_end),
            max_arrival_rate: scenario.peak_rate(),
            entry_rate: 60.0 / scenario.entry.mean_service_time_seconds,
            exit_rate: 60.0 / scenario.exit.mean_service_time_seconds,
            lognormal: scenario.lognormal_params(),
            clock: EventClock::new(),
            entry: ServiceStation::new(scenario.entry.channels as usize),
            exit: ServiceStation::new(scenario.exit.channels as usize),
            vehicles: HashMap::new(),
            occupancy: 0,
            pending_entries: 0,
            next_vehicle_id: 0,
            last_occupancy_change: 0.0,
            last_sample: 0.0,
            metrics: RunMetrics::default(),
        }
    }

    pub fn run(mut self) -> RunMetrics {
        self.schedule_next_arrival(0.0);

        while let Some(event) = self.clock.pop() {
            self.sample_until(event.time);
            match event.kind {
                EventKind::Arrival => self.on_arrival(&event),
                EventKind::EntryComplete => self.on_entry_complete(&event),
                EventKind::ExitStart => self.on_exit_start(&event),
                EventKind::ExitComplete => self.on_exit_complete(&event),
            }
        }

        if self.occupancy == self.total_capacity {
            self.accumulate_full_time(self.horizon);
        }

        self.metrics
    }

    fn is_metrics_time(&self, time: f64) -> bool {
        time >= self.config.warm_up_minutes
    }

    fn arrival_rate_at(&self, time: f64) -> f64 {
        let (peak_start, peak_end) = self.peak_window;
        if time >= peak_start && time < peak_end {
            self.scenario.peak_rate()
        } else {
            self.scenario.base_rate()
        }
    }

    /// Thinning against the peak rate; schedules at most one accepted arrival.
    fn schedule_next_arrival(&mut self, from: f64) {
        let mut time = from;
        while time < self.horizon {
            time += self.rng.exponential(self.max_arrival_rate);
            if time >= self.horizon {
                break;
            }
            let acceptance = self.arrival_rate_at(time) / self.max_arrival_rate;
            if self.rng.uniform01() < acceptance {
                self.next_vehicle_id += 1;
                self.clock
                    .schedule(time, EventKind::Arrival, self.next_vehicle_id);
                break;
            }
        }
    }

    fn sample_until(&mut self, time: f64) {
        while self.last_sample + SAMPLE_INTERVAL_MINUTES <= time {
            self.last_sample += SAMPLE_INTERVAL_MINUTES;
            if self.is_metrics_time(self.last_sample) {
                self.metrics.occupancy_samples.push(self.occupancy);
                self.metrics
                    .exit_queue_samples
                    .push(self.exit.queue_length(self.last_sample) as u64);
            }
        }
    }

    /// Adds the time spent full since the last occupancy change. Nothing is
    /// added when that change happened before warm-up.
    fn accumulate_full_time(&mut self, until: f64) {
        if !self.is_metrics_time(self.last_occupancy_change) {
            return;
        }
        let from = self.last_occupancy_change.max(self.config.warm_up_minutes);
        let duration = until - from;
        if duration > 0.0 {
            self.metrics.time_at_full_capacity += duration;
        }
    }

    fn set_occupancy(&mut self, time: f64, occupancy: u64) {
        if self.occupancy == self.total_capacity {
            self.accumulate_full_time(time);
        }
        self.last_occupancy_change = time;
        self.occupancy = occupancy;
        self.metrics.max_occupancy = self.metrics.max_occupancy.max(occupancy);
    }

    fn on_arrival(&mut self, event: &ScheduledEvent) {
        let time = event.time;
        let measured = self.is_metrics_time(time);
        if measured {
            self.metrics.total_arrivals += 1;
        }

        if self.occupancy + self.pending_entries >= self.total_capacity {
            trace!("vehicle {} rejected at {:.2}", event.vehicle_id, time);
            if measured {
                self.metrics.rejections += 1;
            }
        } else {
            self.pending_entries += 1;

            let service_time = self.rng.exponential(self.entry_rate);
            let slot = self.entry.enqueue(time, service_time);
            if measured {
                self.metrics.entry_wait_seconds.push(slot.wait * 60.0);
                let queue = self.entry.queue_length(time) as u64 + 1;
                self.metrics.max_entry_queue = self.metrics.max_entry_queue.max(queue);
            }
            self.clock
                .schedule(slot.end, EventKind::EntryComplete, event.vehicle_id);

            let (mu, sigma) = self.lognormal;
            let parking_minutes = self.rng.lognormal(mu, sigma);
            self.vehicles
                .insert(event.vehicle_id, Vehicle::entering(parking_minutes));
        }

        self.schedule_next_arrival(time);
    }

    fn on_entry_complete(&mut self, event: &ScheduledEvent) {
        let Some(vehicle) = self.vehicles.get_mut(&event.vehicle_id) else {
            return;
        };
        let Some(leaves_at) = vehicle.park(event.time) else {
            return;
        };

        self.pending_entries -= 1;
        self.set_occupancy(event.time, self.occupancy + 1);
        self.clock
            .schedule(leaves_at, EventKind::ExitStart, event.vehicle_id);
    }

    fn on_exit_start(&mut self, event: &ScheduledEvent) {
        let time = event.time;
        let Some(vehicle) = self.vehicles.get_mut(&event.vehicle_id) else {
            return;
        };
        if !vehicle.begin_exit(time) {
            return;
        }

        // the spot frees as soon as the vehicle heads for the exit
        self.set_occupancy(time, self.occupancy - 1);

        let service_time = self.rng.exponential(self.exit_rate);
        let slot = self.exit.enqueue(time, service_time);
        if self.is_metrics_time(time) {
            self.metrics.exit_wait_minutes.push(slot.wait);
            let queue = self.exit.queue_length(time) as u64 + 1;
            self.metrics.max_exit_queue = self.metrics.max_exit_queue.max(queue);
        }
        self.clock
            .schedule(slot.end, EventKind::ExitComplete, event.vehicle_id);
    }

    fn on_exit_complete(&mut self, event: &ScheduledEvent) {
        let Some(vehicle) = self.vehicles.remove(&event.vehicle_id) else {
            return;
        };
        if let Some(exit_started_at) = vehicle.exit_started_at() {
            if self.is_metrics_time(exit_started_at) {
                self.metrics.total_exits += 1;
            }
        }
    }
}

/// Runs one replication with its own generator. Pure apart from `rng`, so
/// replications can run on any thread.
pub fn run_replication(scenario: &Scenario, config: &SimulationConfig, rng: Pcg32) -> RunMetrics {
    SimulationEngine::new(scenario, config, rng).run()
}
