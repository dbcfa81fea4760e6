/// Outcome of handing one vehicle to a station.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ServiceSlot {
    pub start: f64,
    pub end: f64,
    pub wait: f64,
}

/// `c` identical servers, each remembering when it next becomes free.
///
/// There is no explicit waiting line: a vehicle is bound to the server that
/// frees up earliest and simply starts late if that is in the future.
#[derive(Clone, Debug)]
pub struct ServiceStation {
    busy_until: Vec<f64>,
}

impl ServiceStation {
    pub fn new(channels: usize) -> Self {
        Self {
            busy_until: vec![0.0; channels],
        }
    }

    pub fn channels(&self) -> usize {
        self.busy_until.len()
    }

    pub fn enqueue(&mut self, arrival: f64, service_time: f64) -> ServiceSlot {
        let mut server_idx = 0;
        let mut earliest = f64::INFINITY;
        for (idx, busy_until) in self.busy_until.iter().enumerate() {
            if *busy_until < earliest {
                earliest = *busy_until;
                server_idx = idx;
            }
        }

        let start = arrival.max(earliest);
        let end = start + service_time;
        self.busy_until[server_idx] = end;

        ServiceSlot {
            start,
            end,
            wait: start - arrival,
        }
    }

    /// Servers still busy at `time`. This counts vehicles in service as well
    /// as ones waiting, so it approximates rather than measures queue length.
    pub fn queue_length(&self, time: f64) -> usize {
        self.busy_until.iter().filter(|&&until| until > time).count()
    }

    pub fn reset(&mut self) {
        self.busy_until.fill(0.0);
    }
}
