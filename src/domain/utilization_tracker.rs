use std::collections::HashMap;

use crate::config::DEFAULT_RAM_SAMPLE_INTERVAL;
use crate::domain::simulator::simulator::MachineSnapshot;
use crate::domain::utils::id::MachineId;

#[derive(Debug, Clone, Copy, Default)]
struct RamStats {
    sum: f64,
    peak: f64,
    count: usize,
}

impl RamStats {
    fn record(&mut self, utilization: f64) {
        self.sum += utilization;
        self.count += 1;
        if utilization > self.peak {
            self.peak = utilization;
        }
    }

    fn average(&self) -> f64 {
        if self.count > 0 { self.sum / self.count as f64 } else { 0.0 }
    }
}

/// Tracks RAM utilization statistics per machine over time.
///
/// Sampling is pull based: the engine offers a snapshot on every clock tick and the tracker only
/// records it if at least `sample_interval` time units passed since the previous sample.
#[derive(Debug)]
pub struct RamUtilizationTracker {
    sample_interval: f64,
    /// `None` until the first sample was taken.
    last_sample_time: Option<f64>,
    stats: HashMap<MachineId, RamStats>,
}

impl Default for RamUtilizationTracker {
    fn default() -> Self {
        Self::new(DEFAULT_RAM_SAMPLE_INTERVAL)
    }
}

impl RamUtilizationTracker {
    pub fn new(sample_interval: f64) -> Self {
        Self { sample_interval, last_sample_time: None, stats: HashMap::new() }
    }

    /// Records the RAM demand of every machine, unless the previous sample is too recent.
    ///
    /// The demand of a machine is the sum of `ram_utilization * ram_capacity` over the jobs running
    /// on it, expressed as a fraction of its capacity. It may exceed 1 for oversubscribed machines.
    pub fn record_snapshot(&mut self, machines: &[MachineSnapshot<'_>], current_time: f64) {
        if let Some(last) = self.last_sample_time {
            if current_time - last < self.sample_interval {
                return;
            }
        }
        self.last_sample_time = Some(current_time);

        for snapshot in machines {
            let capacity = snapshot.machine.ram;
            let demand: f64 = snapshot.running.iter().map(|job| job.ram_utilization * capacity).sum();
            let utilization = if capacity > 0.0 { demand / capacity } else { 0.0 };

            self.stats.entry(snapshot.machine.id).or_default().record(utilization);
        }
    }

    pub fn average_utilization(&self, machine: MachineId) -> f64 {
        self.stats.get(&machine).map_or(0.0, RamStats::average)
    }

    pub fn peak_utilization(&self, machine: MachineId) -> f64 {
        self.stats.get(&machine).map_or(0.0, |s| s.peak)
    }

    pub fn sample_count(&self, machine: MachineId) -> usize {
        self.stats.get(&machine).map_or(0, |s| s.count)
    }
}
