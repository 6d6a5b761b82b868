use std::path::{Path, PathBuf};

use crate::api::config_dto::{MachineGroupDto, SimulationConfigDto};
use crate::error::{Error, Result};
use crate::loader::parser::parse_json_file;

pub const DEFAULT_JOBS_DIR: &str = "output/tasks";
pub const DEFAULT_RESULTS_DIR: &str = "output/results";

/// Aggregate index written next to the job description files. It is not a scenario.
pub const DEFAULT_INDEX_FILE: &str = "tasks.json";

/// Interval at which the engine advances its clock even if no job finishes.
pub const DEFAULT_SCHEDULING_INTERVAL: f64 = 1.0;

/// Minimum distance between two memory samples of the utilization tracker.
pub const DEFAULT_RAM_SAMPLE_INTERVAL: f64 = 0.2;

/// Homogeneous group of machines (physical hosts or virtual machines).
#[derive(Debug, Clone, PartialEq)]
pub struct MachineGroupConfig {
    pub count: usize,
    pub slots: u32,
    pub mips_per_slot: f64,
    pub ram: f64,
    pub bw: f64,
    pub storage: f64,
}

impl MachineGroupConfig {
    pub fn default_hosts() -> Self {
        Self { count: 4, slots: 16, mips_per_slot: 10_000.0, ram: 64_000.0, bw: 100_000.0, storage: 1_000_000.0 }
    }

    pub fn default_vms() -> Self {
        Self { count: 8, slots: 4, mips_per_slot: 5_000.0, ram: 16_000.0, bw: 20_000.0, storage: 20_000.0 }
    }

    fn with_overrides(self, dto: MachineGroupDto) -> Self {
        Self {
            count: dto.count.unwrap_or(self.count),
            slots: dto.slots.unwrap_or(self.slots),
            mips_per_slot: dto.mips_per_slot.unwrap_or(self.mips_per_slot),
            ram: dto.ram.unwrap_or(self.ram),
            bw: dto.bw.unwrap_or(self.bw),
            storage: dto.storage.unwrap_or(self.storage),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub hosts: MachineGroupConfig,
    pub vms: MachineGroupConfig,
    pub scheduling_interval: f64,
    pub ram_sample_interval: f64,
    pub jobs_dir: PathBuf,
    pub results_dir: PathBuf,
    pub index_file: String,
    /// Size of the batch worker pool.
    pub workers: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            hosts: MachineGroupConfig::default_hosts(),
            vms: MachineGroupConfig::default_vms(),
            scheduling_interval: DEFAULT_SCHEDULING_INTERVAL,
            ram_sample_interval: DEFAULT_RAM_SAMPLE_INTERVAL,
            jobs_dir: PathBuf::from(DEFAULT_JOBS_DIR),
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            index_file: DEFAULT_INDEX_FILE.to_string(),
            workers: available_workers(),
        }
    }
}

impl From<SimulationConfigDto> for SimulationConfig {
    fn from(dto: SimulationConfigDto) -> Self {
        let defaults = SimulationConfig::default();

        Self {
            hosts: dto.hosts.map_or(defaults.hosts.clone(), |h| defaults.hosts.clone().with_overrides(h)),
            vms: dto.vms.map_or(defaults.vms.clone(), |v| defaults.vms.clone().with_overrides(v)),
            scheduling_interval: dto.scheduling_interval.unwrap_or(defaults.scheduling_interval),
            ram_sample_interval: dto.ram_sample_interval.unwrap_or(defaults.ram_sample_interval),
            jobs_dir: dto.jobs_dir.map(PathBuf::from).unwrap_or(defaults.jobs_dir),
            results_dir: dto.results_dir.map(PathBuf::from).unwrap_or(defaults.results_dir),
            index_file: dto.index_file.unwrap_or(defaults.index_file),
            workers: dto.workers.unwrap_or(defaults.workers),
        }
    }
}

impl SimulationConfig {
    /// Loads a JSON configuration file and applies it on top of the defaults.
    pub fn from_file(file_path: impl AsRef<Path>) -> Result<Self> {
        let dto: SimulationConfigDto = parse_json_file(file_path.as_ref())?;
        let config = SimulationConfig::from(dto);
        config.validate()?;

        log::info!("Configuration loaded from '{}'.", file_path.as_ref().display());
        Ok(config)
    }

    /// Rejects values the engine cannot make progress with. An empty VM pool is deliberately
    /// accepted here: it surfaces as a failed run when the first job is dispatched.
    pub fn validate(&self) -> Result<()> {
        if !(self.scheduling_interval > 0.0) {
            return Err(Error::ConfigurationError(format!("scheduling interval must be positive, got {}", self.scheduling_interval)));
        }
        if self.ram_sample_interval < 0.0 {
            return Err(Error::ConfigurationError(format!("RAM sample interval must not be negative, got {}", self.ram_sample_interval)));
        }
        if self.workers == 0 {
            return Err(Error::ConfigurationError("worker pool needs at least one thread".to_string()));
        }
        Ok(())
    }
}

/// Number of worker threads matching the parallel hardware capacity of this machine.
pub fn available_workers() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_dto_keeps_remaining_defaults() {
        let dto: SimulationConfigDto = serde_json::from_str(r#"{ "vms": { "count": 2 }, "workers": 3 }"#).unwrap();
        let config = SimulationConfig::from(dto);

        assert_eq!(config.vms.count, 2);
        assert_eq!(config.vms.slots, 4);
        assert_eq!(config.hosts, MachineGroupConfig::default_hosts());
        assert_eq!(config.workers, 3);
        assert_eq!(config.index_file, "tasks.json");
        assert_eq!(config.ram_sample_interval, 0.2);
    }

    #[test]
    fn non_positive_scheduling_interval_is_rejected() {
        let config = SimulationConfig { scheduling_interval: 0.0, ..SimulationConfig::default() };
        assert!(matches!(config.validate(), Err(Error::ConfigurationError(_))));
    }
}
