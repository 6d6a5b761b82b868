use std::path::Path;

use crate::config::SimulationConfig;
use crate::error::Result;

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;
pub mod runner;

/// Loads the simulation configuration from `file_path`, or falls back to the built-in cluster if
/// no file is given.
pub fn load_config(file_path: Option<&Path>) -> Result<SimulationConfig> {
    match file_path {
        Some(path) => SimulationConfig::from_file(path),
        None => {
            let config = SimulationConfig::default();
            config.validate()?;
            log::info!("No configuration file given. Using the built-in cluster of {} hosts and {} VMs.", config.hosts.count, config.vms.count);
            Ok(config)
        }
    }
}
