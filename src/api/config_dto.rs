use serde::Deserialize;

/// Optional overrides for the simulated cluster and the batch layout. Every field may be omitted,
/// the defaults of [`crate::config::SimulationConfig`] apply in that case.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationConfigDto {
    pub hosts: Option<MachineGroupDto>,
    pub vms: Option<MachineGroupDto>,
    pub scheduling_interval: Option<f64>,
    pub ram_sample_interval: Option<f64>,
    pub jobs_dir: Option<String>,
    pub results_dir: Option<String>,
    pub index_file: Option<String>,
    pub workers: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MachineGroupDto {
    pub count: Option<usize>,
    pub slots: Option<u32>,
    pub mips_per_slot: Option<f64>,
    pub ram: Option<f64>,
    pub bw: Option<f64>,
    pub storage: Option<f64>,
}
