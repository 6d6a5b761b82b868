use serde::{Deserialize, Serialize};

/// One record of a job description file. Field names follow the files written by the workload
/// generator, so files produced by earlier tooling load unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDto {
    pub id: u64,
    pub workload_type: String,
    pub length: u64,
    pub pes: u32,
    pub file_size: u64,
    pub output_size: u64,
    pub cpu_util: f64,
    pub ram_util: f64,
    pub bw_util: f64,
}
