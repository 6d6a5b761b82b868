pub mod generator;
pub mod workload_file;
