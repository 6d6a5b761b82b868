pub mod job;
pub mod machine;
pub mod policy;
pub mod simulator;
pub mod utilization_tracker;
pub mod utils;
pub mod workload;
