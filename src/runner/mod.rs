pub mod batch_runner;
pub mod progress;
pub mod scenario_runner;
pub mod summary;
