pub mod datacenter;
pub mod simulator;
