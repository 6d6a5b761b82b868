pub mod policy_trait;
pub mod policy_type;
pub mod round_robin;
pub mod sorted_best_fit;
pub mod weighted_resource;

pub use policy_trait::MachineSelectionPolicy;
pub use policy_type::PolicyType;
