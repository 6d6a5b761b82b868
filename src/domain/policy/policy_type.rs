use std::fmt;
use std::str::FromStr;

use crate::domain::policy::policy_trait::MachineSelectionPolicy;
use crate::domain::policy::round_robin::RoundRobinPolicy;
use crate::domain::policy::sorted_best_fit::SortedTaskBestFitPolicy;
use crate::domain::policy::weighted_resource::WeightedResourcePolicy;
use crate::error::ConversionError;

/// Closed set of the available machine selection policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PolicyType {
    /// Cycles through the machines in pool order.
    RoundRobin,
    /// Least weighted CPU/RAM load score, arrival order kept.
    WeightedResource,
    /// Weighted scoring after sorting all jobs by ascending combined demand.
    SortedTaskBestFit,
}

impl PolicyType {
    /// Every policy a batch evaluates, in the order they are run per workload.
    pub const ALL: [PolicyType; 3] = [PolicyType::RoundRobin, PolicyType::WeightedResource, PolicyType::SortedTaskBestFit];

    /// Factory method returning a fresh, independent policy instance. Policies carry per-run state,
    /// so every scenario must obtain its own instance.
    pub fn get_instance(&self) -> Box<dyn MachineSelectionPolicy> {
        match self {
            PolicyType::RoundRobin => Box::new(RoundRobinPolicy::new()),
            PolicyType::WeightedResource => Box::new(WeightedResourcePolicy::new()),
            PolicyType::SortedTaskBestFit => Box::new(SortedTaskBestFitPolicy::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PolicyType::RoundRobin => "RoundRobinPolicy",
            PolicyType::WeightedResource => "WeightedResourcePolicy",
            PolicyType::SortedTaskBestFit => "SortedTaskBestFitPolicy",
        }
    }
}

impl fmt::Display for PolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PolicyType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<PolicyType, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "roundrobinpolicy" | "round-robin" | "roundrobin" => Ok(PolicyType::RoundRobin),
            "weightedresourcepolicy" | "weighted" | "weighted-resource" => Ok(PolicyType::WeightedResource),
            "sortedtaskbestfitpolicy" | "best-fit" | "sorted-best-fit" => Ok(PolicyType::SortedTaskBestFit),
            _ => Err(ConversionError::UnknownPolicyType(s.to_string())),
        }
    }
}
