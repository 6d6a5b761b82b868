use crate::domain::job::Job;
use crate::domain::machine::Machine;
use crate::domain::policy::policy_trait::MachineSelectionPolicy;
use crate::domain::policy::weighted_resource::{ScoreWeights, WeightedResourcePolicy};
use crate::domain::utils::id::MachineId;
use crate::error::Result;

/// Sorted job best-fit.
///
/// 1. Pre-sort all jobs by combined demand `W_cpu * cpu_demand + W_ram * ram_demand`, ascending,
///    so light jobs are handled first.
/// 2. Dispatch every job (in sorted order) with the weighted scoring of
///    [`WeightedResourcePolicy`], using this policy's own weights.
#[derive(Debug)]
pub struct SortedTaskBestFitPolicy {
    dispatch: WeightedResourcePolicy,
}

impl Default for SortedTaskBestFitPolicy {
    fn default() -> Self {
        Self { dispatch: WeightedResourcePolicy::with_weights(Self::WEIGHTS) }
    }
}

impl SortedTaskBestFitPolicy {
    pub const WEIGHTS: ScoreWeights = ScoreWeights::new(6.0, 3.0 * 16_000.0);

    pub fn new() -> Self {
        Self::default()
    }

    pub fn combined_demand(job: &Job) -> f64 {
        Self::WEIGHTS.cpu * WeightedResourcePolicy::cpu_demand(job) + Self::WEIGHTS.ram * WeightedResourcePolicy::ram_demand(job)
    }

    /// Read access to the dispatch state, mainly for inspection in tests.
    pub fn dispatch(&self) -> &WeightedResourcePolicy {
        &self.dispatch
    }
}

impl MachineSelectionPolicy for SortedTaskBestFitPolicy {
    fn name(&self) -> &'static str {
        "SortedTaskBestFitPolicy"
    }

    fn select_machine_for(&mut self, job: &Job, machines: &[Machine]) -> Result<MachineId> {
        self.dispatch.select_machine_for(job, machines)
    }

    fn presort_jobs(&self, jobs: &mut [Job]) {
        // `sort_by` is stable: jobs with equal demand keep their relative order.
        jobs.sort_by(|a, b| Self::combined_demand(a).total_cmp(&Self::combined_demand(b)));
        log::debug!("Pre-sorted {} jobs by combined demand.", jobs.len());
    }
}
