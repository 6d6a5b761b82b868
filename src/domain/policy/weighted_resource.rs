use std::collections::HashMap;

use crate::domain::job::Job;
use crate::domain::machine::Machine;
use crate::domain::policy::policy_trait::{MachineSelectionPolicy, ensure_machines_available};
use crate::domain::utils::id::MachineId;
use crate::error::Result;

/// Weights of the CPU and the RAM component of a load score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub cpu: f64,
    pub ram: f64,
}

impl ScoreWeights {
    pub const fn new(cpu: f64, ram: f64) -> Self {
        Self { cpu, ram }
    }
}

/// Demand the policy has assigned to one machine so far.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MachineLoad {
    /// Sum of the CPU demand (million instructions) of all assigned jobs.
    pub cpu: f64,
    /// Sum of the RAM utilization fractions of all assigned jobs.
    pub ram: f64,
    pub job_count: usize,
}

/// Selects machines based on a weighted score, considering both CPU and RAM.
/// Does NOT reorder the jobs.
///
/// The job is assigned to the least loaded machine according to
///
/// `score = W_cpu * (cpu_load / compute_capacity) + W_ram * (avg_ram_per_job * slots)`
///
/// Ties are resolved in favour of the machine that comes first in the given order.
#[derive(Debug)]
pub struct WeightedResourcePolicy {
    weights: ScoreWeights,
    loads: HashMap<MachineId, MachineLoad>,
}

impl Default for WeightedResourcePolicy {
    fn default() -> Self {
        Self::with_weights(Self::WEIGHTS)
    }
}

impl WeightedResourcePolicy {
    pub const WEIGHTS: ScoreWeights = ScoreWeights::new(4.0, 30.0);

    pub fn new() -> Self {
        Self::default()
    }

    /// Same dispatch logic with retuned weights.
    pub fn with_weights(weights: ScoreWeights) -> Self {
        Self { weights, loads: HashMap::new() }
    }

    pub fn weights(&self) -> ScoreWeights {
        self.weights
    }

    /// CPU demand of a job in million instructions, scaled up for jobs that only use a fraction of
    /// a slot.
    pub fn cpu_demand(job: &Job) -> f64 {
        job.length as f64 / job.effective_cpu_utilization()
    }

    pub fn ram_demand(job: &Job) -> f64 {
        job.ram_utilization
    }

    pub fn load_of(&self, machine: MachineId) -> MachineLoad {
        self.loads.get(&machine).copied().unwrap_or_default()
    }

    /// Lower score means less loaded.
    pub fn load_score(&self, machine: &Machine) -> f64 {
        let load = self.load_of(machine.id);

        // The work accumulates over time.
        let cpu_load_fraction = load.cpu / machine.compute_capacity();

        let avg_ram_per_job = if load.job_count > 0 { load.ram / load.job_count as f64 } else { 0.0 };
        let estimated_ram = avg_ram_per_job * machine.slots as f64;

        self.weights.cpu * cpu_load_fraction + self.weights.ram * estimated_ram
    }
}

impl MachineSelectionPolicy for WeightedResourcePolicy {
    fn name(&self) -> &'static str {
        "WeightedResourcePolicy"
    }

    fn select_machine_for(&mut self, job: &Job, machines: &[Machine]) -> Result<MachineId> {
        ensure_machines_available(job, machines)?;

        for machine in machines {
            self.loads.entry(machine.id).or_default();
        }

        let mut selected = machines[0].id;
        let mut lowest_score = f64::MAX;

        for machine in machines {
            let score = self.load_score(machine);
            if score < lowest_score {
                lowest_score = score;
                selected = machine.id;
            }
        }

        let load = self.loads.entry(selected).or_default();
        load.cpu += Self::cpu_demand(job);
        load.ram += Self::ram_demand(job);
        load.job_count += 1;

        log::trace!("Job {} -> machine {} (score {:.4}).", job.id, selected, lowest_score);
        Ok(selected)
    }
}
