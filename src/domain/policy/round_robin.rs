use crate::domain::job::Job;
use crate::domain::machine::Machine;
use crate::domain::policy::policy_trait::{MachineSelectionPolicy, ensure_machines_available};
use crate::domain::utils::id::MachineId;
use crate::error::Result;

/// Blindly circles through the machines in the given order. Does not reorder the jobs.
#[derive(Debug, Default)]
pub struct RoundRobinPolicy {
    next_index: usize,
}

impl RoundRobinPolicy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MachineSelectionPolicy for RoundRobinPolicy {
    fn name(&self) -> &'static str {
        "RoundRobinPolicy"
    }

    fn select_machine_for(&mut self, job: &Job, machines: &[Machine]) -> Result<MachineId> {
        ensure_machines_available(job, machines)?;

        // The pool size may differ from the previous call.
        let index = self.next_index % machines.len();
        self.next_index = (index + 1) % machines.len();

        Ok(machines[index].id)
    }
}
