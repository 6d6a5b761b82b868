use std::fmt::Debug;

use crate::domain::job::Job;
use crate::domain::machine::Machine;
use crate::domain::utils::id::MachineId;
use crate::error::{Error, Result};

/// Strategy mapping each arriving job onto one machine of a fixed pool.
///
/// A policy is stateful and owned by exactly one scenario. It is invoked synchronously by the
/// engine, once per job, before the job starts executing.
pub trait MachineSelectionPolicy: Debug + Send {
    /// Name used in reports, summaries and result file names.
    fn name(&self) -> &'static str;

    /// Chooses the machine `job` is executed on and records the assignment in the policy state.
    ///
    /// Fails with [`Error::ConfigurationError`] if `machines` is empty.
    fn select_machine_for(&mut self, job: &Job, machines: &[Machine]) -> Result<MachineId>;

    /// Called once before the first [`Self::select_machine_for`]. May reorder the arrival order.
    fn presort_jobs(&self, _jobs: &mut [Job]) {}
}

pub(crate) fn ensure_machines_available(job: &Job, machines: &[Machine]) -> Result<()> {
    if machines.is_empty() {
        return Err(Error::ConfigurationError(format!("No machines available for mapping job {}", job.id)));
    }
    Ok(())
}
