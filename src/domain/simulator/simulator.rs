use std::collections::VecDeque;
use std::fmt;

use crate::domain::job::Job;
use crate::domain::machine::Machine;
use crate::domain::utils::id::MachineId;
use crate::error::{Error, Result};

/// Two events closer than this are treated as simultaneous.
const TIME_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Instantiated,
    Queued,
    InExecution,
    Success,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Instantiated => "INSTANTIATED",
            JobStatus::Queued => "QUEUED",
            JobStatus::InExecution => "INEXEC",
            JobStatus::Success => "SUCCESS",
            JobStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution history of one job inside the engine.
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub job: Job,
    pub status: JobStatus,
    pub machine: Option<MachineId>,
    pub submission_time: f64,
    pub exec_start_time: Option<f64>,
    pub finish_time: Option<f64>,
}

impl JobRecord {
    fn new(job: Job) -> Self {
        JobRecord { job, status: JobStatus::Instantiated, machine: None, submission_time: 0.0, exec_start_time: None, finish_time: None }
    }

    pub fn waiting_time(&self) -> f64 {
        self.exec_start_time.map_or(0.0, |start| start - self.submission_time)
    }

    pub fn exec_time(&self) -> f64 {
        match (self.exec_start_time, self.finish_time) {
            (Some(start), Some(finish)) => finish - start,
            _ => 0.0,
        }
    }

    /// Space-shared machines give a running job exclusive slots, so the compute time equals the
    /// wall time between start and finish.
    pub fn actual_cpu_time(&self) -> f64 {
        self.exec_time()
    }
}

/// Running mean and maximum of the CPU utilization samples of one machine.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CpuUtilizationStats {
    sum: f64,
    count: usize,
    max: f64,
}

impl CpuUtilizationStats {
    fn record(&mut self, utilization: f64) {
        self.sum += utilization;
        self.count += 1;
        self.max = self.max.max(utilization);
    }

    pub fn mean(&self) -> f64 {
        if self.count > 0 { self.sum / self.count as f64 } else { 0.0 }
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn sample_count(&self) -> usize {
        self.count
    }
}

/// Jobs executing on one machine at the moment of a clock tick.
#[derive(Debug)]
pub struct MachineSnapshot<'a> {
    pub machine: &'a Machine,
    pub running: Vec<&'a Job>,
}

#[derive(Debug, Clone, Copy)]
struct RunningJob {
    record: usize,
    finish_time: f64,
}

#[derive(Debug, Default)]
struct MachineState {
    queue: VecDeque<usize>,
    running: Vec<RunningJob>,
    used_slots: u32,
    cpu: CpuUtilizationStats,
}

/// Small discrete-event engine executing jobs on space-shared virtual machines.
///
/// All jobs are submitted at time 0. Each machine runs its jobs in FIFO order, a job starts as
/// soon as enough slots are free and runs for `length / (mips_per_slot * parallelism * cpu_util)`.
/// The clock advances to the next job completion or the next scheduling interval boundary,
/// whichever comes first. Every advance is a clock tick.
#[derive(Debug)]
pub struct Simulation {
    clock: f64,
    scheduling_interval: f64,
    machines: Vec<Machine>,
    states: Vec<MachineState>,
    records: Vec<JobRecord>,
}

impl Simulation {
    pub fn new(machines: Vec<Machine>, scheduling_interval: f64) -> Result<Self> {
        if !(scheduling_interval > 0.0) {
            return Err(Error::ConfigurationError(format!("scheduling interval must be positive, got {}", scheduling_interval)));
        }
        if let Some(machine) = machines.iter().find(|m| !(m.mips_per_slot > 0.0) || m.slots == 0) {
            return Err(Error::ConfigurationError(format!("machine {} has no processing capacity", machine.id)));
        }

        let states = machines.iter().map(|_| MachineState::default()).collect();
        Ok(Simulation { clock: 0.0, scheduling_interval, machines, states, records: Vec::new() })
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    /// Job records in submission order.
    pub fn job_records(&self) -> &[JobRecord] {
        &self.records
    }

    pub fn cpu_stats(&self, machine: MachineId) -> CpuUtilizationStats {
        self.machine_index(machine).map(|i| self.states[i].cpu).unwrap_or_default()
    }

    /// Submits `jobs` in the given order and runs until every job finished or failed.
    ///
    /// `dispatch` is called exactly once per job, in submission order, before the job can start.
    /// `on_clock_tick` is called after every clock advance with the jobs running at that time.
    /// Both are invoked on the calling thread.
    pub fn run<D, T>(&mut self, jobs: Vec<Job>, mut dispatch: D, mut on_clock_tick: T) -> Result<()>
    where
        D: FnMut(&Job, &[Machine]) -> Result<MachineId>,
        T: FnMut(f64, &[MachineSnapshot<'_>]),
    {
        self.submit(jobs, &mut dispatch)?;
        self.start_ready_jobs();
        self.tick(&mut on_clock_tick);

        while let Some(next_completion) = self.next_completion_time() {
            let next_boundary = ((self.clock / self.scheduling_interval).floor() + 1.0) * self.scheduling_interval;
            self.clock = next_completion.min(next_boundary).max(self.clock);

            self.complete_finished_jobs();
            self.start_ready_jobs();
            self.tick(&mut on_clock_tick);
        }

        log::debug!("Simulation finished at clock {:.2} with {} jobs.", self.clock, self.records.len());
        Ok(())
    }

    fn submit<D>(&mut self, jobs: Vec<Job>, dispatch: &mut D) -> Result<()>
    where
        D: FnMut(&Job, &[Machine]) -> Result<MachineId>,
    {
        for job in jobs {
            let mut record = JobRecord::new(job);
            record.submission_time = self.clock;

            let machine_id = dispatch(&record.job, &self.machines)?;
            let index = self
                .machine_index(machine_id)
                .ok_or_else(|| Error::ConfigurationError(format!("job {} was mapped to unknown machine {}", record.job.id, machine_id)))?;
            record.machine = Some(machine_id);

            let record_index = self.records.len();
            if record.job.parallelism > self.machines[index].slots {
                log::warn!(
                    "Job {} needs {} slots but machine {} only has {}. The job fails.",
                    record.job.id,
                    record.job.parallelism,
                    machine_id,
                    self.machines[index].slots
                );
                record.status = JobStatus::Failed;
            } else {
                record.status = JobStatus::Queued;
                self.states[index].queue.push_back(record_index);
            }
            self.records.push(record);
        }
        Ok(())
    }

    fn start_ready_jobs(&mut self) {
        for (machine, state) in self.machines.iter().zip(self.states.iter_mut()) {
            while let Some(&record_index) = state.queue.front() {
                let record = &mut self.records[record_index];
                if machine.slots - state.used_slots < record.job.parallelism {
                    break;
                }
                state.queue.pop_front();

                let rate = machine.mips_per_slot * record.job.parallelism as f64 * record.job.effective_cpu_utilization();
                let finish_time = self.clock + record.job.length as f64 / rate;

                record.status = JobStatus::InExecution;
                record.exec_start_time = Some(self.clock);
                state.used_slots += record.job.parallelism;
                state.running.push(RunningJob { record: record_index, finish_time });
            }
        }
    }

    fn complete_finished_jobs(&mut self) {
        let clock = self.clock;
        for state in self.states.iter_mut() {
            let records = &mut self.records;
            let mut used_slots = state.used_slots;
            state.running.retain(|running| {
                if running.finish_time > clock + TIME_EPSILON {
                    return true;
                }
                let record = &mut records[running.record];
                record.status = JobStatus::Success;
                record.finish_time = Some(running.finish_time.min(clock));
                used_slots -= record.job.parallelism;
                false
            });
            state.used_slots = used_slots;
        }
    }

    fn next_completion_time(&self) -> Option<f64> {
        self.states.iter().flat_map(|s| s.running.iter().map(|r| r.finish_time)).min_by(f64::total_cmp)
    }

    fn tick<T>(&mut self, on_clock_tick: &mut T)
    where
        T: FnMut(f64, &[MachineSnapshot<'_>]),
    {
        for (machine, state) in self.machines.iter().zip(self.states.iter_mut()) {
            let busy: f64 = state
                .running
                .iter()
                .map(|r| {
                    let job = &self.records[r.record].job;
                    job.parallelism as f64 * job.effective_cpu_utilization()
                })
                .sum();
            state.cpu.record((busy / machine.slots as f64).min(1.0));
        }

        let snapshots: Vec<MachineSnapshot<'_>> = self
            .machines
            .iter()
            .zip(self.states.iter())
            .map(|(machine, state)| MachineSnapshot { machine, running: state.running.iter().map(|r| &self.records[r.record].job).collect() })
            .collect();

        on_clock_tick(self.clock, &snapshots);
    }

    fn machine_index(&self, machine: MachineId) -> Option<usize> {
        self.machines.iter().position(|m| m.id == machine)
    }
}
