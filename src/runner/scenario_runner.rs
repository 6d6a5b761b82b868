use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::api::report_dto::{MachineUtilizationReportDto, TaskCompletionReportDto, TaskStatsDto, VmStatsDto};
use crate::config::SimulationConfig;
use crate::domain::machine::Machine;
use crate::domain::policy::MachineSelectionPolicy;
use crate::domain::simulator::datacenter::Datacenter;
use crate::domain::simulator::simulator::Simulation;
use crate::domain::utilization_tracker::RamUtilizationTracker;
use crate::domain::workload::workload_file::load_jobs;
use crate::error::Result;
use crate::loader::parser::write_json_file;

/// Reports of one finished scenario and where they were written.
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub task_report: TaskCompletionReportDto,
    pub machine_report: MachineUtilizationReportDto,
    pub task_report_path: PathBuf,
    pub machine_report_path: PathBuf,
}

/// Runs one workload with one policy on a freshly built cluster.
#[derive(Debug)]
pub struct ScenarioRunner<'c> {
    config: &'c SimulationConfig,
    policy: Box<dyn MachineSelectionPolicy>,
    tracker: RamUtilizationTracker,
}

impl<'c> ScenarioRunner<'c> {
    pub fn new(config: &'c SimulationConfig, policy: Box<dyn MachineSelectionPolicy>) -> Self {
        let tracker = RamUtilizationTracker::new(config.ram_sample_interval);
        Self { config, policy, tracker }
    }

    /// Executes the scenario and writes the task and machine reports into the results directory.
    ///
    /// With `console_output` the per-job and per-machine tables are printed to stdout as well.
    pub fn run(mut self, workload_file: &Path, console_output: bool) -> Result<ScenarioOutcome> {
        let start = Instant::now();
        let policy_name = self.policy.name();
        let workload_name = file_name_of(workload_file);

        let machines = Machine::pool_from_config(&self.config.vms);
        let mut datacenter = Datacenter::from_config(&self.config.hosts);
        datacenter.place_machines(&machines)?;

        let mut simulation = Simulation::new(machines, self.config.scheduling_interval)?;

        let mut jobs = load_jobs(workload_file)?;
        self.policy.presort_jobs(&mut jobs);

        let policy = &mut self.policy;
        let tracker = &mut self.tracker;
        simulation.run(jobs, |job, machines| policy.select_machine_for(job, machines), |time, snapshots| tracker.record_snapshot(snapshots, time))?;

        let task_report = self.task_report(&simulation, &workload_name);
        let machine_report = self.machine_report(&simulation, &workload_name);

        let base_name = workload_name.strip_suffix(".json").unwrap_or(&workload_name);
        let task_report_path = self.config.results_dir.join(format!("{}_{}_task_stats.json", base_name, policy_name));
        let machine_report_path = self.config.results_dir.join(format!("{}_{}_machine_stats.json", base_name, policy_name));
        write_json_file(&task_report_path, &task_report)?;
        write_json_file(&machine_report_path, &machine_report)?;

        let elapsed = start.elapsed();
        log::debug!(
            "Scenario {} + {} finished: makespan {:.2}, {} jobs, {} ms.",
            workload_name,
            policy_name,
            task_report.makespan,
            task_report.total_tasks,
            elapsed.as_millis()
        );

        if console_output {
            print_task_table(&task_report);
            print_machine_table(&machine_report);
            println!("\nTotal simulated completion time (makespan): {:.2} seconds", task_report.makespan);
            println!("Simulation clock at end: {:.2} seconds", task_report.simulation_clock);
            println!("Real-world execution time: {} ms ({:.2} seconds)", elapsed.as_millis(), elapsed.as_secs_f64());
            println!("\nTask stats written to: {}", task_report_path.display());
            println!("Machine stats written to: {}", machine_report_path.display());
        }

        Ok(ScenarioOutcome { task_report, machine_report, task_report_path, machine_report_path })
    }

    fn task_report(&self, simulation: &Simulation, workload_name: &str) -> TaskCompletionReportDto {
        let tasks = simulation
            .job_records()
            .iter()
            .map(|record| TaskStatsDto {
                id: record.job.id.value(),
                status: record.status.to_string(),
                vm_id: record.machine.map_or(-1, |m| m.value() as i64),
                waiting_time: record.waiting_time(),
                finish_time: record.finish_time.unwrap_or(0.0),
                exec_time: record.exec_time(),
                actual_cpu_time: record.actual_cpu_time(),
            })
            .collect();

        TaskCompletionReportDto::new(self.policy.name(), workload_name, simulation.clock(), tasks)
    }

    fn machine_report(&self, simulation: &Simulation, workload_name: &str) -> MachineUtilizationReportDto {
        let vms = simulation
            .machines()
            .iter()
            .map(|machine| {
                let cpu = simulation.cpu_stats(machine.id);
                VmStatsDto {
                    vm_id: machine.id.value(),
                    avg_cpu_percent: cpu.mean() * 100.0,
                    peak_cpu_percent: cpu.max() * 100.0,
                    avg_ram_percent: self.tracker.average_utilization(machine.id) * 100.0,
                    peak_ram_percent: self.tracker.peak_utilization(machine.id) * 100.0,
                    task_count: simulation.job_records().iter().filter(|r| r.machine == Some(machine.id)).count(),
                    ram_samples: self.tracker.sample_count(machine.id),
                }
            })
            .collect();

        MachineUtilizationReportDto::new(self.policy.name(), workload_name, vms)
    }
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| path.display().to_string())
}

fn print_task_table(report: &TaskCompletionReportDto) {
    println!("Job execution results");
    println!("ID\tStatus\tVM\tWait\tFinish\tExecTime\tActualCpuTime");
    for task in &report.tasks {
        println!(
            "{:3}\t{}\t{:3}\t{:7.2}\t{:7.2}\t{:9.2}\t{:13.2}",
            task.id, task.status, task.vm_id, task.waiting_time, task.finish_time, task.exec_time, task.actual_cpu_time
        );
    }
}

fn print_machine_table(report: &MachineUtilizationReportDto) {
    println!("\nMachine resource usage summary");
    println!("VM\tAvgCPU%\tPeakCPU%\tAvgRAM%\tPeakRAM%\tJobCount\tSamples");
    for vm in &report.vms {
        println!(
            "{:3}\t{:7.2}\t{:8.2}\t{:7.2}\t{:8.2}\t{:9}\t{:7}",
            vm.vm_id, vm.avg_cpu_percent, vm.peak_cpu_percent, vm.avg_ram_percent, vm.peak_ram_percent, vm.task_count, vm.ram_samples
        );
    }
}
