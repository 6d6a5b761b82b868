use serde::{Deserialize, Serialize};

/// Per-job outcome of one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatsDto {
    pub id: u64,
    pub status: String,
    /// `-1` if the job was never mapped to a machine.
    pub vm_id: i64,
    pub waiting_time: f64,
    pub finish_time: f64,
    pub exec_time: f64,
    pub actual_cpu_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCompletionReportDto {
    pub policy: String,
    pub workload_file: String,
    pub makespan: f64,
    pub simulation_clock: f64,
    pub total_tasks: usize,
    pub tasks: Vec<TaskStatsDto>,
}

impl TaskCompletionReportDto {
    pub fn new(policy: &str, workload_file: &str, simulation_clock: f64, tasks: Vec<TaskStatsDto>) -> Self {
        let makespan = tasks.iter().map(|t| t.finish_time).fold(0.0, f64::max);

        Self {
            policy: policy.to_string(),
            workload_file: workload_file.to_string(),
            makespan,
            simulation_clock,
            total_tasks: tasks.len(),
            tasks,
        }
    }
}

/// Per-machine utilization of one scenario. All values are percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmStatsDto {
    pub vm_id: u64,
    pub avg_cpu_percent: f64,
    pub peak_cpu_percent: f64,
    pub avg_ram_percent: f64,
    pub peak_ram_percent: f64,
    pub task_count: usize,
    pub ram_samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineUtilizationReportDto {
    pub policy: String,
    pub workload_file: String,
    pub vm_count: usize,
    pub vms: Vec<VmStatsDto>,
    pub avg_cluster_cpu_percent: f64,
    pub avg_cluster_ram_percent: f64,
}

impl MachineUtilizationReportDto {
    pub fn new(policy: &str, workload_file: &str, vms: Vec<VmStatsDto>) -> Self {
        let avg_cluster_cpu_percent = mean(vms.iter().map(|v| v.avg_cpu_percent));
        let avg_cluster_ram_percent = mean(vms.iter().map(|v| v.avg_ram_percent));

        Self {
            policy: policy.to_string(),
            workload_file: workload_file.to_string(),
            vm_count: vms.len(),
            vms,
            avg_cluster_cpu_percent,
            avg_cluster_ram_percent,
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count > 0 { sum / count as f64 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vm(vm_id: u64, avg_cpu: f64, avg_ram: f64) -> VmStatsDto {
        VmStatsDto {
            vm_id,
            avg_cpu_percent: avg_cpu,
            peak_cpu_percent: avg_cpu,
            avg_ram_percent: avg_ram,
            peak_ram_percent: avg_ram,
            task_count: 1,
            ram_samples: 1,
        }
    }

    #[test]
    fn cluster_averages_are_means_of_machine_averages() {
        let report = MachineUtilizationReportDto::new("RoundRobinPolicy", "tasks.json", vec![vm(0, 50.0, 10.0), vm(1, 100.0, 30.0)]);

        assert_eq!(report.vm_count, 2);
        assert!((report.avg_cluster_cpu_percent - 75.0).abs() < 1e-9);
        assert!((report.avg_cluster_ram_percent - 20.0).abs() < 1e-9);
    }

    #[test]
    fn empty_machine_list_reports_zero_averages() {
        let report = MachineUtilizationReportDto::new("p", "w", vec![]);
        assert_eq!(report.avg_cluster_cpu_percent, 0.0);
        assert_eq!(report.avg_cluster_ram_percent, 0.0);
    }

    #[test]
    fn makespan_is_latest_finish_and_keys_are_camel_case() {
        let task = |id, finish_time| TaskStatsDto {
            id,
            status: "SUCCESS".to_string(),
            vm_id: 0,
            waiting_time: 0.0,
            finish_time,
            exec_time: finish_time,
            actual_cpu_time: finish_time,
        };
        let report = TaskCompletionReportDto::new("WeightedResourcePolicy", "tasks_200_balanced.json", 12.0, vec![task(0, 4.5), task(1, 11.0)]);

        assert_eq!(report.makespan, 11.0);
        assert_eq!(report.total_tasks, 2);

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("simulationClock").is_some());
        assert!(json["tasks"][0].get("actualCpuTime").is_some());
        assert_eq!(json["tasks"][1]["vmId"], 0);
    }
}
