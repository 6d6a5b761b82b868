use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use cluster_policy_bench::config::SimulationConfig;
use cluster_policy_bench::domain::job::{Job, WorkloadType};
use cluster_policy_bench::domain::policy::PolicyType;
use cluster_policy_bench::domain::utils::id::JobId;
use cluster_policy_bench::domain::workload::workload_file::write_jobs;
use cluster_policy_bench::error::Error;
use cluster_policy_bench::runner::batch_runner::{BatchRunner, SUMMARY_CSV_FILE, SimulationTask, build_tasks, discover_workload_files, run_tasks};

struct ScratchDir(PathBuf);

impl ScratchDir {
    fn new() -> Self {
        let path = std::env::temp_dir().join(format!("batch-runner-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(path.join("tasks")).unwrap();
        ScratchDir(path)
    }

    fn tasks_dir(&self) -> PathBuf {
        self.0.join("tasks")
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

fn write_workload(dir: &Path, name: &str, count: u64) {
    let jobs: Vec<Job> = (0..count)
        .map(|id| Job {
            id: JobId::new(id),
            workload_type: WorkloadType::CpuHeavy,
            length: 8_000 + 500 * (id % 5),
            parallelism: 1,
            file_size: 300,
            output_size: 300,
            cpu_utilization: 0.8,
            ram_utilization: 0.1,
            bw_utilization: 0.2,
        })
        .collect();
    write_jobs(dir.join(name), &jobs).unwrap();
}

fn fake_tasks(count: usize) -> Vec<SimulationTask> {
    (0..count).map(|i| SimulationTask { workload_file: PathBuf::from(format!("tasks_{:02}.json", i)), policy: PolicyType::RoundRobin }).collect()
}

#[test]
fn test_discovery_sorts_and_skips_index_and_foreign_files() {
    let dir = ScratchDir::new();
    let tasks_dir = dir.tasks_dir();
    for name in ["b.json", "a.json", "tasks.json"] {
        std::fs::write(tasks_dir.join(name), "[]").unwrap();
    }
    std::fs::write(tasks_dir.join("notes.txt"), "not a workload").unwrap();
    std::fs::create_dir_all(tasks_dir.join("nested.json")).unwrap();

    let files = discover_workload_files(&tasks_dir, "tasks.json");

    assert_eq!(files, vec![tasks_dir.join("a.json"), tasks_dir.join("b.json")]);
}

#[test]
fn test_discovery_of_missing_directory_is_empty() {
    let dir = ScratchDir::new();
    assert!(discover_workload_files(&dir.0.join("does-not-exist"), "tasks.json").is_empty());
}

#[test]
fn test_task_set_is_cross_product() {
    let files = vec![PathBuf::from("a.json"), PathBuf::from("b.json")];
    let tasks = build_tasks(&files, &PolicyType::ALL);

    assert_eq!(tasks.len(), 6);
    assert_eq!(tasks[0], SimulationTask { workload_file: PathBuf::from("a.json"), policy: PolicyType::RoundRobin });
    assert_eq!(tasks[5], SimulationTask { workload_file: PathBuf::from("b.json"), policy: PolicyType::SortedTaskBestFit });
}

#[test]
fn test_single_failure_does_not_affect_siblings() {
    let tasks = fake_tasks(10);

    let summary = run_tasks(&tasks, 4, std::io::sink(), |task| {
        if task.workload_file == Path::new("tasks_03.json") {
            return Err(Error::ConfigurationError("No machines available for mapping job 0".to_string()));
        }
        Ok(())
    });

    assert_eq!(summary.total(), 10);
    assert_eq!(summary.success_count(), 9);
    assert_eq!(summary.failure_count(), 1);

    let failed: Vec<_> = summary.results().iter().filter(|r| !r.success).collect();
    assert_eq!(failed[0].workload_file, "tasks_03.json");
    assert!(failed[0].error_message.as_deref().is_some_and(|m| m.contains("No machines available")));
}

#[test]
fn test_panicking_task_is_recorded_as_failure() {
    let tasks = fake_tasks(4);

    let summary = run_tasks(&tasks, 2, std::io::sink(), |task| {
        if task.workload_file == Path::new("tasks_01.json") {
            panic!("scenario blew up");
        }
        Ok(())
    });

    assert_eq!(summary.success_count(), 3);
    let failed = summary.results().iter().find(|r| !r.success).unwrap();
    assert!(failed.error_message.as_deref().is_some_and(|m| m.contains("scenario blew up")), "{:?}", failed);
}

#[test]
fn test_results_are_sorted_regardless_of_completion_order() {
    let tasks = fake_tasks(6);

    // Later tasks finish first.
    let summary = run_tasks(&tasks, 6, std::io::sink(), |task| {
        let index: u64 = task.workload_file.to_string_lossy()[6..8].parse().unwrap();
        thread::sleep(Duration::from_millis(60 - 10 * index));
        Ok(())
    });

    let order: Vec<&str> = summary.results().iter().map(|r| r.workload_file.as_str()).collect();
    assert_eq!(order, vec!["tasks_00.json", "tasks_01.json", "tasks_02.json", "tasks_03.json", "tasks_04.json", "tasks_05.json"]);
}

#[test]
fn test_speedup_approaches_pool_size() {
    let tasks = fake_tasks(8);

    let summary = run_tasks(&tasks, 4, std::io::sink(), |_| {
        thread::sleep(Duration::from_millis(150));
        Ok(())
    });

    let speedup = summary.speedup();
    assert!(summary.wall_clock >= Duration::from_millis(300));
    assert!(speedup > 2.5 && speedup <= 4.2, "unexpected speedup {:.2}", speedup);
}

#[test]
fn test_batch_is_deterministic_and_isolates_malformed_files() {
    let dir = ScratchDir::new();
    write_workload(&dir.tasks_dir(), "tasks_12_cpu_heavy.json", 12);
    write_workload(&dir.tasks_dir(), "tasks_30_cpu_heavy.json", 30);
    std::fs::write(dir.tasks_dir().join("broken.json"), "{ not json").unwrap();
    std::fs::write(dir.tasks_dir().join("tasks.json"), "[]").unwrap();

    let config = SimulationConfig { jobs_dir: dir.tasks_dir(), results_dir: dir.0.join("results"), workers: 3, ..SimulationConfig::default() };

    let first = BatchRunner::new(&config).run().unwrap();
    let second = BatchRunner::new(&config).run().unwrap();

    let outline = |summary: &cluster_policy_bench::runner::summary::BatchSummary| {
        summary.results().iter().map(|r| (r.workload_file.clone(), r.policy.clone(), r.success)).collect::<Vec<_>>()
    };
    assert_eq!(outline(&first), outline(&second));

    assert_eq!(first.total(), 9);
    assert_eq!(first.failure_count(), 3);
    assert!(first.results()[..3].iter().all(|r| r.workload_file == "broken.json" && !r.success));
    assert!(first.results()[..3].iter().all(|r| r.error_message.as_deref().is_some_and(|m| !m.is_empty())));
    assert!(first.results()[3..].iter().all(|r| r.success));

    assert!(config.results_dir.join(SUMMARY_CSV_FILE).is_file());
    assert!(config.results_dir.join("tasks_30_cpu_heavy_SortedTaskBestFitPolicy_task_stats.json").is_file());
}

#[test]
fn test_batch_without_workloads_aborts() {
    let dir = ScratchDir::new();
    let config = SimulationConfig { jobs_dir: dir.tasks_dir(), results_dir: dir.0.join("results"), ..SimulationConfig::default() };

    assert!(BatchRunner::new(&config).run().is_none());
    assert!(!config.results_dir.exists());
}
