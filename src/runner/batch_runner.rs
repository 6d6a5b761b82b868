use std::any::Any;
use std::io::{IsTerminal, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

use crate::config::SimulationConfig;
use crate::domain::policy::PolicyType;
use crate::error::{Error, Result};
use crate::runner::progress::{ProgressMessage, ProgressReporter};
use crate::runner::scenario_runner::{ScenarioRunner, file_name_of};
use crate::runner::summary::{BatchSummary, RunResult};

pub const SUMMARY_CSV_FILE: &str = "batch_summary.csv";

/// One (workload file, policy) combination of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationTask {
    pub workload_file: PathBuf,
    pub policy: PolicyType,
}

/// Lists the job description files of `dir` in lexicographic order.
///
/// Only `.json` files are considered and `index_file` is skipped. A directory that cannot be listed
/// is reported and treated as empty.
pub fn discover_workload_files(dir: &Path, index_file: &str) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::error!("Could not list jobs directory {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .filter(|path| path.file_name().is_none_or(|name| name != index_file))
        .collect();
    files.sort();

    files
}

/// Cross product of workload files and policies, file-major.
pub fn build_tasks(files: &[PathBuf], policies: &[PolicyType]) -> Vec<SimulationTask> {
    files
        .iter()
        .flat_map(|file| policies.iter().map(move |policy| SimulationTask { workload_file: file.clone(), policy: *policy }))
        .collect()
}

/// Runs every task on a pool of `workers` threads and collects one [`RunResult`] per task.
///
/// Workers pull the next task index from a shared counter until the list is exhausted. Errors and
/// panics of `run_fn` are turned into failed results of that task only. Progress lines go to
/// `progress_out` through a single writer thread.
pub fn run_tasks<F, W>(tasks: &[SimulationTask], workers: usize, progress_out: W, run_fn: F) -> BatchSummary
where
    F: Fn(&SimulationTask) -> Result<()> + Sync,
    W: Write + Send + 'static,
{
    let total = tasks.len();
    let pool_size = workers.clamp(1, total.max(1));
    let next_task = AtomicUsize::new(0);
    let completed = AtomicUsize::new(0);
    let reporter = ProgressReporter::spawn(progress_out);

    let batch_start = Instant::now();

    let results: Vec<RunResult> = thread::scope(|scope| {
        let handles: Vec<_> = (0..pool_size)
            .map(|_| {
                let sender = reporter.sender();
                let (next_task, completed, run_fn) = (&next_task, &completed, &run_fn);

                scope.spawn(move || {
                    let mut local_results = Vec::new();

                    loop {
                        let index = next_task.fetch_add(1, Ordering::Relaxed);
                        let Some(task) = tasks.get(index) else { break };

                        let result = execute_task(task, run_fn);
                        let done = completed.fetch_add(1, Ordering::SeqCst) + 1;

                        let _ = sender.send(ProgressMessage::Completed {
                            done,
                            total,
                            workload: result.workload_file.clone(),
                            policy: result.policy.clone(),
                            elapsed: result.elapsed,
                        });
                        local_results.push(result);
                    }

                    local_results
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| match handle.join() {
                Ok(results) => results,
                Err(_) => {
                    log::error!("Batch worker thread terminated unexpectedly.");
                    Vec::new()
                }
            })
            .collect()
    });

    let wall_clock = batch_start.elapsed();
    reporter.finish();

    for result in &results {
        result.log_analytics();
    }

    BatchSummary::new(results, wall_clock)
}

fn execute_task<F>(task: &SimulationTask, run_fn: &F) -> RunResult
where
    F: Fn(&SimulationTask) -> Result<()>,
{
    let workload_name = file_name_of(&task.workload_file);
    let policy_name = task.policy.name().to_string();
    let start = Instant::now();

    let outcome = match panic::catch_unwind(AssertUnwindSafe(|| run_fn(task))) {
        Ok(outcome) => outcome,
        Err(payload) => Err(Error::TaskPanicked(panic_message(payload.as_ref()))),
    };
    let elapsed = start.elapsed();

    match outcome {
        Ok(()) => RunResult::succeeded(workload_name, policy_name, elapsed),
        Err(e) => {
            log::debug!("Task {} + {} failed: {}", workload_name, policy_name, e);
            RunResult::failed(workload_name, policy_name, elapsed, e.to_string())
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Runs every discovered workload with every policy and reports the outcome.
#[derive(Debug)]
pub struct BatchRunner<'c> {
    config: &'c SimulationConfig,
    policies: Vec<PolicyType>,
}

impl<'c> BatchRunner<'c> {
    pub fn new(config: &'c SimulationConfig) -> Self {
        Self { config, policies: PolicyType::ALL.to_vec() }
    }

    pub fn with_policies(mut self, policies: Vec<PolicyType>) -> Self {
        self.policies = policies;
        self
    }

    /// Executes the whole batch, prints the summary and writes it as CSV into the results directory.
    ///
    /// Returns `None` if the jobs directory holds no job description file.
    pub fn run(&self) -> Option<BatchSummary> {
        let config = self.config;

        println!("{}", "=".repeat(80));
        println!("BATCH SIMULATION RUNNER");
        println!("{}", "=".repeat(80));
        println!("Jobs directory: {}", config.jobs_dir.display());
        println!("Results directory: {}", config.results_dir.display());
        println!("Worker threads: {}", config.workers);

        let files = discover_workload_files(&config.jobs_dir, &config.index_file);
        if files.is_empty() {
            eprintln!("No job description files found in {}", config.jobs_dir.display());
            return None;
        }

        let tasks = build_tasks(&files, &self.policies);
        println!("Workload files: {}", files.len());
        println!("Policies: {}", self.policies.len());
        println!("Total simulations: {}\n", tasks.len());
        log::info!("Starting batch of {} simulations on {} workers.", tasks.len(), config.workers);

        let summary = run_tasks(&tasks, config.workers, std::io::stdout(), |task| {
            ScenarioRunner::new(config, task.policy.get_instance()).run(&task.workload_file, false).map(|_| ())
        });

        let stdout = std::io::stdout();
        let use_color = stdout.is_terminal();
        if let Err(e) = summary.write_report(&mut stdout.lock(), use_color) {
            log::error!("Failed to print batch summary: {}", e);
        }

        let csv_path = config.results_dir.join(SUMMARY_CSV_FILE);
        match summary.write_csv(&csv_path) {
            Ok(()) => println!("\nResults written to: {}", config.results_dir.display()),
            Err(e) => log::error!("Failed to write {}: {}", csv_path.display(), e),
        }

        log::info!(
            "Batch finished: {} succeeded, {} failed, speedup {:.2}x.",
            summary.success_count(),
            summary.failure_count(),
            summary.speedup()
        );

        Some(summary)
    }
}
