use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use colored::Colorize;
use serde::Serialize;

use crate::error::Result;
use crate::runner::progress::truncate;

/// Target of the structured per-run events.
pub const ANALYTICS_TARGET: &str = "analytics";

const RULE_WIDTH: usize = 80;

/// Outcome of one (workload, policy) execution.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    pub workload_file: String,
    pub policy: String,
    pub success: bool,
    pub elapsed: Duration,
    pub error_message: Option<String>,
}

impl RunResult {
    pub fn succeeded(workload_file: String, policy: String, elapsed: Duration) -> Self {
        RunResult { workload_file, policy, success: true, elapsed, error_message: None }
    }

    pub fn failed(workload_file: String, policy: String, elapsed: Duration, error_message: String) -> Self {
        RunResult { workload_file, policy, success: false, elapsed, error_message: Some(error_message) }
    }

    /// Emits the structured event describing this run.
    pub fn log_analytics(&self) {
        if self.success {
            tracing::info!(
                target: ANALYTICS_TARGET,
                workload = %self.workload_file,
                policy = %self.policy,
                success = self.success,
                elapsed_ms = self.elapsed.as_millis() as u64,
                "run finished"
            );
        } else {
            tracing::warn!(
                target: ANALYTICS_TARGET,
                workload = %self.workload_file,
                policy = %self.policy,
                success = self.success,
                elapsed_ms = self.elapsed.as_millis() as u64,
                error = self.error_message.as_deref().unwrap_or(""),
                "run failed"
            );
        }
    }
}

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    workload_file: &'a str,
    policy: &'a str,
    status: &'a str,
    elapsed_ms: u64,
    error: &'a str,
}

/// Results of a whole batch, sorted by (workload file, policy name).
#[derive(Debug, Clone)]
pub struct BatchSummary {
    results: Vec<RunResult>,
    pub wall_clock: Duration,
}

impl BatchSummary {
    /// Sorts `results` into the canonical summary order, independent of completion order.
    pub fn new(mut results: Vec<RunResult>, wall_clock: Duration) -> Self {
        results.sort_by(|a, b| a.workload_file.cmp(&b.workload_file).then_with(|| a.policy.cmp(&b.policy)));
        BatchSummary { results, wall_clock }
    }

    pub fn results(&self) -> &[RunResult] {
        &self.results
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn failure_count(&self) -> usize {
        self.total() - self.success_count()
    }

    /// Sum of the individual run times.
    pub fn total_run_time(&self) -> Duration {
        self.results.iter().map(|r| r.elapsed).sum()
    }

    /// `sum(individual elapsed) / wall clock`. Zero if the batch took no measurable time.
    pub fn speedup(&self) -> f64 {
        let wall = self.wall_clock.as_secs_f64();
        if wall > 0.0 { self.total_run_time().as_secs_f64() / wall } else { 0.0 }
    }

    /// Fixed-width, human-readable summary.
    pub fn write_report<W: Write>(&self, out: &mut W, use_color: bool) -> io::Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        let thin_rule = "-".repeat(RULE_WIDTH);

        writeln!(out)?;
        writeln!(out, "{}", rule)?;
        writeln!(out, "BATCH SIMULATION SUMMARY")?;
        writeln!(out, "{}", rule)?;
        writeln!(out)?;
        writeln!(out, "Total simulations: {}", self.total())?;
        writeln!(out, "Successful: {}", self.success_count())?;
        writeln!(out, "Failed: {}", self.failure_count())?;
        writeln!(out)?;

        writeln!(out, "Execution Times:")?;
        writeln!(out, "{}", thin_rule)?;
        writeln!(out, "{:<35} {:<30} {:>10} {:>8}", "Task File", "Policy", "Time (ms)", "Status")?;
        writeln!(out, "{}", thin_rule)?;

        for result in &self.results {
            let status = format!("{:>8}", if result.success { "OK" } else { "FAILED" });
            let status = match (use_color, result.success) {
                (false, _) => status,
                (true, true) => status.green().to_string(),
                (true, false) => status.red().to_string(),
            };
            writeln!(
                out,
                "{:<35} {:<30} {:>10} {}",
                truncate(&result.workload_file, 35),
                truncate(&result.policy, 30),
                result.elapsed.as_millis(),
                status
            )?;
        }

        writeln!(out, "{}", thin_rule)?;

        let total = self.total_run_time();
        writeln!(out, "Sum of individual times: {} ms ({:.2} seconds)", total.as_millis(), total.as_secs_f64())?;
        writeln!(out, "Actual wall-clock time:  {} ms ({:.2} seconds)", self.wall_clock.as_millis(), self.wall_clock.as_secs_f64())?;
        writeln!(out, "Parallel speedup:        {:.2}x", self.speedup())?;

        if self.failure_count() > 0 {
            writeln!(out)?;
            writeln!(out, "ERRORS:")?;
            for result in self.results.iter().filter(|r| !r.success) {
                writeln!(out, "  - {} + {}: {}", result.workload_file, result.policy, result.error_message.as_deref().unwrap_or("unknown error"))?;
            }
        }

        Ok(())
    }

    /// Writes one `;` separated row per run.
    pub fn write_csv(&self, file_path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = file_path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut csv_wtr = csv::WriterBuilder::new().delimiter(b';').from_path(file_path.as_ref())?;
        for result in &self.results {
            csv_wtr.serialize(SummaryRow {
                workload_file: &result.workload_file,
                policy: &result.policy,
                status: if result.success { "OK" } else { "FAILED" },
                elapsed_ms: result.elapsed.as_millis() as u64,
                error: result.error_message.as_deref().unwrap_or(""),
            })?;
        }
        csv_wtr.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn ok(workload: &str, policy: &str, ms: u64) -> RunResult {
        RunResult::succeeded(workload.to_string(), policy.to_string(), Duration::from_millis(ms))
    }

    #[test]
    fn results_are_sorted_by_workload_then_policy() {
        let summary = BatchSummary::new(
            vec![ok("b.json", "WeightedResourcePolicy", 1), ok("a.json", "WeightedResourcePolicy", 1), ok("a.json", "RoundRobinPolicy", 1)],
            Duration::from_millis(1),
        );

        let order: Vec<(&str, &str)> = summary.results().iter().map(|r| (r.workload_file.as_str(), r.policy.as_str())).collect();
        assert_eq!(order, vec![("a.json", "RoundRobinPolicy"), ("a.json", "WeightedResourcePolicy"), ("b.json", "WeightedResourcePolicy")]);
    }

    #[test]
    fn speedup_is_sum_of_runs_over_wall_clock() {
        let summary = BatchSummary::new(vec![ok("a", "p", 400), ok("b", "p", 400)], Duration::from_millis(200));
        assert!((summary.speedup() - 4.0).abs() < 1e-9);

        let instant = BatchSummary::new(vec![ok("a", "p", 0)], Duration::ZERO);
        assert_eq!(instant.speedup(), 0.0);
    }

    #[test]
    fn report_lists_every_failure() {
        let failed = RunResult::failed("broken.json".to_string(), "RoundRobinPolicy".to_string(), Duration::from_millis(3), "bad json".to_string());
        let summary = BatchSummary::new(vec![ok("a.json", "RoundRobinPolicy", 10), failed], Duration::from_millis(10));

        let mut out = Vec::new();
        summary.write_report(&mut out, false).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Total simulations: 2"));
        assert!(text.contains("Failed: 1"));
        assert!(text.contains("ERRORS:"));
        assert!(text.contains("  - broken.json + RoundRobinPolicy: bad json"));
        assert!(text.contains("Parallel speedup:        1.30x"));
    }

    #[test]
    fn csv_export_has_header_and_one_row_per_run() {
        let path = std::env::temp_dir().join(format!("summary-{}", uuid::Uuid::new_v4())).join("batch_summary.csv");
        let summary = BatchSummary::new(vec![ok("a.json", "RoundRobinPolicy", 10), ok("b.json", "RoundRobinPolicy", 12)], Duration::from_millis(20));

        summary.write_csv(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "workload_file;policy;status;elapsed_ms;error");
        assert_eq!(lines[1], "a.json;RoundRobinPolicy;OK;10;");
        assert_eq!(lines.len(), 3);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    #[traced_test]
    fn failed_run_emits_analytics_warning() {
        RunResult::failed("tasks_200_balanced.json".to_string(), "WeightedResourcePolicy".to_string(), Duration::from_millis(1), "disk gone".to_string())
            .log_analytics();

        assert!(logs_contain("run failed"));
        assert!(logs_contain("disk gone"));
    }
}
