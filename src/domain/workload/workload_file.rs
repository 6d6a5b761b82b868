use std::path::{Path, PathBuf};

use crate::api::job_dto::JobDto;
use crate::domain::job::{Job, WorkloadType};
use crate::domain::workload::generator::{JobTemplate, WorkloadGenerator};
use crate::error::Result;
use crate::loader::parser::{parse_json_file, write_json_file};

/// Job counts of the default workload suite.
pub const SUITE_JOB_COUNTS: [usize; 3] = [200, 1000, 3000];
pub const SUITE_SEED: u64 = 2507;

/// Loads a job description file, keeping the ids stored in the file.
pub fn load_jobs(file_path: impl AsRef<Path>) -> Result<Vec<Job>> {
    let dtos: Vec<JobDto> = parse_json_file(file_path.as_ref())?;
    let jobs = dtos.into_iter().map(Job::try_from).collect::<Result<Vec<Job>>>()?;

    log::debug!("Loaded {} jobs from '{}'.", jobs.len(), file_path.as_ref().display());
    Ok(jobs)
}

pub fn write_jobs(file_path: impl AsRef<Path>, jobs: &[Job]) -> Result<()> {
    let dtos: Vec<JobDto> = jobs.iter().map(JobDto::from).collect();
    write_json_file(file_path, &dtos)
}

/// File name of a suite member, e.g. `tasks_200_cpu_heavy.json`.
pub fn suite_file_name(job_count: usize, workload_type: WorkloadType) -> String {
    format!("tasks_{}_{}.json", job_count, workload_type.as_tag().to_ascii_lowercase())
}

/// Writes one job description file per (job count, workload type) into `output_dir`.
///
/// A file that cannot be written is reported and skipped. Returns the files written.
pub fn generate_suite(output_dir: impl AsRef<Path>, job_counts: &[usize], seed: u64) -> Result<Vec<PathBuf>> {
    let output_dir = output_dir.as_ref();
    std::fs::create_dir_all(output_dir)?;

    let mut generator = WorkloadGenerator::new(seed);
    let mut written = Vec::new();

    for &job_count in job_counts {
        for workload_type in WorkloadType::ALL {
            let template = JobTemplate { workload_type, parallelism: 1, min_length: 500_000, max_length: 5_000_000, file_size: 300, output_size: 300 };
            generator.restart_ids();
            let jobs = generator.create_jobs(job_count, &template);

            let path = output_dir.join(suite_file_name(job_count, workload_type));
            match write_jobs(&path, &jobs) {
                Ok(()) => {
                    log::info!("Generated: {} ({} jobs)", path.display(), job_count);
                    written.push(path);
                }
                Err(e) => log::error!("Failed to write {}: {}", path.display(), e),
            }
        }
    }

    Ok(written)
}
