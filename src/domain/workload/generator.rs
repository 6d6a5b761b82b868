use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::job::{Job, WorkloadType};
use crate::domain::utils::id::JobId;

/// Closed range a value is drawn from uniformly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtilizationRange {
    pub min: f64,
    pub max: f64,
}

const fn range(min: f64, max: f64) -> UtilizationRange {
    UtilizationRange { min, max }
}

/// Utilization ranges of one workload type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtilizationProfile {
    pub cpu: UtilizationRange,
    pub ram: UtilizationRange,
    pub bw: UtilizationRange,
}

impl UtilizationProfile {
    pub const fn of(workload_type: WorkloadType) -> Self {
        match workload_type {
            WorkloadType::CpuHeavy => UtilizationProfile { cpu: range(0.70, 1.00), ram: range(0.05, 0.20), bw: range(0.10, 0.30) },
            WorkloadType::RamHeavy => UtilizationProfile { cpu: range(0.20, 0.50), ram: range(0.40, 0.70), bw: range(0.20, 0.40) },
            WorkloadType::Balanced => UtilizationProfile { cpu: range(0.40, 0.80), ram: range(0.20, 0.50), bw: range(0.20, 0.60) },
        }
    }
}

/// Job lengths (million instructions) of the mixed-size workloads.
pub const SMALL_JOB_LENGTH: (u64, u64) = (1_000, 50_000);
pub const MEDIUM_JOB_LENGTH: (u64, u64) = (50_000, 500_000);
pub const LARGE_JOB_LENGTH: (u64, u64) = (500_000, 5_000_000);

/// Shape shared by all jobs of one generated batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JobTemplate {
    pub workload_type: WorkloadType,
    pub parallelism: u32,
    pub min_length: u64,
    pub max_length: u64,
    pub file_size: u64,
    pub output_size: u64,
}

/// Seeded generator of synthetic jobs with constant utilization profiles. The same seed always
/// yields the same jobs.
#[derive(Debug)]
pub struct WorkloadGenerator {
    rng: StdRng,
    next_id: u64,
}

impl WorkloadGenerator {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed), next_id: 0 }
    }

    /// Lets the next generated job start at id 0 again. The random sequence is not reset.
    pub fn restart_ids(&mut self) {
        self.next_id = 0;
    }

    /// Creates `count` jobs. Ids continue from the previously generated jobs of this generator.
    pub fn create_jobs(&mut self, count: usize, template: &JobTemplate) -> Vec<Job> {
        let profile = UtilizationProfile::of(template.workload_type);

        (0..count)
            .map(|_| {
                let length = self.random_length(template.min_length, template.max_length);
                let id = JobId::new(self.next_id);
                self.next_id += 1;

                Job {
                    id,
                    workload_type: template.workload_type,
                    length,
                    parallelism: template.parallelism,
                    file_size: template.file_size,
                    output_size: template.output_size,
                    cpu_utilization: self.random_between(profile.cpu),
                    ram_utilization: self.random_between(profile.ram),
                    bw_utilization: self.random_between(profile.bw),
                }
            })
            .collect()
    }

    /// Small, medium and large jobs of one workload type, in that order.
    pub fn create_mixed_size_jobs(&mut self, counts: (usize, usize, usize), template: &JobTemplate) -> Vec<Job> {
        let (small, medium, large) = counts;
        let mut jobs = Vec::with_capacity(small + medium + large);

        for (count, (min_length, max_length)) in [(small, SMALL_JOB_LENGTH), (medium, MEDIUM_JOB_LENGTH), (large, LARGE_JOB_LENGTH)] {
            jobs.extend(self.create_jobs(count, &JobTemplate { min_length, max_length, ..*template }));
        }
        jobs
    }

    fn random_length(&mut self, min: u64, max: u64) -> u64 {
        if max <= min {
            return min;
        }
        min + (self.rng.random::<f64>() * (max - min) as f64) as u64
    }

    fn random_between(&mut self, range: UtilizationRange) -> f64 {
        range.min + self.rng.random::<f64>() * (range.max - range.min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(workload_type: WorkloadType) -> JobTemplate {
        JobTemplate { workload_type, parallelism: 1, min_length: 500_000, max_length: 5_000_000, file_size: 300, output_size: 300 }
    }

    #[test]
    fn same_seed_generates_same_jobs() {
        let a = WorkloadGenerator::new(2507).create_jobs(50, &template(WorkloadType::Balanced));
        let b = WorkloadGenerator::new(2507).create_jobs(50, &template(WorkloadType::Balanced));
        assert_eq!(a, b);
    }

    #[test]
    fn values_stay_within_profile_ranges() {
        for workload_type in WorkloadType::ALL {
            let profile = UtilizationProfile::of(workload_type);
            let jobs = WorkloadGenerator::new(7).create_jobs(200, &template(workload_type));

            for job in &jobs {
                assert!((500_000..5_000_000).contains(&job.length));
                assert!(job.cpu_utilization >= profile.cpu.min && job.cpu_utilization <= profile.cpu.max);
                assert!(job.ram_utilization >= profile.ram.min && job.ram_utilization <= profile.ram.max);
                assert!(job.bw_utilization >= profile.bw.min && job.bw_utilization <= profile.bw.max);
            }
        }
    }

    #[test]
    fn ids_are_sequential_across_calls() {
        let mut generator = WorkloadGenerator::new(1);
        let jobs = generator.create_mixed_size_jobs((2, 2, 1), &template(WorkloadType::CpuHeavy));

        let ids: Vec<u64> = jobs.iter().map(|j| j.id.value()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        assert!(jobs[0].length < SMALL_JOB_LENGTH.1);
        assert!(jobs[4].length >= LARGE_JOB_LENGTH.0);
    }

    #[test]
    fn empty_length_range_uses_minimum() {
        let mut fixed = template(WorkloadType::RamHeavy);
        fixed.max_length = fixed.min_length;
        let jobs = WorkloadGenerator::new(3).create_jobs(5, &fixed);
        assert!(jobs.iter().all(|j| j.length == 500_000));
    }
}
