use std::fmt;
use std::str::FromStr;

use crate::api::job_dto::JobDto;
use crate::domain::utils::id::JobId;
use crate::error::{ConversionError, Error};

/// Lower bound applied to the CPU utilization before it is used as a divisor.
pub const MIN_CPU_UTILIZATION: f64 = 0.01;

/// Shape of a generated workload. Only used as a tag in job description files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkloadType {
    Balanced,
    CpuHeavy,
    RamHeavy,
}

impl WorkloadType {
    pub const ALL: [WorkloadType; 3] = [WorkloadType::Balanced, WorkloadType::CpuHeavy, WorkloadType::RamHeavy];

    /// Tag used inside job description files.
    pub fn as_tag(&self) -> &'static str {
        match self {
            WorkloadType::Balanced => "BALANCED",
            WorkloadType::CpuHeavy => "CPU_HEAVY",
            WorkloadType::RamHeavy => "RAM_HEAVY",
        }
    }
}

impl fmt::Display for WorkloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl FromStr for WorkloadType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "BALANCED" => Ok(WorkloadType::Balanced),
            "CPU_HEAVY" => Ok(WorkloadType::CpuHeavy),
            "RAM_HEAVY" => Ok(WorkloadType::RamHeavy),
            _ => Err(ConversionError::UnknownWorkloadType(s.to_string())),
        }
    }
}

/// Immutable unit of work. Utilization profiles are constant over the lifetime of the job.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: JobId,
    pub workload_type: WorkloadType,
    /// Computational size in million instructions.
    pub length: u64,
    /// Number of execution slots the job occupies while running.
    pub parallelism: u32,
    pub file_size: u64,
    pub output_size: u64,
    pub cpu_utilization: f64,
    pub ram_utilization: f64,
    pub bw_utilization: f64,
}

impl Job {
    /// CPU utilization as used for demand estimates and execution speed. Non-positive values are
    /// clamped so that a job never takes infinite time.
    pub fn effective_cpu_utilization(&self) -> f64 {
        self.cpu_utilization.max(MIN_CPU_UTILIZATION)
    }
}

impl TryFrom<JobDto> for Job {
    type Error = Error;

    fn try_from(dto: JobDto) -> Result<Self, Self::Error> {
        let invalid = |reason: String| Error::InvalidJob { id: dto.id, reason };

        let workload_type = WorkloadType::from_str(&dto.workload_type).map_err(|e| invalid(e.to_string()))?;

        for (name, value) in [("cpuUtil", dto.cpu_util), ("ramUtil", dto.ram_util), ("bwUtil", dto.bw_util)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(format!("{} must be within [0, 1], got {}", name, value)));
            }
        }

        if dto.pes == 0 {
            return Err(invalid("a job needs at least one execution slot".to_string()));
        }

        Ok(Job {
            id: JobId::new(dto.id),
            workload_type,
            length: dto.length,
            parallelism: dto.pes,
            file_size: dto.file_size,
            output_size: dto.output_size,
            cpu_utilization: dto.cpu_util,
            ram_utilization: dto.ram_util,
            bw_utilization: dto.bw_util,
        })
    }
}

impl From<&Job> for JobDto {
    fn from(job: &Job) -> Self {
        JobDto {
            id: job.id.value(),
            workload_type: job.workload_type.as_tag().to_string(),
            length: job.length,
            pes: job.parallelism,
            file_size: job.file_size,
            output_size: job.output_size,
            cpu_util: job.cpu_utilization,
            ram_util: job.ram_utilization,
            bw_util: job.bw_utilization,
        }
    }
}
