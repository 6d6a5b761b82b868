use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON document: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Failed to write CSV summary: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Invalid cluster configuration: {0}")]
    ConfigurationError(String),

    #[error("Job {id} is invalid: {reason}")]
    InvalidJob { id: u64, reason: String },

    #[error(transparent)]
    ConversionError(#[from] ConversionError),

    #[error("Simulation task panicked: {0}")]
    TaskPanicked(String),
}

/// Errors raised while turning textual tags (CLI arguments, DTO fields) into domain enums.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Unknown policy type: '{0}'")]
    UnknownPolicyType(String),

    #[error("Unknown workload type: '{0}'")]
    UnknownWorkloadType(String),
}

pub type Result<T> = std::result::Result<T, Error>;
