pub mod config_dto;
pub mod job_dto;
pub mod report_dto;
