use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing id or books")]
    MissingFields,

    #[error("Worker pool is shut down")]
    PoolClosed,

    #[error("Job {job_id} failed: {reason}")]
    JobFailed { job_id: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
