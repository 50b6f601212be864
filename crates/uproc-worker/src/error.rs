//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Invalid job payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("Job {id} has no recognized source: {url}")]
    UnknownSource { id: String, url: String },

    #[error("Job {0} has no source media")]
    MissingSource(String),

    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Media error: {0}")]
    Media(#[from] uproc_media::MediaError),

    #[error("Storage error: {0}")]
    Storage(#[from] uproc_storage::StorageError),

    #[error("Queue error: {0}")]
    Queue(#[from] uproc_queue::QueueError),

    #[error("Status store error: {0}")]
    Db(#[from] uproc_db::DbError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn fetch_failed(msg: impl Into<String>) -> Self {
        Self::FetchFailed(msg.into())
    }
}
