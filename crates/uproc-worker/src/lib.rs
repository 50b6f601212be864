//! Queue-driven media ingestion worker.
//!
//! Consumes upload jobs, fetches the source media from wherever it
//! lives, normalizes it, derives a proxy and per-slot split clips, and
//! records progress in the status store.

pub mod config;
pub mod error;
pub mod executor;
pub mod pipeline;
pub mod source;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use executor::Executor;
pub use pipeline::PipelineContext;
pub use source::Video;
