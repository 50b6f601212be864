//! S3 object storage client.
//!
//! This crate provides:
//! - The [`ObjectStore`] capability interface the pipeline depends on
//! - An S3-backed implementation with head-object existence checks
//! - Startup connectivity verification

pub mod client;
pub mod error;
pub mod store;

pub use client::{S3Config, S3Store};
pub use error::{StorageError, StorageResult};
pub use store::ObjectStore;
