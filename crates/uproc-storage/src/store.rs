//! Object store capability interface.

use std::path::Path;

use async_trait::async_trait;

use crate::error::StorageResult;

/// The narrow surface the pipeline needs from object storage.
///
/// Implemented by [`crate::S3Store`]; tests substitute in-memory fakes.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Metadata-only existence check. `Ok(false)` is an authoritative
    /// "confirmed absent"; transport problems are errors.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Download an object into a local file, creating parent
    /// directories as needed.
    async fn download_file(&self, key: &str, path: &Path) -> StorageResult<()>;

    /// Upload a local file under the given key.
    async fn upload_file(&self, path: &Path, key: &str, content_type: &str) -> StorageResult<()>;
}
