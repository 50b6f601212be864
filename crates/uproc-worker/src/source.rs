//! Source resolution and fetch strategies.
//!
//! A [`Video`] binds a job request to exactly one fetch strategy at
//! resolution time; the strategy set is closed and adding a host means
//! extending the match arms here.

use std::path::{Path, PathBuf};

use tracing::debug;
use uproc_media::{ytdlp, ToolRunner};
use uproc_models::{JobRequest, Source};
use uproc_storage::ObjectStore;

use crate::error::{WorkerError, WorkerResult};

/// Format preference list used when checking a YouTube URL.
const YOUTUBE_PROBE_FORMATS: &str = "137/136/22/mp4";
/// Format preference list used when downloading from YouTube.
const YOUTUBE_FETCH_FORMATS: &str = "137/136/22/mp4";
/// Format preference list used when checking a Vimeo URL.
const VIMEO_PROBE_FORMATS: &str = "http-1080p/http-720p/mp4";
/// Format preference list used when downloading from Vimeo.
const VIMEO_FETCH_FORMATS: &str = "http-720p/mp4";

/// A job request bound to its fetch strategy.
#[derive(Debug, Clone)]
pub struct Video {
    pub request: JobRequest,
    source: Source,
}

impl Video {
    /// Bind a fetch strategy to a request. Fails for URLs that match
    /// none of the recognized hosts; the error carries the job identity
    /// so the caller can still record the failure.
    pub fn resolve(request: JobRequest) -> WorkerResult<Self> {
        match request.source() {
            Some(source) => {
                debug!("Resolved {} as {} source", request.url, source);
                Ok(Self { request, source })
            }
            None => Err(WorkerError::UnknownSource {
                id: request.id,
                url: request.url,
            }),
        }
    }

    pub fn source(&self) -> Source {
        self.source
    }

    /// Check whether the source media is reachable before spending any
    /// transcode work on it.
    ///
    /// Only object storage can authoritatively say "absent"; for the
    /// remote hosts an unreachable video surfaces as a fetch error.
    pub async fn exists(
        &self,
        store: &dyn ObjectStore,
        runner: &dyn ToolRunner,
    ) -> WorkerResult<bool> {
        match self.source {
            Source::S3 => {
                let key = self.object_key()?;
                Ok(store.exists(&key).await?)
            }
            Source::Youtube => {
                ytdlp::probe(runner, YOUTUBE_PROBE_FORMATS, &self.request.url).await?;
                Ok(true)
            }
            Source::Vimeo => {
                ytdlp::probe(runner, VIMEO_PROBE_FORMATS, &self.request.url).await?;
                Ok(true)
            }
        }
    }

    /// Fetch the source media into `dir`, returning the local path.
    pub async fn fetch(
        &self,
        store: &dyn ObjectStore,
        runner: &dyn ToolRunner,
        dir: &Path,
    ) -> WorkerResult<PathBuf> {
        match self.source {
            Source::S3 => {
                let key = self.object_key()?;
                let dest = dir.join(&self.request.id);
                store.download_file(&key, &dest).await?;
                Ok(dest)
            }
            Source::Youtube => {
                let dest = dir.join(format!("{}.mp4", self.request.id));
                ytdlp::download(runner, YOUTUBE_FETCH_FORMATS, &self.request.url, &dest).await?;
                Ok(dest)
            }
            Source::Vimeo => {
                let dest = dir.join(format!("{}.mp4", self.request.id));
                ytdlp::download(runner, VIMEO_FETCH_FORMATS, &self.request.url, &dest).await?;
                Ok(dest)
            }
        }
    }

    fn object_key(&self) -> WorkerResult<String> {
        self.request.object_key().ok_or_else(|| {
            WorkerError::fetch_failed(format!("no object key in URL {}", self.request.url))
        })
    }
}
