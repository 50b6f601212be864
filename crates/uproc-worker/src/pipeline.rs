//! The per-job transcode pipeline.
//!
//! Stages run in order: fetch, probe, normalize, upload master, derive
//! and upload proxy, then per-slot splits. The stages up to and
//! including the proxy are all-or-nothing for the job; each split slot
//! fails independently without failing the job.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};
use uproc_media::{probe, FfmpegCommand, ToolRunner};
use uproc_models::{split_window, Timecode, TimecodeTable, VideoTooShort};
use uproc_queue::SlotRegistry;
use uproc_storage::ObjectStore;

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::source::Video;

/// Frame rate assumed when the source cannot be probed.
const DEFAULT_FRAME_RATE: &str = "25";
/// Output frame rate for masters and clips.
const OUTPUT_FRAME_RATE: &str = "24";
/// Scale filter applied to every master.
const NORMALIZE_FILTER: &str = "scale=1920:1080,setdar=16/9";
/// Scale filter applied to the proxy.
const PROXY_FILTER: &str = "scale=320:240";

const CONTENT_TYPE_MP4: &str = "video/mp4";

/// Everything a pipeline run needs, bundled so the worker and tests
/// construct it the same way.
pub struct PipelineContext {
    pub runner: Arc<dyn ToolRunner>,
    pub store: Arc<dyn ObjectStore>,
    pub slots: Arc<dyn SlotRegistry>,
    pub processed_prefix: String,
    pub proxy_prefix: String,
    pub split_prefix: String,
    pub work_dir: PathBuf,
    pub timecodes: Option<TimecodeTable>,
}

impl PipelineContext {
    pub fn new(
        config: &WorkerConfig,
        runner: Arc<dyn ToolRunner>,
        store: Arc<dyn ObjectStore>,
        slots: Arc<dyn SlotRegistry>,
        timecodes: Option<TimecodeTable>,
    ) -> Self {
        Self {
            runner,
            store,
            slots,
            processed_prefix: config.processed_prefix.clone(),
            proxy_prefix: config.proxy_prefix.clone(),
            split_prefix: config.split_prefix.clone(),
            work_dir: config.work_dir.clone(),
            timecodes,
        }
    }
}

/// Per-job scratch directory, removed with everything in it when the
/// guard drops, on success and failure alike.
struct JobWorkDir {
    path: PathBuf,
}

impl JobWorkDir {
    fn create(root: &Path, id: &str) -> std::io::Result<Self> {
        let path = root.join(id);
        std::fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for JobWorkDir {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            warn!("Couldn't clean up work dir {}: {}", self.path.display(), e);
        }
    }
}

/// Run the full pipeline for one resolved video.
///
/// On success the probed duration has been written back to
/// `video.request`; the caller persists it.
pub async fn process(ctx: &PipelineContext, video: &mut Video) -> WorkerResult<()> {
    let id = video.request.id.clone();
    let work_dir = JobWorkDir::create(&ctx.work_dir, &id)?;

    if !video.exists(ctx.store.as_ref(), ctx.runner.as_ref()).await? {
        return Err(WorkerError::MissingSource(id));
    }

    let source_path = video
        .fetch(ctx.store.as_ref(), ctx.runner.as_ref(), work_dir.path())
        .await?;

    // Duration drives the split windows; a video we can't measure still
    // gets a master and proxy, it just can't host any splits.
    let duration = match probe::probe_duration(ctx.runner.as_ref(), &source_path).await {
        Ok(d) => d,
        Err(e) => {
            warn!("Couldn't probe duration of {}: {}", id, e);
            0.0
        }
    };
    video.request.duration = duration as u64;

    let frame_rate = match probe::probe_frame_rate(ctx.runner.as_ref(), &source_path).await {
        Ok(rate) => rate,
        Err(e) => {
            warn!(
                "Couldn't probe frame rate of {}, assuming {}: {}",
                id, DEFAULT_FRAME_RATE, e
            );
            DEFAULT_FRAME_RATE.to_string()
        }
    };

    let master_path = work_dir.path().join(format!("{id}-processed.mp4"));
    FfmpegCommand::new(&source_path, &master_path)
        .input_frame_rate(&frame_rate)
        .video_filter(NORMALIZE_FILTER)
        .output_frame_rate(OUTPUT_FRAME_RATE)
        .video_codec("libx264")
        .pixel_format("yuv420p")
        .no_audio()
        .run(ctx.runner.as_ref())
        .await?;

    let master_key = format!("{}/{}.mp4", ctx.processed_prefix, id);
    ctx.store
        .upload_file(&master_path, &master_key, CONTENT_TYPE_MP4)
        .await?;
    info!("Uploaded master for {} as {}", id, master_key);

    upload_proxy(ctx, &master_path, &id).await?;

    if let Some(table) = &ctx.timecodes {
        split_into_slots(ctx, table, &master_path, &id, duration).await;
    }

    Ok(())
}

/// Derive the low-resolution proxy from the master and upload it.
async fn upload_proxy(ctx: &PipelineContext, master_path: &Path, id: &str) -> WorkerResult<()> {
    let proxy_path = master_path.with_file_name(format!("{id}-small.mp4"));

    FfmpegCommand::new(master_path, &proxy_path)
        .input_frame_rate(OUTPUT_FRAME_RATE)
        .video_filter(PROXY_FILTER)
        .run(ctx.runner.as_ref())
        .await?;

    let proxy_key = format!("{}/{}.mp4", ctx.proxy_prefix, id);
    ctx.store
        .upload_file(&proxy_path, &proxy_key, CONTENT_TYPE_MP4)
        .await?;
    info!("Uploaded proxy for {} as {}", id, proxy_key);

    Ok(())
}

/// Cut, upload and register one clip per slot. A failed slot is logged
/// and skipped; the remaining slots still run.
async fn split_into_slots(
    ctx: &PipelineContext,
    table: &TimecodeTable,
    master_path: &Path,
    id: &str,
    duration: f64,
) {
    for (slot, timecode) in table.slots() {
        match split_one_slot(ctx, master_path, id, slot, timecode, duration).await {
            Ok(Some(key)) => info!("Uploaded split for {} as {}", id, key),
            Ok(None) => warn!(
                "Video {} ({}s) is too short for slot {} ({}s), skipping",
                id, duration, slot, timecode.length
            ),
            Err(e) => warn!("Couldn't split {} for slot {}: {}", id, slot, e),
        }
    }
}

/// Returns `Ok(None)` when the video cannot host this slot's clip.
async fn split_one_slot(
    ctx: &PipelineContext,
    master_path: &Path,
    id: &str,
    slot: usize,
    timecode: Timecode,
    duration: f64,
) -> WorkerResult<Option<String>> {
    let window = match split_window(timecode, duration) {
        Ok(window) => window,
        Err(VideoTooShort) => return Ok(None),
    };

    let clip_path = master_path.with_file_name(format!("{id}-{slot}-split.mp4"));

    FfmpegCommand::new(master_path, &clip_path)
        .input_frame_rate(OUTPUT_FRAME_RATE)
        .seek(window.start)
        .limit_duration(window.length)
        .run(ctx.runner.as_ref())
        .await?;

    let key = format!("{}/{}/{}.mp4", ctx.split_prefix, slot, id);
    ctx.store
        .upload_file(&clip_path, &key, CONTENT_TYPE_MP4)
        .await?;
    ctx.slots.add_to_slot(slot, &key).await?;

    Ok(Some(key))
}
