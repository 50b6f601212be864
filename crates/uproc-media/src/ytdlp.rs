//! Remote video fetch via yt-dlp.
//!
//! Used by the external-host fetch strategies: a simulate-only run
//! stands in for an existence check, a real run exports the media to a
//! local file.

use std::path::Path;

use tracing::debug;

use crate::error::{MediaError, MediaResult};
use crate::runner::ToolRunner;

/// Probe whether a URL resolves to a downloadable video in one of the
/// preferred formats, without writing anything.
///
/// A non-zero exit or runner failure is an error, not "absent": only
/// object storage can authoritatively report a missing video.
pub async fn probe(runner: &dyn ToolRunner, formats: &str, url: &str) -> MediaResult<()> {
    let args = vec![
        "-f".to_string(),
        formats.to_string(),
        "-s".to_string(),
        url.to_string(),
    ];

    debug!("Probing {} with yt-dlp", url);

    runner
        .run("yt-dlp", &args)
        .await?
        .require_success("yt-dlp")
        .map_err(as_download_error)?;

    Ok(())
}

/// Download a URL into `output` using the given format preference list.
pub async fn download(
    runner: &dyn ToolRunner,
    formats: &str,
    url: &str,
    output: &Path,
) -> MediaResult<()> {
    let args = vec![
        "-f".to_string(),
        formats.to_string(),
        "-o".to_string(),
        output.to_string_lossy().to_string(),
        url.to_string(),
    ];

    debug!("Downloading {} to {}", url, output.display());

    runner
        .run("yt-dlp", &args)
        .await?
        .require_success("yt-dlp")
        .map_err(as_download_error)?;

    Ok(())
}

fn as_download_error(err: MediaError) -> MediaError {
    match err {
        MediaError::ToolFailed { output, exit_code, .. } => MediaError::download_failed(format!(
            "yt-dlp exited with status {exit_code:?}: {output}"
        )),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ToolOutput;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingRunner {
        calls: Mutex<Vec<(String, Vec<String>)>>,
        fail: bool,
    }

    #[async_trait]
    impl ToolRunner for RecordingRunner {
        async fn run(&self, program: &str, args: &[String]) -> MediaResult<ToolOutput> {
            self.calls
                .lock()
                .unwrap()
                .push((program.to_string(), args.to_vec()));
            if self.fail {
                Ok(ToolOutput {
                    status: Some(1),
                    stdout: String::new(),
                    stderr: "ERROR: Video unavailable".to_string(),
                })
            } else {
                Ok(ToolOutput::ok(""))
            }
        }
    }

    #[tokio::test]
    async fn test_probe_is_simulate_only() {
        let runner = RecordingRunner::default();
        probe(&runner, "137/136/22/mp4", "https://youtu.be/abc")
            .await
            .unwrap();

        let calls = runner.calls.lock().unwrap();
        let (program, args) = &calls[0];
        assert_eq!(program, "yt-dlp");
        assert!(args.contains(&"-s".to_string()));
        assert!(!args.contains(&"-o".to_string()));
        assert_eq!(args[1], "137/136/22/mp4");
    }

    #[tokio::test]
    async fn test_download_writes_to_output() {
        let runner = RecordingRunner::default();
        download(
            &runner,
            "http-720p/mp4",
            "https://vimeo.com/123",
            Path::new("/tmp/work/abc.mp4"),
        )
        .await
        .unwrap();

        let calls = runner.calls.lock().unwrap();
        let (_, args) = &calls[0];
        let o = args.iter().position(|a| a == "-o").unwrap();
        assert_eq!(args[o + 1], "/tmp/work/abc.mp4");
        assert_eq!(args.last().unwrap(), "https://vimeo.com/123");
    }

    #[tokio::test]
    async fn test_nonzero_exit_carries_tool_output() {
        let runner = RecordingRunner {
            fail: true,
            ..Default::default()
        };
        let err = probe(&runner, "mp4", "https://youtu.be/abc")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Video unavailable"));
    }
}
