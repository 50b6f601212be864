//! FFprobe stream inspection.

use std::path::Path;

use serde::Deserialize;

use crate::error::{MediaError, MediaResult};
use crate::runner::ToolRunner;

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
}

async fn ffprobe(runner: &dyn ToolRunner, path: &Path) -> MediaResult<FfprobeOutput> {
    let args = vec![
        "-v".to_string(),
        "quiet".to_string(),
        "-print_format".to_string(),
        "json".to_string(),
        "-show_format".to_string(),
        "-show_streams".to_string(),
        path.to_string_lossy().to_string(),
    ];

    let output = runner
        .run("ffprobe", &args)
        .await?
        .require_success("ffprobe")?;

    Ok(serde_json::from_str(&output.stdout)?)
}

/// Read the average frame rate of the first video stream, as reported
/// by ffprobe (e.g. "30000/1001" or "25/1"). The string is suitable to
/// pass straight back to FFmpeg as a rate argument.
pub async fn probe_frame_rate(runner: &dyn ToolRunner, path: &Path) -> MediaResult<String> {
    let probe = ffprobe(runner, path).await?;

    let stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type == "video")
        .ok_or_else(|| MediaError::InvalidVideo("no video stream found".to_string()))?;

    let rate = stream
        .avg_frame_rate
        .as_deref()
        .or(stream.r_frame_rate.as_deref())
        .filter(|r| parse_frame_rate(r).is_some())
        .ok_or_else(|| MediaError::InvalidVideo("no usable frame rate".to_string()))?;

    Ok(rate.to_string())
}

/// Read the container duration in seconds.
pub async fn probe_duration(runner: &dyn ToolRunner, path: &Path) -> MediaResult<f64> {
    let probe = ffprobe(runner, path).await?;

    probe
        .format
        .duration
        .as_deref()
        .and_then(|d| d.trim().parse::<f64>().ok())
        .ok_or_else(|| MediaError::InvalidVideo("no usable duration".to_string()))
}

/// Parse a frame rate string (e.g. "30/1" or "29.97") to fps.
/// Returns `None` for degenerate rates like "0/0".
pub fn parse_frame_rate(s: &str) -> Option<f64> {
    let value = if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.trim().parse().ok()?;
        let den: f64 = den.trim().parse().ok()?;
        if den <= 0.0 {
            return None;
        }
        num / den
    } else {
        s.trim().parse().ok()?
    };

    (value > 0.0).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ToolOutput;
    use async_trait::async_trait;

    struct CannedRunner {
        output: ToolOutput,
    }

    #[async_trait]
    impl ToolRunner for CannedRunner {
        async fn run(&self, _program: &str, _args: &[String]) -> MediaResult<ToolOutput> {
            Ok(self.output.clone())
        }
    }

    const SAMPLE: &str = r#"{
        "streams": [
            {"codec_type": "audio", "avg_frame_rate": "0/0", "r_frame_rate": "0/0"},
            {"codec_type": "video", "avg_frame_rate": "30000/1001", "r_frame_rate": "30/1"}
        ],
        "format": {"duration": "120.050000"}
    }"#;

    #[tokio::test]
    async fn test_probe_frame_rate() {
        let runner = CannedRunner {
            output: ToolOutput::ok(SAMPLE),
        };
        let rate = probe_frame_rate(&runner, Path::new("x.mp4")).await.unwrap();
        assert_eq!(rate, "30000/1001");
    }

    #[tokio::test]
    async fn test_probe_duration() {
        let runner = CannedRunner {
            output: ToolOutput::ok(SAMPLE),
        };
        let duration = probe_duration(&runner, Path::new("x.mp4")).await.unwrap();
        assert!((duration - 120.05).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_probe_nonzero_exit_is_error() {
        let runner = CannedRunner {
            output: ToolOutput {
                status: Some(1),
                stdout: String::new(),
                stderr: "x.mp4: No such file or directory".to_string(),
            },
        };
        assert!(probe_duration(&runner, Path::new("x.mp4")).await.is_err());
        assert!(probe_frame_rate(&runner, Path::new("x.mp4")).await.is_err());
    }

    #[tokio::test]
    async fn test_probe_unparsable_output_is_error() {
        let runner = CannedRunner {
            output: ToolOutput::ok("not json"),
        };
        assert!(probe_duration(&runner, Path::new("x.mp4")).await.is_err());
    }

    #[tokio::test]
    async fn test_degenerate_frame_rate_is_error() {
        let runner = CannedRunner {
            output: ToolOutput::ok(
                r#"{"streams":[{"codec_type":"video","avg_frame_rate":"0/0","r_frame_rate":"0/0"}],"format":{}}"#,
            ),
        };
        assert!(probe_frame_rate(&runner, Path::new("x.mp4")).await.is_err());
    }

    #[test]
    fn test_parse_frame_rate() {
        assert!((parse_frame_rate("30/1").unwrap() - 30.0).abs() < 0.01);
        assert!((parse_frame_rate("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert!((parse_frame_rate("29.97").unwrap() - 29.97).abs() < 0.01);
        assert!(parse_frame_rate("0/0").is_none());
        assert!(parse_frame_rate("").is_none());
    }
}
