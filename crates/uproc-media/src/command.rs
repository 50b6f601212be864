//! FFmpeg command builder.

use std::path::{Path, PathBuf};

use crate::error::MediaResult;
use crate::runner::ToolRunner;

/// Builder for FFmpeg invocations.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file path
    input: PathBuf,
    /// Output file path
    output: PathBuf,
    /// Input arguments (before -i)
    input_args: Vec<String>,
    /// Output arguments (after -i)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            input_args: Vec::new(),
            output_args: Vec::new(),
            overwrite: true,
        }
    }

    /// Add an input argument (before -i).
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add an output argument (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Set the declared input frame rate.
    pub fn input_frame_rate(self, rate: impl Into<String>) -> Self {
        self.input_arg("-r").input_arg(rate)
    }

    /// Set seek position (before input).
    pub fn seek(self, seconds: f64) -> Self {
        self.input_arg("-ss").input_arg(format!("{:.3}", seconds))
    }

    /// Limit output duration.
    pub fn limit_duration(self, seconds: f64) -> Self {
        self.output_arg("-t").output_arg(format!("{:.3}", seconds))
    }

    /// Set video filter.
    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-filter:v").output_arg(filter)
    }

    /// Set output frame rate.
    pub fn output_frame_rate(self, rate: impl Into<String>) -> Self {
        self.output_arg("-r").output_arg(rate)
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set pixel format.
    pub fn pixel_format(self, format: impl Into<String>) -> Self {
        self.output_arg("-pix_fmt").output_arg(format)
    }

    /// Drop the audio stream.
    pub fn no_audio(self) -> Self {
        self.output_arg("-an")
    }

    /// Build the argument list.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.extend(self.input_args.clone());

        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        args.extend(self.output_args.clone());

        args.push(self.output.to_string_lossy().to_string());

        args
    }

    /// Run the command, treating a non-zero exit as failure. No output
    /// file should be assumed to exist on error.
    pub async fn run(&self, runner: &dyn ToolRunner) -> MediaResult<()> {
        runner
            .run("ffmpeg", &self.build_args())
            .await?
            .require_success("ffmpeg")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder() {
        let cmd = FfmpegCommand::new("input.mp4", "output.mp4")
            .input_frame_rate("30000/1001")
            .video_filter("scale=1920:1080,setdar=16/9")
            .output_frame_rate("24")
            .video_codec("libx264")
            .pixel_format("yuv420p")
            .no_audio();

        let args = cmd.build_args();
        assert_eq!(args[0], "-y");

        // Input rate comes before -i, output rate after
        let i_pos = args.iter().position(|a| a == "-i").unwrap();
        let first_r = args.iter().position(|a| a == "-r").unwrap();
        assert!(first_r < i_pos);
        assert_eq!(args[first_r + 1], "30000/1001");

        assert!(args.contains(&"-c:v".to_string()));
        assert!(args.contains(&"libx264".to_string()));
        assert!(args.contains(&"-an".to_string()));
        assert_eq!(args.last().unwrap(), "output.mp4");
    }

    #[test]
    fn test_seek_and_duration_formatting() {
        let cmd = FfmpegCommand::new("in.mp4", "out.mp4")
            .seek(48.0)
            .limit_duration(10.0);

        let args = cmd.build_args();
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        assert_eq!(args[ss + 1], "48.000");

        let i_pos = args.iter().position(|a| a == "-i").unwrap();
        assert!(ss < i_pos, "-ss must be an input argument");

        let t = args.iter().position(|a| a == "-t").unwrap();
        assert!(t > i_pos, "-t must be an output argument");
        assert_eq!(args[t + 1], "10.000");
    }
}
