//! External media tool invocation.
//!
//! This crate wraps the command-line tools the pipeline shells out to:
//! - `ffmpeg` for normalization, proxy derivation and slot cuts
//! - `ffprobe` for frame-rate and duration inspection
//! - `yt-dlp` for remote-host fetch and existence probes
//!
//! All invocations go through the [`ToolRunner`] seam so pipeline
//! logic can be tested against fakes.

pub mod command;
pub mod error;
pub mod probe;
pub mod runner;
pub mod ytdlp;

pub use command::FfmpegCommand;
pub use error::{MediaError, MediaResult};
pub use probe::{parse_frame_rate, probe_duration, probe_frame_rate};
pub use runner::{SystemRunner, ToolOutput, ToolRunner};
