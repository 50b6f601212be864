//! Narrow collaborator interface over external tool invocation.
//!
//! Pipeline code talks to a [`ToolRunner`] rather than spawning
//! processes directly, so tests can substitute canned outputs and
//! failures without real binaries.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Captured result of one tool invocation.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    /// Exit code, if the process terminated normally
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Build a successful output with the given stdout (test helper).
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Combined stdout and stderr, for diagnostics.
    pub fn combined(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }

    /// Turn a non-zero exit into a [`MediaError::ToolFailed`] carrying
    /// the combined output.
    pub fn require_success(self, program: &str) -> MediaResult<ToolOutput> {
        if self.success() {
            Ok(self)
        } else {
            Err(MediaError::tool_failed(program, self.status, self.combined()))
        }
    }
}

/// Runs an external program to completion and captures its output.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> MediaResult<ToolOutput>;
}

/// [`ToolRunner`] backed by real processes.
///
/// Invocations block until the child exits; no timeout is imposed, so
/// a hung tool blocks the calling worker.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ToolRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[String]) -> MediaResult<ToolOutput> {
        which::which(program).map_err(|_| MediaError::ProgramNotFound(program.to_string()))?;

        debug!("Running {} {}", program, args.join(" "));

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        Ok(ToolOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_success_passes_zero_exit() {
        let out = ToolOutput::ok("fine");
        assert_eq!(out.require_success("tool").unwrap().stdout, "fine");
    }

    #[test]
    fn test_require_success_carries_combined_output() {
        let out = ToolOutput {
            status: Some(1),
            stdout: "partial".to_string(),
            stderr: "boom".to_string(),
        };
        let err = out.require_success("ffmpeg").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("ffmpeg"));
        assert!(msg.contains("partial"));
        assert!(msg.contains("boom"));
    }

    #[tokio::test]
    async fn test_system_runner_missing_program() {
        let runner = SystemRunner::new();
        let err = runner
            .run("definitely-not-a-real-tool-9000", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::ProgramNotFound(_)));
    }
}
