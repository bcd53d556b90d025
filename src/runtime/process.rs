//! Synchronous child process execution.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::RealRuntime;

/// How the child's output streams are wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamMode {
    /// Collect stdout and stderr into [`ProcessOutput`].
    #[default]
    Capture,
    /// Share the parent's terminal. Captured buffers stay empty.
    Inherit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOptions {
    pub cwd: PathBuf,
    pub stream: StreamMode,
}

/// Exit status and captured output of a finished child process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessOutput {
    /// `None` when the child was terminated by a signal.
    pub status: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn run_process_impl(
        &self,
        command: &Path,
        args: &[String],
        options: &ProcessOptions,
    ) -> Result<ProcessOutput> {
        let mut cmd = Command::new(command);
        cmd.args(args).current_dir(&options.cwd).stdin(Stdio::inherit());

        let launch_err = || format!("Failed to launch {}", command.display());

        match options.stream {
            StreamMode::Capture => {
                let output = cmd
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped())
                    .output()
                    .with_context(launch_err)?;
                Ok(ProcessOutput {
                    status: output.status.code(),
                    stdout: output.stdout,
                    stderr: output.stderr,
                })
            }
            StreamMode::Inherit => {
                let status = cmd
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit())
                    .status()
                    .with_context(launch_err)?;
                Ok(ProcessOutput {
                    status: status.code(),
                    ..Default::default()
                })
            }
        }
    }
}
