//! Runtime abstraction for system operations.
//!
//! Everything the installer touches outside its own memory goes through the
//! [`Runtime`] trait, so orchestration can be exercised against a mock.
//!
//! # Structure
//!
//! - `env` - Working directory and executable lookup
//! - `fs` - File system operations (read, write, remove)
//! - `process` - Synchronous child process execution

mod env;
mod fs;
mod process;

use anyhow::Result;
use std::path::{Path, PathBuf};

pub use process::{ProcessOptions, ProcessOutput, StreamMode};

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    // Environment
    fn current_dir(&self) -> Result<PathBuf>;

    /// Look up an executable on the search path.
    fn which(&self, program: &str) -> Option<PathBuf>;

    // File System
    fn read(&self, path: &Path) -> Result<Vec<u8>>;
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;
    fn remove_file(&self, path: &Path) -> Result<()>;
    fn remove_dir_all(&self, path: &Path) -> Result<()>;
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;

    // Processes
    /// Run `command` to completion and report how it exited.
    ///
    /// Blocks until the child exits. There is no timeout.
    fn run_process(
        &self,
        command: &Path,
        args: &[String],
        options: &ProcessOptions,
    ) -> Result<ProcessOutput>;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn current_dir(&self) -> Result<PathBuf> {
        self.current_dir_impl()
    }

    fn which(&self, program: &str) -> Option<PathBuf> {
        self.which_impl(program)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.read_impl(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.write_impl(path, contents)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.remove_file_impl(path)
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        self.remove_dir_all_impl(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.exists_impl(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.is_dir_impl(path)
    }

    fn run_process(
        &self,
        command: &Path,
        args: &[String],
        options: &ProcessOptions,
    ) -> Result<ProcessOutput> {
        self.run_process_impl(command, args, options)
    }
}
