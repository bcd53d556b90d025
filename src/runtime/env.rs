//! Environment operations (working directory, executable lookup).

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn current_dir_impl(&self) -> Result<PathBuf> {
        env::current_dir().context("Failed to determine the current directory")
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn which_impl(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{RealRuntime, Runtime};

    #[test]
    fn test_real_runtime_current_dir() {
        let runtime = RealRuntime;
        let cwd = runtime.current_dir().unwrap();
        assert!(cwd.is_absolute());
    }

    #[cfg(unix)]
    #[test]
    fn test_real_runtime_which_finds_program_on_path() {
        let runtime = RealRuntime;
        let sh = runtime.which("sh").unwrap();
        assert!(sh.is_absolute());
        assert!(sh.ends_with("sh"));
    }

    #[test]
    fn test_real_runtime_which_missing_program() {
        let runtime = RealRuntime;
        assert!(runtime.which("install-subset-no-such-program").is_none());
    }
}
