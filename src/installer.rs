//! Choosing and running the external package manager.

use log::{debug, info};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::InstallError;
use crate::install::InstallOptions;
use crate::runtime::{ProcessOptions, ProcessOutput, Runtime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallerKind {
    /// The preferred installer, used whenever it is on the search path.
    Yarn,
    /// The fallback installer.
    Npm,
}

impl InstallerKind {
    pub fn program(self) -> &'static str {
        match self {
            InstallerKind::Yarn => "yarn",
            InstallerKind::Npm => "npm",
        }
    }
}

impl fmt::Display for InstallerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// Pick the installer and the executable to launch for it.
pub fn select<R: Runtime>(runtime: &R, force_standard: bool) -> (InstallerKind, PathBuf) {
    if !force_standard {
        if let Some(path) = runtime.which(InstallerKind::Yarn.program()) {
            return (InstallerKind::Yarn, path);
        }
        debug!("yarn is not on the search path, falling back to npm");
    }
    let path = runtime
        .which(InstallerKind::Npm.program())
        .unwrap_or_else(|| PathBuf::from(InstallerKind::Npm.program()));
    (InstallerKind::Npm, path)
}

/// Arguments for the install invocation: `install`, the script flag, then
/// the pass-through flags in order.
pub fn install_args(ignore_scripts: bool, extra_flags: &[String]) -> Vec<String> {
    let mut args = vec!["install".to_string()];
    if ignore_scripts {
        args.push("--ignore-scripts".to_string());
    }
    args.extend(extra_flags.iter().cloned());
    args
}

/// Run the installer once in `project_dir`.
///
/// A non-zero status is not an error here; the caller decides what to do
/// with it after restoring the project.
#[tracing::instrument(skip(runtime, options))]
pub fn invoke<R: Runtime>(
    runtime: &R,
    project_dir: &Path,
    options: &InstallOptions,
) -> Result<ProcessOutput, InstallError> {
    let (kind, program) = select(runtime, options.force_standard_installer);
    let args = install_args(options.ignore_scripts, &options.extra_flags);
    info!("Running {} {}", kind, args.join(" "));

    let process_options = ProcessOptions {
        cwd: project_dir.to_path_buf(),
        stream: options.stream,
    };
    runtime
        .run_process(&program, &args, &process_options)
        .map_err(|err| InstallError::Launch {
            program: program.display().to_string(),
            reason: format!("{:#}", err),
        })
}
