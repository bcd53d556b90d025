//! Install a subset: back up, rewrite, run the installer, restore.

use anyhow::{Context, Result, bail};
use log::{debug, info};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::backup::{BackupManager, BackupOutcome, tracked_files};
use crate::error::InstallError;
use crate::installer;
use crate::manifest::{MANIFEST_FILE, Manifest};
use crate::runtime::{ProcessOutput, Runtime, StreamMode};
use crate::subset;

/// Dependency cache removed by the `clean` option.
pub const CACHE_DIR: &str = "node_modules";

/// Options for a single subset install.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallOptions {
    /// Remove the dependency cache before installing.
    pub clean: bool,
    /// Skip the package's install hooks.
    pub ignore_scripts: bool,
    /// Drop production dependencies from the rewritten manifest.
    pub only_dev: bool,
    /// Leave lockfiles untouched.
    pub preserve_lock_file: bool,
    /// Use npm even when yarn is available.
    pub force_standard_installer: bool,
    /// Passed to the installer after its own arguments.
    pub extra_flags: Vec<String>,
    pub stream: StreamMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Resolving,
    Rewriting,
    Installing,
    Restoring,
    Done,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Drives one subset install through its phases.
pub struct SubsetInstall<'a, R: Runtime> {
    runtime: &'a R,
    project_dir: PathBuf,
    backups: BackupManager<'a, R>,
    phase: Phase,
}

impl<'a, R: Runtime> SubsetInstall<'a, R> {
    pub fn new(runtime: &'a R, project_dir: impl Into<PathBuf>) -> Self {
        let project_dir = project_dir.into();
        Self {
            runtime,
            backups: BackupManager::new(runtime, project_dir.clone()),
            project_dir,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Install subset `name` and put the project back the way it was.
    ///
    /// Validation errors return before any file is touched. Once files have
    /// been backed up they are always restored before this returns, whether
    /// or not the installer succeeded.
    #[tracing::instrument(skip(self, options))]
    pub fn run(&mut self, name: &str, options: &InstallOptions) -> Result<ProcessOutput> {
        let result = self.run_phases(name, options);
        self.advance(if result.is_ok() {
            Phase::Done
        } else {
            Phase::Failed
        });
        result
    }

    fn run_phases(&mut self, name: &str, options: &InstallOptions) -> Result<ProcessOutput> {
        self.advance(Phase::Resolving);
        self.backups.recover_stale();
        let manifest_path = self.project_dir.join(MANIFEST_FILE);
        let manifest = Manifest::load(self.runtime, &manifest_path)?;
        let rewritten = subset::resolve(manifest, name, options.only_dev)?;

        self.advance(Phase::Rewriting);
        if self.backups.backup(MANIFEST_FILE) != BackupOutcome::Saved {
            bail!(
                "Refusing to rewrite {}: it could not be backed up",
                manifest_path.display()
            );
        }
        let mut backed_up = vec![(MANIFEST_FILE, BackupOutcome::Saved)];
        for filename in tracked_files(options.preserve_lock_file) {
            if filename != MANIFEST_FILE {
                backed_up.push((filename, self.backups.backup(filename)));
            }
        }

        let outcome = self.rewrite_and_install(&rewritten, &manifest_path, options);

        self.advance(Phase::Restoring);
        for (filename, backup) in backed_up {
            self.backups.undo(filename, backup);
        }

        let output = outcome?;
        if let Err(err) = echo_output(&output) {
            debug!("Failed to echo installer output: {}", err);
        }
        if output.success() {
            println!("Installation of subset \"{}\" successful", name);
            return Ok(output);
        }
        match output.status {
            Some(status) => Err(InstallError::Failed { status }.into()),
            None => Err(InstallError::Terminated.into()),
        }
    }

    fn rewrite_and_install(
        &mut self,
        rewritten: &Manifest,
        manifest_path: &Path,
        options: &InstallOptions,
    ) -> Result<ProcessOutput> {
        if options.clean {
            let cache = self.project_dir.join(CACHE_DIR);
            if self.runtime.is_dir(&cache) {
                info!("Removing {}", cache.display());
                self.runtime.remove_dir_all(&cache)?;
            }
        }

        rewritten
            .save(self.runtime, manifest_path)
            .context("Failed to write the subset manifest")?;

        self.advance(Phase::Installing);
        Ok(installer::invoke(self.runtime, &self.project_dir, options)?)
    }

    fn advance(&mut self, next: Phase) {
        debug!("{} -> {}", self.phase, next);
        self.phase = next;
    }
}

/// Install subset `name` in `project_dir`.
pub fn install_subset<R: Runtime>(
    runtime: &R,
    project_dir: &Path,
    name: &str,
    options: &InstallOptions,
) -> Result<ProcessOutput> {
    SubsetInstall::new(runtime, project_dir).run(name, options)
}

/// Restore backups left behind by an interrupted run.
#[tracing::instrument(skip(runtime))]
pub fn restore_project<R: Runtime>(runtime: &R, project_dir: &Path) -> usize {
    BackupManager::new(runtime, project_dir).recover_stale()
}

fn echo_output(output: &ProcessOutput) -> std::io::Result<()> {
    if output.stdout.is_empty() && output.stderr.is_empty() {
        return Ok(());
    }
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&output.stdout)?;
    writeln!(stdout)?;
    writeln!(stdout, "*****")?;
    stdout.write_all(&output.stderr)?;
    writeln!(stdout)?;
    stdout.flush()
}
