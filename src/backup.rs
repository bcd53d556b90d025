//! Backup and restore of project files around an install.
//!
//! A backup is a sibling file named `<file>.backup` holding the original
//! bytes. Neither operation ever fails the run: problems are logged as
//! warnings, because restore is what puts the project back together after
//! a failed install.

use anyhow::Result;
use log::{debug, warn};
use std::path::PathBuf;

use crate::manifest::MANIFEST_FILE;
use crate::runtime::Runtime;

pub const BACKUP_SUFFIX: &str = ".backup";

pub const LOCK_FILES: [&str; 2] = ["package-lock.json", "yarn.lock"];

/// Files saved before the manifest is rewritten.
///
/// The manifest is always tracked. Lockfiles are left alone when
/// `preserve_lock_file` is set.
pub fn tracked_files(preserve_lock_file: bool) -> Vec<&'static str> {
    let mut files = vec![MANIFEST_FILE];
    if !preserve_lock_file {
        files.extend(LOCK_FILES);
    }
    files
}

/// What [`BackupManager::backup`] did with a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupOutcome {
    /// The file was moved into its backup.
    Saved,
    /// There was no file to back up.
    Absent,
    /// The file exists but could not be moved aside.
    Failed,
}

pub struct BackupManager<'a, R: Runtime> {
    runtime: &'a R,
    root: PathBuf,
}

impl<'a, R: Runtime> BackupManager<'a, R> {
    pub fn new(runtime: &'a R, root: impl Into<PathBuf>) -> Self {
        Self {
            runtime,
            root: root.into(),
        }
    }

    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    pub fn backup_path(&self, filename: &str) -> PathBuf {
        self.root.join(format!("{}{}", filename, BACKUP_SUFFIX))
    }

    /// Move `filename` aside into its backup file.
    #[tracing::instrument(skip(self))]
    pub fn backup(&self, filename: &str) -> BackupOutcome {
        let original = self.file_path(filename);
        if !self.runtime.exists(&original) {
            warn!("{} not found, nothing to back up", original.display());
            return BackupOutcome::Absent;
        }
        match self.transfer(original, self.backup_path(filename)) {
            Ok(()) => {
                debug!("Backed up {}", filename);
                BackupOutcome::Saved
            }
            Err(err) => {
                warn!("Failed to back up {}: {:#}", filename, err);
                BackupOutcome::Failed
            }
        }
    }

    /// Undo a backup according to what [`backup`](Self::backup) reported.
    ///
    /// A file that did not exist before is removed again, so files the
    /// installer created do not outlive the run.
    pub fn undo(&self, filename: &str, outcome: BackupOutcome) {
        match outcome {
            BackupOutcome::Saved | BackupOutcome::Failed => {
                self.restore(filename);
            }
            BackupOutcome::Absent => self.discard(filename),
        }
    }

    /// Remove `filename` if it exists. Failures are logged, not returned.
    #[tracing::instrument(skip(self))]
    pub fn discard(&self, filename: &str) {
        let path = self.file_path(filename);
        if !self.runtime.exists(&path) {
            return;
        }
        match self.runtime.remove_file(&path) {
            Ok(()) => debug!("Removed {} created during the run", filename),
            Err(err) => warn!("Failed to remove {}: {:#}", path.display(), err),
        }
    }

    /// Put the backup of `filename` back in place and delete the backup.
    ///
    /// Returns whether a file was restored.
    #[tracing::instrument(skip(self))]
    pub fn restore(&self, filename: &str) -> bool {
        let backup = self.backup_path(filename);
        if !self.runtime.exists(&backup) {
            warn!("{} not found, nothing to restore", backup.display());
            return false;
        }
        match self.transfer(backup, self.file_path(filename)) {
            Ok(()) => {
                debug!("Restored {}", filename);
                true
            }
            Err(err) => {
                warn!("Failed to restore {}: {:#}", filename, err);
                false
            }
        }
    }

    /// Restore any backups an interrupted run left behind.
    ///
    /// Only files that actually have a backup are touched. Returns how many
    /// files were restored.
    #[tracing::instrument(skip(self))]
    pub fn recover_stale(&self) -> usize {
        let mut restored = 0;
        for filename in tracked_files(false) {
            if self.runtime.exists(&self.backup_path(filename)) {
                warn!(
                    "Found {}{} from an interrupted run, restoring it",
                    filename, BACKUP_SUFFIX
                );
                if self.restore(filename) {
                    restored += 1;
                }
            }
        }
        restored
    }

    fn transfer(&self, from: PathBuf, to: PathBuf) -> Result<()> {
        let bytes = self.runtime.read(&from)?;
        self.runtime.write(&to, &bytes)?;
        self.runtime.remove_file(&from)?;
        Ok(())
    }
}
