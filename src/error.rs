//! Error kinds surfaced by the installer core.
//!
//! Subset validation failures happen before anything on disk is touched.
//! An installer failure is only reported once the project has been restored.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubsetError {
    #[error("Please provide an install subset name")]
    MissingSubsetName,

    #[error("No install subsets in package.json")]
    MissingSubsets,

    #[error("No install subset named '{name}' (declared: {})", .available.join(", "))]
    UnknownSubset { name: String, available: Vec<String> },

    #[error("Subset '{0}' declares neither 'include' nor 'exclude'")]
    InvalidSubsetDeclaration(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstallError {
    /// The package manager ran and reported a non-zero status.
    #[error("Error code {status}")]
    Failed { status: i32 },

    /// The package manager was terminated before reporting a status.
    #[error("Installer was terminated without an exit code")]
    Terminated,

    /// The package manager could not be started.
    #[error("Failed to launch {program}: {reason}")]
    Launch { program: String, reason: String },
}

/// Process exit code for an error escaping the core.
///
/// Installer failures forward the installer's own status when it is a valid
/// exit code. Subset validation errors use 2. Everything else is 1.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    if err.downcast_ref::<SubsetError>().is_some() {
        return 2;
    }
    match err.downcast_ref::<InstallError>() {
        Some(InstallError::Failed { status }) => u8::try_from(*status)
            .ok()
            .filter(|code| *code != 0)
            .unwrap_or(1),
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_installer_failure_message_embeds_status() {
        let err = InstallError::Failed { status: 1 };
        assert_eq!(err.to_string(), "Error code 1");
    }

    #[test]
    fn test_unknown_subset_message_lists_declared_subsets() {
        let err = SubsetError::UnknownSubset {
            name: "lint".into(),
            available: vec!["test".into(), "build".into()],
        };
        assert_eq!(
            err.to_string(),
            "No install subset named 'lint' (declared: test, build)"
        );
    }

    #[test]
    fn test_exit_code_for_subset_errors() {
        let err = anyhow::Error::new(SubsetError::UnknownSubset {
            name: "lint".into(),
            available: vec![],
        });
        assert_eq!(exit_code(&err), 2);
        let err = anyhow::Error::new(SubsetError::MissingSubsets);
        assert_eq!(exit_code(&err), 2);
    }

    #[test]
    fn test_exit_code_forwards_installer_status() {
        let err = anyhow::Error::new(InstallError::Failed { status: 7 });
        assert_eq!(exit_code(&err), 7);
    }

    #[test]
    fn test_exit_code_clamps_out_of_range_status() {
        let err = anyhow::Error::new(InstallError::Failed { status: 300 });
        assert_eq!(exit_code(&err), 1);
        let err = anyhow::Error::new(InstallError::Failed { status: -1 });
        assert_eq!(exit_code(&err), 1);
    }

    #[test]
    fn test_exit_code_survives_context() {
        let err = anyhow::Error::new(InstallError::Failed { status: 4 })
            .context("Installing subset 'test'");
        assert_eq!(exit_code(&err), 4);
    }

    #[test]
    fn test_exit_code_for_other_errors() {
        let err = anyhow::anyhow!("disk full");
        assert_eq!(exit_code(&err), 1);
        let err = anyhow::Error::new(InstallError::Terminated);
        assert_eq!(exit_code(&err), 1);
    }
}
