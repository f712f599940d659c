//! Error types and handling for rigup
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for rigup operations
#[derive(Error, Diagnostic, Debug)]
pub enum RigupError {
    // Precondition errors
    #[error("Could not determine home directory")]
    #[diagnostic(
        code(rigup::preflight::no_home),
        help("Set HOME (or RIGUP_HOME) to the directory rigup should provision")
    )]
    HomeNotFound,

    #[error("Home directory is not writable: {path}")]
    #[diagnostic(code(rigup::preflight::home_not_writable))]
    HomeNotWritable { path: String, reason: String },

    #[error("Package manager not found: {command}")]
    #[diagnostic(
        code(rigup::preflight::no_package_manager),
        help("Install it first, or point RIGUP_PKG at the package manager binary")
    )]
    PackageManagerMissing { command: String },

    #[error("Git committer identity is not configured")]
    #[diagnostic(
        code(rigup::git::identity_missing),
        help("Run 'git config --global user.name ...' and 'git config --global user.email ...'")
    )]
    GitIdentityMissing,

    // Package installation errors
    #[error("Failed to install {what} after {attempts} attempt(s)")]
    #[diagnostic(
        code(rigup::pkg::install_failed),
        help("All mirror tiers were tried; check network connectivity and mirror status")
    )]
    PackageInstallFailed { what: String, attempts: u32 },

    #[error("Failed to launch '{command}': {reason}")]
    #[diagnostic(code(rigup::pkg::spawn_failed))]
    ToolSpawnFailed { command: String, reason: String },

    // Dotfiles location errors
    #[error("Failed to create dotfiles directory: {path}")]
    #[diagnostic(code(rigup::dotfiles::not_creatable))]
    DotfilesNotCreatable { path: String, reason: String },

    #[error("Dotfiles directory is not writable: {path}")]
    #[diagnostic(
        code(rigup::dotfiles::not_writable),
        help("Fix ownership or permissions on the directory and re-run")
    )]
    DotfilesNotWritable { path: String },

    // Managed link errors
    #[error("Failed to back up {target}")]
    #[diagnostic(
        code(rigup::link::backup_failed),
        help("Pre-existing content is never deleted; the rename aside must succeed before linking")
    )]
    BackupFailed { target: String, reason: String },

    #[error("Failed to link {target}")]
    #[diagnostic(code(rigup::link::create_failed))]
    LinkFailed { target: String, reason: String },

    // Git errors
    #[error("Git operation failed: {message}")]
    #[diagnostic(code(rigup::git::operation_failed))]
    GitOperationFailed { message: String },

    // Prompting errors
    #[error("Failed to read confirmation: {reason}")]
    #[diagnostic(code(rigup::prompt::failed))]
    PromptFailed { reason: String },

    // File system errors
    #[error("Failed to read file: {path}")]
    #[diagnostic(code(rigup::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}")]
    #[diagnostic(code(rigup::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    // Manifest errors
    #[error("Failed to serialize link manifest")]
    #[diagnostic(code(rigup::manifest::serialize_failed))]
    ManifestSerializeFailed { reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(rigup::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for RigupError {
    fn from(err: std::io::Error) -> Self {
        RigupError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<git2::Error> for RigupError {
    fn from(err: git2::Error) -> Self {
        RigupError::GitOperationFailed {
            message: err.to_string(),
        }
    }
}

impl From<inquire::InquireError> for RigupError {
    fn from(err: inquire::InquireError) -> Self {
        RigupError::PromptFailed {
            reason: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for RigupError {
    fn from(err: serde_yaml::Error) -> Self {
        RigupError::ManifestSerializeFailed {
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, RigupError>;
