//! Conventional home directory layout
//!
//! Every step that writes into the user's home area goes through this fixed
//! set of locations. The home root itself can be overridden with the
//! `RIGUP_HOME` environment variable (used by the integration tests to run
//! the whole pipeline inside a sandbox).

use std::path::PathBuf;

use crate::error::{Result, RigupError};

/// Subdirectory for user-local executables (added to PATH)
pub const BIN_DIR: &str = "bin";

/// Subdirectory for application configuration
pub const CONFIG_DIR: &str = ".config";

/// Subdirectory for generated documentation and provisioning notes
pub const DOCS_DIR: &str = "docs";

/// Dedicated root for project checkouts
pub const WORKSPACE_DIR: &str = "workspace";

/// Shell startup file that receives idempotent environment appends
pub const PROFILE_FILE: &str = ".profile";

/// The fixed set of conventional locations under the user's home area.
///
/// Resolved once at startup and shared by every step.
#[derive(Debug, Clone)]
pub struct HomeLayout {
    /// Home root (real home, or the `RIGUP_HOME` override)
    pub home: PathBuf,
}

impl HomeLayout {
    /// Resolve the home root from the environment.
    pub fn resolve() -> Result<Self> {
        if let Ok(root) = std::env::var("RIGUP_HOME") {
            return Ok(Self {
                home: PathBuf::from(root),
            });
        }

        let home = dirs::home_dir().ok_or(RigupError::HomeNotFound)?;
        Ok(Self { home })
    }

    /// User-local executables directory
    pub fn bin(&self) -> PathBuf {
        self.home.join(BIN_DIR)
    }

    /// Application configuration directory
    pub fn config(&self) -> PathBuf {
        self.home.join(CONFIG_DIR)
    }

    /// Documentation directory
    pub fn docs(&self) -> PathBuf {
        self.home.join(DOCS_DIR)
    }

    /// Project workspace root
    pub fn workspace(&self) -> PathBuf {
        self.home.join(WORKSPACE_DIR)
    }

    /// Shell startup file receiving PATH extensions and init hooks
    pub fn profile(&self) -> PathBuf {
        self.home.join(PROFILE_FILE)
    }

    /// All conventional subdirectories, in creation order.
    pub fn subdirectories(&self) -> Vec<PathBuf> {
        vec![self.bin(), self.config(), self.docs(), self.workspace()]
    }
}
