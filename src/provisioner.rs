//! Shared state for one provisioning run
//!
//! Built once at startup and handed mutably to every step: the interaction
//! mode, the home layout, the package manager (whose mirror cursor persists
//! across steps within the run), the link manifest being accumulated, and
//! the memoized dotfiles location.

use crate::context::{ExecutionContext, InteractionMode};
use crate::dotfiles::manifest::LinkManifest;
use crate::dotfiles::{self, DotfilesLocation};
use crate::error::Result;
use crate::paths::HomeLayout;
use crate::pkg::PackageManager;

pub struct Provisioner {
    pub ctx: ExecutionContext,
    pub layout: HomeLayout,
    pub pkg: PackageManager,
    pub manifest: LinkManifest,
    dotfiles: Option<DotfilesLocation>,
}

impl Provisioner {
    /// Build the run state from the environment.
    pub fn bootstrap(mode: InteractionMode) -> Result<Self> {
        Ok(Self {
            ctx: ExecutionContext::new(mode),
            layout: HomeLayout::resolve()?,
            pkg: PackageManager::from_env(),
            manifest: LinkManifest::default(),
            dotfiles: None,
        })
    }

    /// The canonical dotfiles location, resolved on first use and cached
    /// for the remainder of the run.
    pub fn dotfiles(&mut self) -> Result<&DotfilesLocation> {
        if self.dotfiles.is_none() {
            let resolved = dotfiles::resolve(&self.ctx, &self.layout)?;
            self.dotfiles = Some(resolved);
        }
        match self.dotfiles.as_ref() {
            Some(location) => Ok(location),
            // Unreachable after the insert above; typed for completeness
            None => Err(crate::error::RigupError::HomeNotFound),
        }
    }

    /// Test constructor with a fixed home root, bypassing the environment.
    #[cfg(test)]
    pub fn for_home(home: &std::path::Path, mode: InteractionMode) -> Self {
        Self {
            ctx: ExecutionContext::new(mode),
            layout: HomeLayout {
                home: home.to_path_buf(),
            },
            pkg: PackageManager::from_env(),
            manifest: LinkManifest::default(),
            dotfiles: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleanup::temp_dir_base;
    use crate::dotfiles::LocationMode;

    #[test]
    fn test_dotfiles_location_is_memoized() {
        let temp = tempfile::TempDir::new_in(temp_dir_base()).unwrap();
        let mut prov = Provisioner::for_home(temp.path(), InteractionMode::Unattended);

        let first = prov.dotfiles().unwrap().root.clone();

        // Even if a unified directory appears mid-run, the resolution
        // sticks for the rest of the run
        std::fs::create_dir_all(temp.path().join("sync/dotfiles")).unwrap();
        let second = prov.dotfiles().unwrap();

        assert_eq!(second.root, first);
        assert_eq!(second.mode, LocationMode::HostLocal);
    }
}
