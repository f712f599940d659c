//! Link manifest
//!
//! A YAML record of every managed link, stored inside the dotfiles
//! directory (and therefore version-controlled with it). Rebuilt from
//! scratch on every run, so it is always a faithful picture of the last
//! provisioning pass.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dotfiles::DotfilesLocation;
use crate::error::{Result, RigupError};

/// Manifest file name inside the dotfiles root
pub const MANIFEST_FILE: &str = "rigup.manifest.yaml";

/// Marker recorded for directory links, which have no single content hash
const TREE_HASH: &str = "tree";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Managed target path on the host
    pub target: String,
    /// Source path relative to the dotfiles root
    pub source: String,
    /// blake3 hash of the deployed source content (`tree` for directories)
    pub hash: String,
}

/// Every managed link deployed by the current run.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkManifest {
    pub links: Vec<ManifestEntry>,
}

impl LinkManifest {
    /// Record a managed file link; the hash is taken from the canonical
    /// source content.
    pub fn record_file(
        &mut self,
        location: &DotfilesLocation,
        target: &Path,
        source_rel: &str,
    ) -> Result<()> {
        let source = location.source_path(source_rel);
        let content = std::fs::read(&source).map_err(|e| RigupError::FileReadFailed {
            path: source.display().to_string(),
            reason: e.to_string(),
        })?;
        self.push(target, source_rel, blake3::hash(&content).to_hex().to_string());
        Ok(())
    }

    /// Record a managed directory link.
    pub fn record_dir(&mut self, target: &Path, source_rel: &str) {
        self.push(target, source_rel, TREE_HASH.to_string());
    }

    fn push(&mut self, target: &Path, source_rel: &str, hash: String) {
        self.links.push(ManifestEntry {
            target: target.display().to_string(),
            source: source_rel.to_string(),
            hash,
        });
    }

    /// Write the manifest into the dotfiles root, entries sorted by target
    /// so repeated runs produce byte-identical output.
    pub fn save(&self, location: &DotfilesLocation) -> Result<()> {
        let mut sorted = self.clone();
        sorted.links.sort_by(|a, b| a.target.cmp(&b.target));

        let path = location.root.join(MANIFEST_FILE);
        let yaml = serde_yaml::to_string(&sorted)?;
        std::fs::write(&path, yaml).map_err(|e| RigupError::FileWriteFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(())
    }
}
