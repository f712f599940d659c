//! Mirror registry: ordered tiers of package-source endpoints
//!
//! Tiers run from best expected performance to maximal reliability. The
//! cursor only moves forward within one run; tier order is fixed at
//! definition time and never reordered on measured latency. The registry
//! itself does no network I/O.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Result, RigupError};

/// Default endpoint file consumed by the package manager
const DEFAULT_ENDPOINT_FILE: &str = "/etc/pacman.d/mirrorlist";

/// One ordered set of alternative endpoints, tried together before falling
/// back to the next tier.
#[derive(Debug, Clone)]
pub struct MirrorTier {
    pub name: &'static str,
    pub endpoints: &'static [&'static str],
}

/// Geo-ranked endpoints: fastest when they work, least guaranteed.
const OPTIMIZED: MirrorTier = MirrorTier {
    name: "optimized",
    endpoints: &[
        "https://geo.mirror.pkgbuild.com/$repo/os/$arch",
        "https://mirror.rackspace.com/archlinux/$repo/os/$arch",
    ],
};

/// Curated worldwide set with a long uptime record.
const CURATED: MirrorTier = MirrorTier {
    name: "curated",
    endpoints: &[
        "https://europe.mirror.pkgbuild.com/$repo/os/$arch",
        "https://america.mirror.pkgbuild.com/$repo/os/$arch",
        "https://asia.mirror.pkgbuild.com/$repo/os/$arch",
    ],
};

/// Single archive endpoint, slow but essentially always reachable.
const EMERGENCY: MirrorTier = MirrorTier {
    name: "emergency",
    endpoints: &["https://archive.archlinux.org/repos/last/$repo/os/$arch"],
};

/// Ordered tiers plus a forward-only cursor over them.
#[derive(Debug)]
pub struct MirrorRegistry {
    tiers: Vec<MirrorTier>,
    cursor: usize,
    endpoint_file: PathBuf,
}

impl MirrorRegistry {
    /// Registry with the built-in tier ordering. The endpoint file can be
    /// overridden with `RIGUP_MIRRORLIST`.
    pub fn from_env() -> Self {
        let endpoint_file = std::env::var("RIGUP_MIRRORLIST")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_ENDPOINT_FILE));
        Self::new(vec![OPTIMIZED, CURATED, EMERGENCY], endpoint_file)
    }

    pub fn new(tiers: Vec<MirrorTier>, endpoint_file: PathBuf) -> Self {
        Self {
            tiers,
            cursor: 0,
            endpoint_file,
        }
    }

    /// The currently active tier.
    pub fn active(&self) -> &MirrorTier {
        &self.tiers[self.cursor.min(self.tiers.len() - 1)]
    }

    /// Advance to the next tier. Returns false when no further tier exists,
    /// signalling exhaustion to the caller. Never regresses.
    pub fn advance(&mut self) -> bool {
        if self.cursor + 1 >= self.tiers.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Rewrite the package manager's endpoint configuration to match the
    /// active tier. Written through a temp file in the same directory, then
    /// renamed, so an interrupt never leaves a half-written endpoint file.
    pub fn write_endpoint_config(&self) -> Result<()> {
        let path = &self.endpoint_file;
        let write_error = |reason: String| RigupError::FileWriteFailed {
            path: path.display().to_string(),
            reason,
        };

        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent).map_err(|e| write_error(e.to_string()))?;

        let mut temp = tempfile::NamedTempFile::new_in(parent)
            .map_err(|e| write_error(e.to_string()))?;
        crate::cleanup::register_transient(temp.path());
        let temp_path = temp.path().to_path_buf();

        let tier = self.active();
        writeln!(temp, "## rigup: {} tier", tier.name)
            .and_then(|()| {
                for endpoint in tier.endpoints {
                    writeln!(temp, "Server = {endpoint}")?;
                }
                Ok(())
            })
            .map_err(|e| write_error(e.to_string()))?;

        temp.persist(path)
            .map_err(|e| write_error(e.to_string()))?;
        crate::cleanup::clear_transient(&temp_path);
        Ok(())
    }
}
