//! Global context for sluice operations.
//!
//! Holds the working directory and locates the manifest from it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::error::AssetError;

/// Manifest file names, in lookup order.
pub const MANIFEST_NAMES: &[&str] = &["manifest.json", "manifest.toml"];

/// Directory (below the project root) holding the manifest.
pub const MANIFEST_DIR: &str = "assets";

/// Global context for one invocation.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,
}

/// A located manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestLocation {
    /// Manifest file
    pub path: PathBuf,

    /// Project root all manifest paths resolve against
    pub root: PathBuf,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(GlobalContext { cwd })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        GlobalContext { cwd }
    }

    /// Locate the manifest.
    ///
    /// An explicit path resolves against the cwd and makes the cwd the
    /// project root. Otherwise `assets/manifest.json` (or `.toml`) is
    /// searched for from the cwd upward; the directory containing
    /// `assets/` is the project root.
    pub fn find_manifest(&self, explicit: Option<&Path>) -> Result<ManifestLocation, AssetError> {
        if let Some(explicit) = explicit {
            let path = self.cwd.join(explicit);
            if !path.is_file() {
                return Err(AssetError::config_at(&path, "manifest file not found"));
            }
            return Ok(ManifestLocation {
                path,
                root: self.cwd.clone(),
            });
        }

        let mut current = Some(self.cwd.as_path());
        while let Some(dir) = current {
            for name in MANIFEST_NAMES {
                let candidate = dir.join(MANIFEST_DIR).join(name);
                if candidate.is_file() {
                    return Ok(ManifestLocation {
                        path: candidate,
                        root: dir.to_path_buf(),
                    });
                }
            }
            current = dir.parent();
        }

        Err(AssetError::ManifestNotFound {
            searched: self.cwd.clone(),
        })
    }
}
