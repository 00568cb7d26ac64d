//! Configuration file support for sluice.
//!
//! sluice supports two configuration file locations:
//! - Global: `~/.sluice/config.toml` - User-wide defaults
//! - Project: `.sluice/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. Both hold tool
//! overrides, build and watch settings; bundles live in the asset manifest.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::tools::spec::ToolSpec;

/// Default quiet period before a watch rebuild.
pub const DEFAULT_DEBOUNCE_MS: u64 = 200;

/// sluice configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Per-tool overrides, keyed by tool name
    pub tools: BTreeMap<String, ToolSpec>,

    /// Build settings
    pub build: BuildConfig,

    /// Watch settings
    pub watch: WatchConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Number of parallel jobs (None = auto-detect)
    pub jobs: Option<usize>,
}

/// Watch-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Debounce window in milliseconds
    pub debounce_ms: Option<u64>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        for (name, spec) in other.tools {
            self.tools.entry(name).or_default().merge(spec);
        }

        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }

        if other.watch.debounce_ms.is_some() {
            self.watch.debounce_ms = other.watch.debounce_ms;
        }
    }

    /// Debounce window for watch mode.
    pub fn debounce_ms(&self) -> u64 {
        self.watch.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS)
    }
}

/// Load the merged configuration.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.sluice/config.toml)
/// 2. Global config (~/.sluice/config.toml)
/// 3. Defaults
///
/// A config file that exists but cannot be parsed is an error.
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global_path.filter(|p| p.exists()) {
        tracing::debug!("loading global config from {}", global_path.display());
        config.merge(Config::load(global_path)?);
    }

    if project_path.exists() {
        tracing::debug!("loading project config from {}", project_path.display());
        config.merge(Config::load(project_path)?);
    }

    Ok(config)
}

/// Get the global sluice config directory (~/.sluice).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".sluice"))
}

/// Get the global config path (~/.sluice/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.sluice/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".sluice").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.tools.is_empty());
        assert!(config.build.jobs.is_none());
        assert_eq!(config.debounce_ms(), DEFAULT_DEBOUNCE_MS);
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[tools.sass]
command = "dart-sass"
args = ["--stdin"]

[tools.cssnano]
enabled = false

[tools.autoprefixer.env]
BROWSERSLIST = "defaults"

[build]
jobs = 8

[watch]
debounce_ms = 50
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.tools["sass"].command.as_deref(), Some("dart-sass"));
        assert_eq!(config.tools["cssnano"].enabled, Some(false));
        assert_eq!(
            config.tools["autoprefixer"].env.get("BROWSERSLIST").map(String::as_str),
            Some("defaults")
        );
        assert_eq!(config.build.jobs, Some(8));
        assert_eq!(config.debounce_ms(), 50);
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.build.jobs = Some(4);
        base.tools.insert(
            "sass".into(),
            ToolSpec {
                command: Some("sass".into()),
                args: Some(vec!["--stdin".into()]),
                ..Default::default()
            },
        );

        let mut override_cfg = Config::default();
        override_cfg.tools.insert(
            "sass".into(),
            ToolSpec {
                enabled: Some(false),
                ..Default::default()
            },
        );

        base.merge(override_cfg);

        assert_eq!(base.build.jobs, Some(4)); // Not overridden
        assert_eq!(base.tools["sass"].command.as_deref(), Some("sass"));
        assert_eq!(base.tools["sass"].enabled, Some(false));
    }

    #[test]
    fn test_load_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = tmp.path().join("project.toml");

        std::fs::write(&global, "[build]\njobs = 2\n[watch]\ndebounce_ms = 10\n").unwrap();
        std::fs::write(&project, "[build]\njobs = 6\n").unwrap();

        let config = load_config(Some(&global), &project).unwrap();
        assert_eq!(config.build.jobs, Some(6));
        assert_eq!(config.debounce_ms(), 10);
    }

    #[test]
    fn test_load_config_missing_files() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(None, &tmp.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_config_is_error() {
        let tmp = TempDir::new().unwrap();
        let project = tmp.path().join("config.toml");
        std::fs::write(&project, "[build\n").unwrap();

        assert!(load_config(None, &project).is_err());
    }
}
