//! Asset manifest parsing and schema.
//!
//! The manifest names every bundle the project produces and where sources
//! and outputs live. It is read once per invocation and never mutated.
//! Both `manifest.json` and `manifest.toml` are accepted; the format is
//! chosen by extension.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::dependency::{AssetType, Dependency};
use crate::core::error::AssetError;

/// Default source root, relative to the project root.
pub const DEFAULT_SOURCE: &str = "assets/";

/// Default output root, relative to the project root.
pub const DEFAULT_DIST: &str = "dist/";

/// File name of the revision manifest inside the output root.
pub const REVISION_MANIFEST: &str = "assets.json";

const FONT_EXTENSIONS: &[&str] = &["eot", "otf", "svg", "ttf", "woff", "woff2"];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "svg", "webp"];

/// Base directories, always ending in `/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paths {
    /// Source root (default `assets/`)
    pub source: String,

    /// Output root (default `dist/`)
    pub dist: String,
}

impl Default for Paths {
    fn default() -> Self {
        Paths {
            source: DEFAULT_SOURCE.to_string(),
            dist: DEFAULT_DIST.to_string(),
        }
    }
}

/// Resolved source patterns, per asset class.
///
/// Every list is present; an empty list means "nothing of this kind".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Globs {
    /// First-party style sources of every style bundle
    pub styles: Vec<String>,

    /// First-party script sources of every script bundle
    pub scripts: Vec<String>,

    /// Font sources
    pub fonts: Vec<String>,

    /// Image sources
    pub images: Vec<String>,

    /// Every vendor-library entry file
    pub bower: Vec<String>,
}

/// A third-party library and its entry files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorLibrary {
    /// Library name, referenced from a dependency's `bower` list
    pub name: String,

    /// Entry files, relative to the project root
    #[serde(default)]
    pub files: Vec<String>,
}

/// The parsed asset manifest.
#[derive(Debug, Clone)]
pub struct Manifest {
    /// Source and output roots
    pub paths: Paths,

    /// Free-form settings (e.g. `devUrl`)
    pub config: BTreeMap<String, Value>,

    /// Resolved source patterns
    pub globs: Globs,

    /// Declared bundles, ordered by name within each type
    pub dependencies: Vec<Dependency>,

    /// Third-party libraries
    pub vendor: Vec<VendorLibrary>,

    /// Directory all relative paths are resolved against
    root: PathBuf,

    /// Location of the manifest file
    path: PathBuf,
}

/// Raw manifest as deserialized from JSON or TOML.
#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default)]
    paths: RawPaths,

    #[serde(default)]
    config: BTreeMap<String, Value>,

    #[serde(default)]
    dependencies: BTreeMap<String, RawDependency>,

    #[serde(default)]
    bower: Vec<VendorLibrary>,

    #[serde(default)]
    fonts: Vec<String>,

    #[serde(default)]
    images: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPaths {
    source: Option<String>,
    dist: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDependency {
    #[serde(default)]
    files: Vec<String>,

    #[serde(default)]
    vendor: Vec<String>,

    #[serde(default)]
    bower: Vec<String>,

    #[serde(default)]
    main: bool,

    #[serde(default, rename = "type")]
    asset_type: Option<AssetType>,
}

/// Manifest file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Json,
    Toml,
}

impl ManifestFormat {
    /// Pick the format from a file extension (JSON unless `.toml`).
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ManifestFormat::Toml,
            _ => ManifestFormat::Json,
        }
    }
}

impl Manifest {
    /// Load a manifest file. Relative paths inside it resolve against `root`.
    pub fn load(path: &Path, root: &Path) -> Result<Self, AssetError> {
        if !path.is_file() {
            return Err(AssetError::config_at(path, "manifest file not found"));
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AssetError::config_at(path, format!("failed to read manifest: {}", e)))?;

        Self::parse(&contents, ManifestFormat::from_path(path), root, path)
    }

    /// Parse manifest contents.
    pub fn parse(
        contents: &str,
        format: ManifestFormat,
        root: &Path,
        path: &Path,
    ) -> Result<Self, AssetError> {
        let raw: RawManifest = match format {
            ManifestFormat::Json => serde_json::from_str(contents)
                .map_err(|e| AssetError::config_at(path, format!("malformed manifest: {}", e)))?,
            ManifestFormat::Toml => toml::from_str(contents)
                .map_err(|e| AssetError::config_at(path, format!("malformed manifest: {}", e)))?,
        };

        Self::from_raw(raw, root, path)
    }

    fn from_raw(raw: RawManifest, root: &Path, path: &Path) -> Result<Self, AssetError> {
        let paths = Paths {
            source: normalize_dir(raw.paths.source.as_deref().unwrap_or(DEFAULT_SOURCE))
                .map_err(|m| AssetError::config_at(path, format!("paths.source: {}", m)))?,
            dist: normalize_dir(raw.paths.dist.as_deref().unwrap_or(DEFAULT_DIST))
                .map_err(|m| AssetError::config_at(path, format!("paths.dist: {}", m)))?,
        };

        let mut library_names = std::collections::HashSet::new();
        for lib in &raw.bower {
            if !library_names.insert(lib.name.as_str()) {
                return Err(AssetError::config_at(
                    path,
                    format!("vendor library `{}` is declared twice", lib.name),
                ));
            }
        }

        let mut dependencies = Vec::new();
        let mut styles = Vec::new();
        let mut scripts = Vec::new();

        for (name, dep) in &raw.dependencies {
            let asset_type = match dep.asset_type.or_else(|| AssetType::from_file_name(name)) {
                Some(t) => t,
                None => {
                    return Err(AssetError::config_at(
                        path,
                        format!(
                            "cannot infer the type of bundle `{}`; use a .css/.js name or set `type`",
                            name
                        ),
                    ))
                }
            };

            let mut globs = Vec::new();

            let libraries: Vec<&VendorLibrary> = if dep.main {
                raw.bower.iter().collect()
            } else {
                let mut picked = Vec::new();
                for lib_name in &dep.bower {
                    match raw.bower.iter().find(|l| &l.name == lib_name) {
                        Some(lib) => picked.push(lib),
                        None => {
                            return Err(AssetError::config_at(
                                path,
                                format!(
                                    "bundle `{}` references unknown vendor library `{}`",
                                    name, lib_name
                                ),
                            ))
                        }
                    }
                }
                picked
            };
            for lib in libraries {
                globs.extend(
                    lib.files
                        .iter()
                        .filter(|f| asset_type.matches_source(Path::new(f)))
                        .cloned(),
                );
            }

            globs.extend(dep.vendor.iter().cloned());

            let project: Vec<String> = dep
                .files
                .iter()
                .map(|f| format!("{}{}", paths.source, f))
                .collect();
            match asset_type {
                AssetType::Styles => styles.extend(project.iter().cloned()),
                AssetType::Scripts => scripts.extend(project.iter().cloned()),
            }
            globs.extend(project);

            dependencies.push(Dependency::new(asset_type, name.clone(), globs));
        }

        let vendor_files: Vec<&String> = raw.bower.iter().flat_map(|l| l.files.iter()).collect();

        let mut fonts = vec![format!("{}fonts/**/*", paths.source)];
        fonts.extend(
            vendor_files
                .iter()
                .filter(|f| has_extension(f, FONT_EXTENSIONS))
                .map(|f| f.to_string()),
        );
        fonts.extend(raw.fonts.iter().cloned());

        let mut images = vec![format!("{}images/**/*", paths.source)];
        images.extend(
            vendor_files
                .iter()
                .filter(|f| has_extension(f, IMAGE_EXTENSIONS))
                .map(|f| f.to_string()),
        );
        images.extend(raw.images.iter().cloned());

        let globs = Globs {
            styles,
            scripts,
            fonts,
            images,
            bower: vendor_files.into_iter().cloned().collect(),
        };

        Ok(Manifest {
            paths,
            config: raw.config,
            globs,
            dependencies,
            vendor: raw.bower,
            root: root.to_path_buf(),
            path: path.to_path_buf(),
        })
    }

    /// Iterate over the bundles of one type.
    pub fn dependencies_of(&self, asset_type: AssetType) -> impl Iterator<Item = &Dependency> {
        self.dependencies
            .iter()
            .filter(move |d| d.asset_type == asset_type)
    }

    /// First-party source patterns for a bundle type.
    pub fn project_globs(&self, asset_type: AssetType) -> &[String] {
        match asset_type {
            AssetType::Styles => &self.globs.styles,
            AssetType::Scripts => &self.globs.scripts,
        }
    }

    /// The project root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the manifest file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Absolute source root.
    pub fn source_dir(&self) -> PathBuf {
        self.root.join(&self.paths.source)
    }

    /// Absolute output root.
    pub fn dist_dir(&self) -> PathBuf {
        self.root.join(&self.paths.dist)
    }

    /// Location of the revision manifest.
    pub fn revision_manifest_path(&self) -> PathBuf {
        self.dist_dir().join(REVISION_MANIFEST)
    }

    /// A string setting from `config`.
    pub fn config_str(&self, key: &str) -> Option<&str> {
        self.config.get(key).and_then(Value::as_str)
    }

    /// The development server origin proxied in watch mode.
    pub fn dev_url(&self) -> Option<&str> {
        self.config_str("devUrl")
    }

    /// Source-root-relative path of the only script that is transpiled.
    pub fn transpile_entry(&self) -> PathBuf {
        let entry = self.config_str("transpileEntry").unwrap_or("scripts/main.js");
        self.source_dir().join(entry)
    }
}

/// Normalize a directory string so it ends in exactly one `/`.
fn normalize_dir(dir: &str) -> Result<String, String> {
    let trimmed = dir.trim().replace('\\', "/");
    if trimmed.is_empty() {
        return Err("directory must not be empty".to_string());
    }
    let stripped = trimmed.trim_end_matches('/');
    if stripped.is_empty() {
        return Err("the filesystem root is not a valid asset directory".to_string());
    }
    Ok(format!("{}/", stripped))
}

fn has_extension(file: &str, extensions: &[&str]) -> bool {
    Path::new(file)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}
