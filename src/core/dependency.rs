//! Bundle declarations.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The kind of bundle a dependency produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    /// Stylesheets, concatenated into a `.css` bundle.
    #[serde(alias = "css")]
    Styles,
    /// Scripts, concatenated into a `.js` bundle.
    #[serde(alias = "js")]
    Scripts,
}

impl AssetType {
    /// All bundle types, in build order.
    pub const ALL: [AssetType; 2] = [AssetType::Styles, AssetType::Scripts];

    /// Namespace directory, used for source rebasing and as the output subdirectory.
    pub fn dir_name(&self) -> &'static str {
        match self {
            AssetType::Styles => "styles",
            AssetType::Scripts => "scripts",
        }
    }

    /// Extension of the bundle file.
    pub fn extension(&self) -> &'static str {
        match self {
            AssetType::Styles => "css",
            AssetType::Scripts => "js",
        }
    }

    /// Source extensions that belong to this type when picking vendor files.
    pub fn source_extensions(&self) -> &'static [&'static str] {
        match self {
            AssetType::Styles => &["css", "scss", "sass", "less"],
            AssetType::Scripts => &["js"],
        }
    }

    /// Infer the type from an output file name.
    pub fn from_file_name(name: &str) -> Option<AssetType> {
        match Path::new(name).extension()?.to_str()? {
            "css" => Some(AssetType::Styles),
            "js" => Some(AssetType::Scripts),
            _ => None,
        }
    }

    /// Check whether a source file belongs to this type.
    pub fn matches_source(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                self.source_extensions()
                    .iter()
                    .any(|ext| ext.eq_ignore_ascii_case(e))
            })
            .unwrap_or(false)
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for AssetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "styles" | "css" => Ok(AssetType::Styles),
            "scripts" | "js" => Ok(AssetType::Scripts),
            _ => Err(format!(
                "invalid asset type '{}'; expected 'styles' or 'scripts'",
                s
            )),
        }
    }
}

/// One logical output bundle.
///
/// Identity is `(asset_type, name)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Bundle type
    pub asset_type: AssetType,

    /// Output file name (e.g. `main.css`)
    pub name: String,

    /// Ordered source patterns, relative to the project root
    pub globs: Vec<String>,
}

impl Dependency {
    /// Create a new dependency.
    pub fn new(asset_type: AssetType, name: impl Into<String>, globs: Vec<String>) -> Self {
        Dependency {
            asset_type,
            name: name.into(),
            globs,
        }
    }
}
