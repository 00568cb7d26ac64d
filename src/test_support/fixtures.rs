//! Test fixtures for asset projects.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::manifest::Manifest;

/// Location of the manifest inside a fixture project.
pub const MANIFEST_PATH: &str = "assets/manifest.json";

/// Fixture for a project directory with an asset manifest.
#[derive(Debug, Clone)]
pub struct ProjectFixture {
    /// Manifest JSON
    pub manifest: String,
    /// Files (path relative to project root -> content)
    pub files: BTreeMap<PathBuf, String>,
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectFixture {
    /// A project with an empty manifest.
    pub fn new() -> Self {
        ProjectFixture {
            manifest: "{}".to_string(),
            files: BTreeMap::new(),
        }
    }

    /// One style and one script bundle with a vendor library.
    pub fn standard() -> Self {
        ProjectFixture::new()
            .with_manifest(
                r#"{
  "config": { "devUrl": "http://example.test" },
  "dependencies": {
    "main.css": { "files": ["styles/main.scss"], "main": true },
    "main.js": { "files": ["scripts/main.js"], "bower": ["jquery"] }
  },
  "bower": [
    { "name": "jquery", "files": ["bower_components/jquery/dist/jquery.js"] },
    { "name": "normalize", "files": ["bower_components/normalize/normalize.css"] }
  ]
}"#,
            )
            .with_file(
                "assets/styles/main.scss",
                "// bower:scss\n// endbower\nbody { margin: 0; }\n",
            )
            .with_file("assets/scripts/main.js", "console.log('main');\n")
            .with_file("bower_components/jquery/dist/jquery.js", "/* jquery */\n")
            .with_file("bower_components/normalize/normalize.css", "html { }\n")
            .with_file("assets/fonts/icons.woff", "woff")
            .with_file("assets/images/logo.png", "png")
            .with_file("assets/images/sub/bg.png", "png")
            .with_file("assets/videos/intro.mp4", "mp4")
    }

    /// Set the manifest content.
    pub fn with_manifest(mut self, manifest: impl Into<String>) -> Self {
        self.manifest = manifest.into();
        self
    }

    /// Add or replace a file.
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    /// Write this fixture to a real directory.
    pub fn write_to(&self, root: &Path) -> std::io::Result<()> {
        let manifest_path = root.join(MANIFEST_PATH);
        if let Some(parent) = manifest_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&manifest_path, &self.manifest)?;

        for (path, content) in &self.files {
            let full = root.join(path);
            if let Some(parent) = full.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(full, content)?;
        }
        Ok(())
    }

    /// Write this fixture into a fresh temporary directory.
    pub fn write(&self) -> tempfile::TempDir {
        let tmp = tempfile::TempDir::new().expect("failed to create temp dir");
        self.write_to(tmp.path()).expect("failed to write fixture");
        tmp
    }

    /// Load the manifest of a written fixture.
    pub fn load_manifest(&self, root: &Path) -> Manifest {
        Manifest::load(&root.join(MANIFEST_PATH), root).expect("fixture manifest should load")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_fixture() {
        let fixture = ProjectFixture::standard();
        let tmp = fixture.write();

        assert!(tmp.path().join(MANIFEST_PATH).is_file());
        assert!(tmp.path().join("assets/styles/main.scss").is_file());

        let manifest = fixture.load_manifest(tmp.path());
        assert_eq!(manifest.dependencies.len(), 2);
        assert_eq!(manifest.dev_url(), Some("http://example.test"));
    }
}
