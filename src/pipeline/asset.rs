//! Files flowing through a pipeline.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::pipeline::sourcemap::{line_count, SourceMap};
use crate::util::fs::{relative_path, to_slash};

/// One in-memory file.
///
/// `path` is where the file logically lives; `base` is the directory
/// output paths are computed relative to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFile {
    /// Logical absolute path
    pub path: PathBuf,

    /// Base directory for the relative output path
    pub base: PathBuf,

    /// File contents
    pub contents: Vec<u8>,

    /// Line map, when maps are enabled
    pub source_map: Option<SourceMap>,

    /// Relative name before fingerprinting, set by the rev stage
    pub revision_of: Option<String>,
}

impl AssetFile {
    pub fn new(path: impl Into<PathBuf>, base: impl Into<PathBuf>, contents: Vec<u8>) -> Self {
        AssetFile {
            path: path.into(),
            base: base.into(),
            contents,
            source_map: None,
            revision_of: None,
        }
    }

    /// Path relative to `base`.
    pub fn relative(&self) -> PathBuf {
        relative_path(&self.base, &self.path)
    }

    /// Relative path with forward slashes.
    pub fn relative_slash(&self) -> String {
        to_slash(&self.relative())
    }

    /// File name of the logical path.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Extension of the logical path, lowercased.
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
    }

    /// Contents as text, lossily.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.contents)
    }

    /// Number of lines in the contents.
    pub fn line_count(&self) -> usize {
        line_count(&self.text())
    }

    /// Replace the contents, keeping the line map in step.
    pub fn set_contents(&mut self, contents: Vec<u8>) {
        self.contents = contents;
        if let Some(map) = self.source_map.take() {
            self.source_map = Some(map.transformed(self.line_count()));
        }
    }

    /// Move the file to a new location under the same base.
    pub fn rename(&mut self, path: &Path) {
        self.path = path.to_path_buf();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative() {
        let file = AssetFile::new(
            "/p/assets/styles/sub/a.scss",
            "/p/assets/styles",
            b"a{}".to_vec(),
        );
        assert_eq!(file.relative_slash(), "sub/a.scss");
        assert_eq!(file.file_name(), "a.scss");
        assert_eq!(file.extension().as_deref(), Some("scss"));
    }

    #[test]
    fn test_set_contents_updates_map() {
        let mut file = AssetFile::new("/p/a.scss", "/p", b"a\nb\nc".to_vec());
        file.source_map = Some(SourceMap::identity("a.scss", "a\nb\nc"));

        file.set_contents(b"a b c".to_vec());
        assert_eq!(file.source_map.as_ref().unwrap().lines().len(), 1);
    }
}
