//! Filesystem utilities.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use glob::{glob, Pattern};
use walkdir::WalkDir;

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Read a file to bytes, with nice error messages.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write bytes to a file through a temporary sibling and a rename.
///
/// Readers never observe a half-written file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    ensure_dir(parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("failed to create temporary file in {}", parent.display()))?;
    tmp.write_all(contents)
        .with_context(|| format!("failed to write file: {}", path.display()))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("failed to write file: {}", path.display()))?;
    Ok(())
}

/// Find files matching glob patterns relative to a base directory.
///
/// Results keep pattern order; matches of a single pattern are sorted.
/// A file matched by several patterns is reported once, at its first
/// position. Patterns starting with `!` exclude files matched so far or later.
pub fn glob_files(base: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut excludes = Vec::new();
    for pattern in patterns.iter().filter_map(|p| p.strip_prefix('!')) {
        let full = absolutize(base, pattern);
        excludes.push(
            Pattern::new(&full)
                .with_context(|| format!("invalid glob pattern: !{}", pattern))?,
        );
    }

    let mut seen = HashSet::new();
    let mut results = Vec::new();

    for pattern in patterns.iter().filter(|p| !p.starts_with('!')) {
        let full_pattern = absolutize(base, pattern);

        let mut matched = Vec::new();
        for entry in
            glob(&full_pattern).with_context(|| format!("invalid glob pattern: {}", pattern))?
        {
            match entry {
                Ok(path) => {
                    if path.is_file() {
                        matched.push(path);
                    }
                }
                Err(e) => {
                    tracing::warn!("glob error: {}", e);
                }
            }
        }
        matched.sort();

        for path in matched {
            if excludes.iter().any(|ex| ex.matches_path(&path)) {
                continue;
            }
            if seen.insert(path.clone()) {
                results.push(path);
            }
        }
    }

    Ok(results)
}

/// The directory a glob pattern is anchored at: every leading component
/// that contains no wildcard.
///
/// `assets/images/**/*.png` has the base `assets/images`.
pub fn glob_base(pattern: &str) -> PathBuf {
    let mut base = PathBuf::new();
    let path = Path::new(pattern);
    let components: Vec<_> = path.components().collect();

    for (i, component) in components.iter().enumerate() {
        let text = component.as_os_str().to_string_lossy();
        let is_last = i + 1 == components.len();
        if text.contains(['*', '?', '[', '{']) || is_last {
            break;
        }
        base.push(component.as_os_str());
    }

    base
}

/// List every file below `dir`, sorted.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry =
            entry.with_context(|| format!("failed to walk directory: {}", dir.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Render a path with forward slashes, as stored in manifests.
pub fn to_slash(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect();
    parts.join("/")
}

/// Anchor a relative pattern at `base`. Wildcard characters in `base`
/// itself match literally.
fn absolutize(base: &Path, pattern: &str) -> String {
    if Path::new(pattern).is_absolute() {
        return pattern.to_string();
    }
    Path::new(&Pattern::escape(&base.to_string_lossy()))
        .join(pattern)
        .to_string_lossy()
        .into_owned()
}
