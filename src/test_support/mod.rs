//! Test utilities and fake tools for sluice unit tests.
//!
//! Real tools (sass, postcss, babel, ...) are never needed by unit tests:
//! the fakes here implement the tool traits in-process and record how they
//! were called.
//!
//! # Example
//!
//! ```rust,ignore
//! use sluice::test_support::{FakeProcessor, ProjectFixture};
//!
//! #[test]
//! fn test_example() {
//!     let project = ProjectFixture::new()
//!         .with_file("assets/styles/a.scss", "a { }")
//!         .write();
//!     let tools = fake_registry();
//!     // Run tasks against project.path()...
//! }
//! ```

pub mod fixtures;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};

pub use fixtures::*;

use crate::tools::{names, Generator, LintOutcome, Linter, Processor, ToolRegistry, ToolVars};

/// How a fake processor transforms its input.
#[derive(Debug, Clone)]
pub enum FakeBehavior {
    /// Return the input unchanged
    Identity,
    /// Uppercase the input
    Uppercase,
    /// Append a marker line
    Append(String),
    /// Collapse every line into one
    JoinLines,
    /// Fail when the input contains the marker
    FailOn(String),
}

/// In-process processor that records the files it saw.
#[derive(Debug)]
pub struct FakeProcessor {
    name: String,
    behavior: FakeBehavior,
    calls: Mutex<Vec<PathBuf>>,
}

impl FakeProcessor {
    pub fn new(name: impl Into<String>, behavior: FakeBehavior) -> Self {
        FakeProcessor {
            name: name.into(),
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Files processed so far, in call order.
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Processor for FakeProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&self, path: &Path, contents: &[u8], _vars: &ToolVars) -> Result<Vec<u8>> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(path.to_path_buf());
        }
        let text = String::from_utf8_lossy(contents);
        let out = match &self.behavior {
            FakeBehavior::Identity => text.into_owned(),
            FakeBehavior::Uppercase => text.to_uppercase(),
            FakeBehavior::Append(marker) => format!("{}\n{}", text, marker),
            FakeBehavior::JoinLines => text.lines().collect::<Vec<_>>().join(" "),
            FakeBehavior::FailOn(marker) => {
                if text.contains(marker.as_str()) {
                    bail!("{}: found `{}` in {}", self.name, marker, path.display());
                }
                text.into_owned()
            }
        };
        Ok(out.into_bytes())
    }
}

/// Linter that fails when any file contains a marker.
#[derive(Debug)]
pub struct FakeLinter {
    name: String,
    marker: String,
    calls: Mutex<Vec<Vec<PathBuf>>>,
}

impl FakeLinter {
    pub fn new(name: impl Into<String>, marker: impl Into<String>) -> Self {
        FakeLinter {
            name: name.into(),
            marker: marker.into(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<PathBuf>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Linter for FakeLinter {
    fn name(&self) -> &str {
        &self.name
    }

    fn lint(&self, files: &[PathBuf], _vars: &ToolVars) -> Result<LintOutcome> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(files.to_vec());
        }
        let mut report = String::new();
        for file in files {
            let contents = std::fs::read_to_string(file)?;
            if contents.contains(self.marker.as_str()) {
                report.push_str(&format!("{}: found `{}`\n", file.display(), self.marker));
            }
        }
        Ok(LintOutcome {
            passed: report.is_empty(),
            report,
        })
    }
}

/// Generator that writes one file per input into the output directory.
#[derive(Debug)]
pub struct FakeGenerator {
    name: String,
    output: String,
}

impl FakeGenerator {
    /// `output` is the file name written into the output directory.
    pub fn new(name: impl Into<String>, output: impl Into<String>) -> Self {
        FakeGenerator {
            name: name.into(),
            output: output.into(),
        }
    }
}

impl Generator for FakeGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate(&self, inputs: &[PathBuf], output_dir: &Path, vars: &ToolVars) -> Result<()> {
        let out = output_dir.join(&self.output);
        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut listing: Vec<String> = inputs
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        if let Some(options) = vars.get("options") {
            listing.push(options.to_string());
        }
        std::fs::write(out, listing.join("\n"))?;
        Ok(())
    }
}

/// A registry where every built-in tool is a harmless fake.
///
/// Processors are identity transforms, linters look for `LINT_ERROR`,
/// generators write a listing of their inputs.
pub fn fake_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    for &name in names::PROCESSORS {
        registry.register_processor(name, Arc::new(FakeProcessor::new(name, FakeBehavior::Identity)));
    }
    for &name in names::LINTERS {
        registry.register_linter(name, Arc::new(FakeLinter::new(name, "LINT_ERROR")));
    }
    registry.register_generator(
        names::FAVICONS,
        Arc::new(FakeGenerator::new(names::FAVICONS, "favicon.ico")),
    );
    registry.register_generator(
        names::SVG_SPRITE,
        Arc::new(FakeGenerator::new(names::SVG_SPRITE, "icons/icons-store.svg")),
    );
    registry
}

/// Assertion helpers for testing.
pub mod assertions {
    use std::path::Path;

    /// Assert that a file exists and return its contents.
    pub fn assert_file(path: impl AsRef<Path>) -> String {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => panic!("expected file {}: {}", path.display(), e),
        }
    }

    /// Assert that nothing exists at a path.
    pub fn assert_missing(path: impl AsRef<Path>) {
        let path = path.as_ref();
        assert!(!path.exists(), "expected no file at {}", path.display());
    }

    /// Assert that a file contains specific content.
    pub fn assert_file_contains(path: impl AsRef<Path>, content: &str) {
        let path = path.as_ref();
        let actual = assert_file(path);
        assert!(
            actual.contains(content),
            "file {} does not contain '{}'\nactual content:\n{}",
            path.display(),
            content,
            actual
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_processor_behaviors() {
        let vars = ToolVars::default();
        let upper = FakeProcessor::new("sass", FakeBehavior::Uppercase);
        assert_eq!(upper.process(Path::new("a"), b"ab", &vars).unwrap(), b"AB");
        assert_eq!(upper.calls(), vec![PathBuf::from("a")]);

        let join = FakeProcessor::new("cssnano", FakeBehavior::JoinLines);
        assert_eq!(join.process(Path::new("a"), b"a\nb", &vars).unwrap(), b"a b");

        let failing = FakeProcessor::new("sass", FakeBehavior::FailOn("ERROR".into()));
        assert!(failing.process(Path::new("a"), b"ERROR", &vars).is_err());
        assert!(failing.process(Path::new("a"), b"ok", &vars).is_ok());
    }

    #[test]
    fn test_fake_registry_covers_builtins() {
        let registry = fake_registry();
        for name in names::PROCESSORS {
            assert!(registry.processor(name).is_ok());
        }
        assert!(registry.linter(names::ESLINT).is_some());
        assert!(registry.generator(names::FAVICONS).is_some());
    }
}
