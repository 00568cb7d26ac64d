//! External tools.
//!
//! Compilers, prefixers, minifiers and linters are not implemented here.
//! They sit behind three small traits so pipelines and tasks can drive
//! them without knowing whether they are real commands or test fakes.

pub mod command;
pub mod registry;
pub mod spec;

use std::path::{Path, PathBuf};

use anyhow::Result;

pub use command::{CommandTool, Passthrough, ToolUnavailable};
pub use registry::ToolRegistry;
pub use spec::{ResolvedTool, ToolSpec, ToolVars};

/// Names of the built-in tools.
pub mod names {
    pub const SASS: &str = "sass";
    pub const AUTOPREFIXER: &str = "autoprefixer";
    pub const CSSNANO: &str = "cssnano";
    pub const BABEL: &str = "babel";
    pub const UGLIFY: &str = "uglify";
    pub const IMAGEMIN: &str = "imagemin";
    pub const FAVICONS: &str = "favicons";
    pub const SVG_SPRITE: &str = "svg-sprite";
    pub const ESLINT: &str = "eslint";
    pub const SASS_LINT: &str = "sass-lint";

    /// Tools that transform one file.
    pub const PROCESSORS: &[&str] = &[SASS, AUTOPREFIXER, CSSNANO, BABEL, UGLIFY, IMAGEMIN];

    /// Tools that check a set of files.
    pub const LINTERS: &[&str] = &[ESLINT, SASS_LINT];

    /// Tools that write a directory of outputs.
    pub const GENERATORS: &[&str] = &[FAVICONS, SVG_SPRITE];

    /// Every built-in tool.
    pub const ALL: &[&str] = &[
        SASS,
        AUTOPREFIXER,
        CSSNANO,
        BABEL,
        UGLIFY,
        IMAGEMIN,
        FAVICONS,
        SVG_SPRITE,
        ESLINT,
        SASS_LINT,
    ];
}

/// Transforms the contents of one file.
pub trait Processor: Send + Sync {
    /// Tool name, used in errors.
    fn name(&self) -> &str;

    /// Transform `contents`, read from `path`.
    fn process(&self, path: &Path, contents: &[u8], vars: &ToolVars) -> Result<Vec<u8>>;
}

/// Result of a lint run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintOutcome {
    /// No errors were reported
    pub passed: bool,

    /// Linter output
    pub report: String,
}

/// Checks a set of files.
pub trait Linter: Send + Sync {
    fn name(&self) -> &str;

    fn lint(&self, files: &[PathBuf], vars: &ToolVars) -> Result<LintOutcome>;
}

/// Produces a directory of outputs from a set of inputs.
pub trait Generator: Send + Sync {
    fn name(&self) -> &str;

    fn generate(&self, inputs: &[PathBuf], output_dir: &Path, vars: &ToolVars) -> Result<()>;
}
