//! `jslint` and `sasslint`.

use std::path::PathBuf;

use crate::core::error::AssetError;
use crate::ops::context::TaskContext;
use crate::pipeline::stage::classify_tool_error;
use crate::tools::names;
use crate::util::fs::glob_files;

/// Lint the project scripts of every script bundle.
pub fn jslint(ctx: &TaskContext) -> Result<(), AssetError> {
    lint(ctx, names::ESLINT, &ctx.manifest.globs.scripts)
}

/// Lint the Sass sources one directory below `styles/`. Entry files
/// directly in `styles/` are checked by the compiler instead.
pub fn sasslint(ctx: &TaskContext) -> Result<(), AssetError> {
    let pattern = format!("{}styles/*/*.scss", ctx.manifest.paths.source);
    lint(ctx, names::SASS_LINT, &[pattern])
}

/// Run one linter. A report with errors becomes a `Lint` error, which the
/// caller's failure policy may tolerate.
fn lint(ctx: &TaskContext, tool: &str, patterns: &[String]) -> Result<(), AssetError> {
    let Some(linter) = ctx.tools.linter(tool) else {
        tracing::warn!("`{}` is disabled, skipping", tool);
        return Ok(());
    };

    let root = ctx.manifest.root();
    let files: Vec<PathBuf> =
        glob_files(root, patterns).map_err(|e| AssetError::io_chain(root, e))?;
    if files.is_empty() {
        tracing::debug!("{}: nothing to lint", tool);
        return Ok(());
    }

    let outcome = linter
        .lint(&files, &ctx.vars())
        .map_err(|err| classify_tool_error("lint", tool, root, err))?;

    if outcome.passed {
        tracing::info!("{}: {} file(s) clean", tool, files.len());
        return Ok(());
    }

    let report = outcome.report.trim_end().to_string();
    if !report.is_empty() {
        eprintln!("{}", report);
    }
    Err(AssetError::Lint {
        tool: tool.to_string(),
        report,
    })
}
