//! `wiredep`: inject vendor style imports into project style sources.
//!
//! A style file opts in with a marker block:
//!
//! ```scss
//! // bower:scss
//! // endbower
//! ```
//!
//! The block is regenerated with one `@import` per vendor entry file whose
//! extension matches the block name (`scss` or `css`).

use std::path::{Path, PathBuf};

use regex::{Captures, Regex};

use crate::core::error::AssetError;
use crate::ops::context::TaskContext;
use crate::util::fs::{glob_files, read_to_string, relative_path, to_slash, write_atomic};
use crate::util::hash::sha256_str;

const BLOCK_PATTERN: &str = r"(?m)^([ \t]*)// bower:([A-Za-z0-9]+)[^\n]*\n(?s:.*?)^[ \t]*// endbower";

/// Rewrite the injection blocks of every project style file.
///
/// Returns the number of files whose content changed; unchanged files are
/// not touched.
pub fn wiredep(ctx: &TaskContext) -> Result<usize, AssetError> {
    let root = ctx.manifest.root();
    let files = glob_files(root, &ctx.manifest.globs.styles)
        .map_err(|e| AssetError::io_chain(root, e))?;
    let vendor: Vec<PathBuf> = ctx
        .manifest
        .vendor
        .iter()
        .flat_map(|lib| lib.files.iter())
        .map(|f| root.join(f))
        .collect();
    let re = Regex::new(BLOCK_PATTERN).map_err(|e| AssetError::config(e.to_string()))?;

    let mut rewritten = 0;
    for file in files {
        let original = read_to_string(&file).map_err(|e| AssetError::io_chain(&file, e))?;
        let dir = file.parent().unwrap_or(root);
        let updated = inject_blocks(&re, &original, dir, &vendor);

        if sha256_str(&updated) == sha256_str(&original) {
            tracing::debug!("wiredep: {} is up to date", file.display());
            continue;
        }
        write_atomic(&file, updated.as_bytes()).map_err(|e| AssetError::io_chain(&file, e))?;
        tracing::info!("wiredep: updated {}", file.display());
        rewritten += 1;
    }
    Ok(rewritten)
}

fn inject_blocks(re: &Regex, contents: &str, dir: &Path, vendor: &[PathBuf]) -> String {
    re.replace_all(contents, |caps: &Captures| {
        let indent = &caps[1];
        let ext = &caps[2];

        let mut block = format!("{}// bower:{}\n", indent, ext);
        for file in vendor.iter().filter(|f| has_extension(f, ext)) {
            block.push_str(&format!(
                "{}@import \"{}\";\n",
                indent,
                to_slash(&relative_path(dir, file))
            ));
        }
        block.push_str(indent);
        block.push_str("// endbower");
        block
    })
    .into_owned()
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}
