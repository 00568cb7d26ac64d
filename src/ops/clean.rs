//! `clean`: remove the output root.

use crate::core::error::AssetError;
use crate::ops::context::TaskContext;
use crate::util::fs::remove_dir_all_if_exists;

/// Delete `<dist>` entirely. Returns whether anything was removed.
pub fn clean(ctx: &TaskContext) -> Result<bool, AssetError> {
    let dist = ctx.manifest.dist_dir();
    if !dist.exists() {
        tracing::debug!("{} does not exist", dist.display());
        return Ok(false);
    }
    let canonical = dist
        .canonicalize()
        .map_err(|e| AssetError::io(&dist, e))?;
    let protected = [ctx.manifest.root().to_path_buf(), ctx.manifest.source_dir()];
    if protected
        .iter()
        .filter_map(|p| p.canonicalize().ok())
        .any(|p| p.starts_with(&canonical))
    {
        return Err(AssetError::config_at(
            ctx.manifest.path(),
            format!("refusing to delete {}: it contains the sources", dist.display()),
        ));
    }

    remove_dir_all_if_exists(&dist).map_err(|e| AssetError::io_chain(&dist, e))?;
    tracing::info!("removed {}", dist.display());
    Ok(true)
}
