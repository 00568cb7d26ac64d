//! `styles` and `scripts`: run every bundle of one type.

use crate::core::dependency::AssetType;
use crate::core::error::AssetError;
use crate::ops::context::TaskContext;
use crate::pipeline::{build_pipeline, CombinedOutput};

/// Compile, concatenate and minify every style bundle into `<dist>styles/`.
pub fn styles(ctx: &TaskContext) -> Result<CombinedOutput, AssetError> {
    run(ctx, AssetType::Styles)
}

/// Transpile, concatenate and minify every script bundle into `<dist>scripts/`.
pub fn scripts(ctx: &TaskContext) -> Result<CombinedOutput, AssetError> {
    run(ctx, AssetType::Scripts)
}

fn run(ctx: &TaskContext, asset_type: AssetType) -> Result<CombinedOutput, AssetError> {
    let settings = ctx.pipeline_settings();
    let options = ctx.options;

    let output = ctx
        .bundle_runner()
        .run_bundles(asset_type, asset_type.dir_name(), |t, name| {
            build_pipeline(t, name, &options, &settings)
        })?;

    if output.failures.is_empty() {
        tracing::info!("{}: wrote {} file(s)", asset_type, output.files.len());
    } else {
        tracing::warn!(
            "{}: wrote {} file(s), {} failure(s) tolerated",
            asset_type,
            output.files.len(),
            output.failures.len()
        );
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::BuildOptions;
    use crate::test_support::assertions::{assert_file, assert_file_contains, assert_missing};
    use crate::test_support::{fake_registry, ProjectFixture};

    fn context(fixture: &ProjectFixture, root: &std::path::Path, options: BuildOptions) -> TaskContext {
        TaskContext::new(fixture.load_manifest(root), options, fake_registry())
    }

    #[test]
    fn test_styles_include_vendor_files_first() {
        let fixture = ProjectFixture::standard();
        let tmp = fixture.write();
        let ctx = context(&fixture, tmp.path(), BuildOptions::development());

        styles(&ctx).unwrap();

        let css = assert_file(tmp.path().join("dist/styles/main.css"));
        let vendor = css.find("html { }").unwrap();
        let project = css.find("body { margin: 0; }").unwrap();
        assert!(vendor < project);
        assert_file_contains(tmp.path().join("dist/styles/main.css"), "sourceMappingURL=main.css.map");
        assert_file(tmp.path().join("dist/styles/main.css.map"));
    }

    #[test]
    fn test_scripts_production_is_hashed() {
        let fixture = ProjectFixture::standard();
        let tmp = fixture.write();
        let ctx = context(&fixture, tmp.path(), BuildOptions::production());

        scripts(&ctx).unwrap();

        assert_missing(tmp.path().join("dist/scripts/main.js"));
        assert_missing(tmp.path().join("dist/scripts/main.js.map"));
        let entries = ctx.ledger.entries().unwrap();
        let hashed = &entries["scripts/main.js"];
        assert_file_contains(tmp.path().join("dist").join(hashed), "console.log('main');");
    }

    #[test]
    fn test_revision_merge_keeps_both_types() {
        let fixture = ProjectFixture::standard();
        let tmp = fixture.write();
        let ctx = context(&fixture, tmp.path(), BuildOptions::production());

        styles(&ctx).unwrap();
        scripts(&ctx).unwrap();

        let entries = ctx.ledger.entries().unwrap();
        assert!(entries.contains_key("styles/main.css"));
        assert!(entries.contains_key("scripts/main.js"));
    }

    #[test]
    fn test_project_root_with_brackets() {
        let fixture = ProjectFixture::standard();
        let tmp = tempfile::TempDir::new().unwrap();
        let root = tmp.path().join("site [v2]");
        fixture.write_to(&root).unwrap();
        let ctx = context(&fixture, &root, BuildOptions::development());

        let output = styles(&ctx).unwrap();

        assert!(!output.files.is_empty());
        assert_file_contains(root.join("dist/styles/main.css"), "body { margin: 0; }");
    }
}
