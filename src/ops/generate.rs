//! `favicons` and `icons`: directory-producing generators.

use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};

use crate::core::error::AssetError;
use crate::ops::context::TaskContext;
use crate::pipeline::stage::classify_tool_error;
use crate::tools::names;
use crate::util::fs::{glob_files, list_files};

/// Sprite written by `icons`, relative to the output root.
pub const ICON_SPRITE: &str = "icons/icons-store.svg";

/// Turn the images under `<source>favicons/` into `<dist>icons/`.
///
/// Returns whether the generator ran.
pub fn favicons(ctx: &TaskContext) -> Result<bool, AssetError> {
    let input_dir = ctx.manifest.source_dir().join("favicons");
    let inputs = if input_dir.is_dir() {
        list_files(&input_dir).map_err(|e| AssetError::io_chain(&input_dir, e))?
    } else {
        Vec::new()
    };

    let options = favicon_options(ctx);
    let out_dir = ctx.manifest.dist_dir().join("icons");
    let ran = generate(ctx, names::FAVICONS, &inputs, &input_dir, &out_dir, &options)?;
    if ran {
        ctx.publish("favicons", &out_dir);
    }
    Ok(ran)
}

/// Combine `<source>icons/**/*.svg` into one symbol sprite.
pub fn icons(ctx: &TaskContext) -> Result<bool, AssetError> {
    let root = ctx.manifest.root();
    let pattern = format!("{}icons/**/*.svg", ctx.manifest.paths.source);
    let inputs = glob_files(root, &[pattern]).map_err(|e| AssetError::io_chain(root, e))?;

    let input_dir = ctx.manifest.source_dir().join("icons");
    let out_dir = ctx.manifest.dist_dir();
    let ran = generate(ctx, names::SVG_SPRITE, &inputs, &input_dir, &out_dir, "{}")?;
    if ran {
        ctx.publish("icons", &out_dir.join(ICON_SPRITE));
    }
    Ok(ran)
}

/// Options handed to the favicon generator as JSON.
///
/// `config.favicons` from the manifest, plus the mode-dependent `online`
/// switch and the HTML snippet location.
pub fn favicon_options(ctx: &TaskContext) -> String {
    let mut options = match ctx.manifest.config.get("favicons") {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };
    options.insert("online".into(), json!(ctx.options.real_favicon_api));
    options.insert(
        "html".into(),
        json!(format!(
            "{}../templates/includes/favicons.html",
            ctx.manifest.paths.source
        )),
    );
    options.entry("replace").or_insert(json!(true));
    Value::Object(options).to_string()
}

fn generate(
    ctx: &TaskContext,
    tool: &str,
    inputs: &[PathBuf],
    input_dir: &Path,
    out_dir: &Path,
    options: &str,
) -> Result<bool, AssetError> {
    let Some(generator) = ctx.tools.generator(tool) else {
        tracing::warn!("`{}` is disabled, skipping", tool);
        return Ok(false);
    };
    if inputs.is_empty() {
        tracing::warn!("no input for `{}` under {}", tool, input_dir.display());
        return Ok(false);
    }

    let vars = ctx
        .vars()
        .with("input_dir", input_dir.to_string_lossy())
        .with("options", options);

    match generator.generate(inputs, out_dir, &vars) {
        Ok(()) => {
            tracing::info!("{}: generated from {} file(s)", tool, inputs.len());
            Ok(true)
        }
        Err(err) => {
            let err = classify_tool_error("generate", tool, input_dir, err);
            if ctx.policy().is_fatal(&err) {
                return Err(err);
            }
            tracing::error!("{}", err);
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::bail;

    use super::*;
    use crate::core::options::BuildOptions;
    use crate::test_support::assertions::{assert_file, assert_file_contains, assert_missing};
    use crate::test_support::{fake_registry, ProjectFixture};
    use crate::tools::{Generator, ToolRegistry, ToolVars};

    struct Broken;

    impl Generator for Broken {
        fn name(&self) -> &str {
            "favicons"
        }

        fn generate(&self, _: &[PathBuf], _: &Path, _: &ToolVars) -> anyhow::Result<()> {
            bail!("exit status 1")
        }
    }

    fn fixture() -> ProjectFixture {
        ProjectFixture::new()
            .with_manifest(r#"{ "config": { "favicons": { "appName": "Site" } } }"#)
            .with_file("assets/favicons/favicon.png", "png")
            .with_file("assets/icons/arrow.svg", "<svg/>")
            .with_file("assets/icons/ui/close.svg", "<svg/>")
            .with_file("assets/icons/readme.txt", "not an icon")
    }

    #[test]
    fn test_favicons_written_to_icons_dir() {
        let fixture = fixture();
        let tmp = fixture.write();
        let ctx = TaskContext::new(
            fixture.load_manifest(tmp.path()),
            BuildOptions::production(),
            fake_registry(),
        );

        assert!(favicons(&ctx).unwrap());
        let listing = assert_file(tmp.path().join("dist/icons/favicon.ico"));
        assert!(listing.contains("favicon.png"));
        assert!(listing.contains("\"appName\":\"Site\""));
        assert!(listing.contains("\"online\":true"));
        assert!(listing.contains("templates/includes/favicons.html"));
    }

    #[test]
    fn test_favicon_options_follow_mode() {
        let fixture = fixture();
        let tmp = fixture.write();
        let ctx = TaskContext::new(
            fixture.load_manifest(tmp.path()),
            BuildOptions::development(),
            fake_registry(),
        );

        let options: Value = serde_json::from_str(&favicon_options(&ctx)).unwrap();
        assert_eq!(options["online"], json!(false));
        assert_eq!(options["html"], json!("assets/../templates/includes/favicons.html"));
        assert_eq!(options["appName"], json!("Site"));
    }

    #[test]
    fn test_icons_sprite() {
        let fixture = fixture();
        let tmp = fixture.write();
        let ctx = TaskContext::new(
            fixture.load_manifest(tmp.path()),
            BuildOptions::development(),
            fake_registry(),
        );

        assert!(icons(&ctx).unwrap());
        let sprite = tmp.path().join("dist").join(ICON_SPRITE);
        assert_file_contains(&sprite, "arrow.svg");
        assert_file_contains(&sprite, "close.svg");
        assert!(!assert_file(&sprite).contains("readme.txt"));
    }

    #[test]
    fn test_disabled_generator_skips() {
        let fixture = fixture();
        let tmp = fixture.write();
        let ctx = TaskContext::new(
            fixture.load_manifest(tmp.path()),
            BuildOptions::production(),
            ToolRegistry::new(),
        );

        assert!(!favicons(&ctx).unwrap());
        assert_missing(tmp.path().join("dist"));
    }

    #[test]
    fn test_generator_failure_follows_policy() {
        let fixture = fixture();
        let tmp = fixture.write();

        let mut tools = ToolRegistry::new();
        tools.register_generator(names::FAVICONS, Arc::new(Broken));
        let ctx = TaskContext::new(fixture.load_manifest(tmp.path()), BuildOptions::development(), tools);
        assert!(!favicons(&ctx).unwrap());

        let mut tools = ToolRegistry::new();
        tools.register_generator(names::FAVICONS, Arc::new(Broken));
        let ctx = TaskContext::new(fixture.load_manifest(tmp.path()), BuildOptions::production(), tools);
        assert!(matches!(favicons(&ctx).unwrap_err(), AssetError::Pipeline { .. }));
    }
}
