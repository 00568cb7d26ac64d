//! `fonts`, `images` and `videos`: per-file copies into the output tree.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::core::error::AssetError;
use crate::ops::context::TaskContext;
use crate::pipeline::stage::classify_tool_error;
use crate::tools::{names, Processor};
use crate::util::fs::{glob_base, glob_files, read_bytes, relative_path, write_atomic};

/// How source paths map into the output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// Keep only the file name
    Flatten,
    /// Keep the path below the pattern's base directory
    Relative,
}

#[derive(Debug)]
struct CopyJob {
    src: PathBuf,
    dest: PathBuf,
}

/// Copy every font into `<dist>fonts/`, flattened.
pub fn fonts(ctx: &TaskContext) -> Result<usize, AssetError> {
    let out_dir = ctx.manifest.dist_dir().join("fonts");
    let copies = plan_copies(
        ctx.manifest.root(),
        &ctx.manifest.globs.fonts,
        &out_dir,
        Layout::Flatten,
    )?;
    copy_all(ctx, "fonts", copies, None)
}

/// Optimize every image into `<dist>images/`.
pub fn images(ctx: &TaskContext) -> Result<usize, AssetError> {
    let out_dir = ctx.manifest.dist_dir().join("images");
    let copies = plan_copies(
        ctx.manifest.root(),
        &ctx.manifest.globs.images,
        &out_dir,
        Layout::Relative,
    )?;
    let imagemin = ctx.tools.processor(names::IMAGEMIN)?;
    copy_all(ctx, "images", copies, Some(imagemin.as_ref()))
}

/// Copy `<source>videos/` into `<dist>videos/`.
pub fn videos(ctx: &TaskContext) -> Result<usize, AssetError> {
    let out_dir = ctx.manifest.dist_dir().join("videos");
    let pattern = format!("{}videos/**/*", ctx.manifest.paths.source);
    let copies = plan_copies(ctx.manifest.root(), &[pattern], &out_dir, Layout::Relative)?;
    copy_all(ctx, "videos", copies, None)
}

/// Pair every matched file with its destination.
///
/// A file matched by several patterns, or a destination claimed twice, is
/// copied once: the first match wins.
fn plan_copies(
    root: &Path,
    patterns: &[String],
    out_dir: &Path,
    layout: Layout,
) -> Result<Vec<CopyJob>, AssetError> {
    let excludes: Vec<String> = patterns
        .iter()
        .filter(|p| p.starts_with('!'))
        .cloned()
        .collect();

    let mut seen_src = HashSet::new();
    let mut seen_dest = HashSet::new();
    let mut copies = Vec::new();

    for pattern in patterns.iter().filter(|p| !p.starts_with('!')) {
        let mut query = vec![pattern.clone()];
        query.extend(excludes.iter().cloned());
        let files = glob_files(root, &query).map_err(|e| AssetError::io_chain(root, e))?;
        if files.is_empty() {
            tracing::debug!("`{}` matched no files", pattern);
        }

        let base = root.join(glob_base(pattern));
        for src in files {
            let rel = match layout {
                Layout::Flatten => match src.file_name() {
                    Some(name) => PathBuf::from(name),
                    None => continue,
                },
                Layout::Relative => relative_path(&base, &src),
            };
            let dest = out_dir.join(rel);

            if !seen_src.insert(src.clone()) {
                continue;
            }
            if !seen_dest.insert(dest.clone()) {
                tracing::warn!(
                    "skipping {}: {} is already written by another file",
                    src.display(),
                    dest.display()
                );
                continue;
            }
            copies.push(CopyJob { src, dest });
        }
    }

    Ok(copies)
}

/// Read, optionally process, then write every copy.
///
/// Every file is processed before anything is written, so a fatal failure
/// leaves the output tree untouched.
fn copy_all(
    ctx: &TaskContext,
    class: &str,
    copies: Vec<CopyJob>,
    processor: Option<&dyn Processor>,
) -> Result<usize, AssetError> {
    let policy = ctx.policy();
    let vars = ctx.vars();

    let processed: Vec<Result<Option<(PathBuf, Vec<u8>)>, AssetError>> = copies
        .into_par_iter()
        .map(|copy| {
            let contents =
                read_bytes(&copy.src).map_err(|e| AssetError::io_chain(&copy.src, e))?;

            let Some(tool) = processor else {
                return Ok(Some((copy.dest, contents)));
            };
            let file_vars = vars.clone().with("file", copy.src.to_string_lossy());
            match tool.process(&copy.src, &contents, &file_vars) {
                Ok(out) => Ok(Some((copy.dest, out))),
                Err(err) => {
                    let err = classify_tool_error("optimize", tool.name(), &copy.src, err);
                    if policy.is_fatal(&err) {
                        return Err(err);
                    }
                    tracing::error!("{}", err);
                    Ok(None)
                }
            }
        })
        .collect();

    let mut outputs = Vec::new();
    for result in processed {
        if let Some(output) = result? {
            outputs.push(output);
        }
    }

    outputs
        .par_iter()
        .try_for_each(|(dest, contents)| -> Result<(), AssetError> {
            write_atomic(dest, contents).map_err(|e| AssetError::io_chain(dest, e))?;
            ctx.publish(class, dest);
            Ok(())
        })?;

    tracing::info!("{}: copied {} file(s)", class, outputs.len());
    Ok(outputs.len())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::options::BuildOptions;
    use crate::test_support::assertions::{assert_file, assert_missing};
    use crate::test_support::{fake_registry, FakeBehavior, FakeProcessor, ProjectFixture};

    fn context(fixture: &ProjectFixture, root: &Path, options: BuildOptions) -> TaskContext {
        TaskContext::new(fixture.load_manifest(root), options, fake_registry())
    }

    #[test]
    fn test_fonts_are_flattened() {
        let fixture = ProjectFixture::new()
            .with_manifest(
                r#"{ "bower": [ { "name": "icons", "files": ["bower_components/icons/fonts/glyphs.ttf"] } ] }"#,
            )
            .with_file("assets/fonts/deep/nested/body.woff2", "woff2")
            .with_file("bower_components/icons/fonts/glyphs.ttf", "ttf");
        let tmp = fixture.write();
        let ctx = context(&fixture, tmp.path(), BuildOptions::development());

        assert_eq!(fonts(&ctx).unwrap(), 2);
        assert_file(tmp.path().join("dist/fonts/body.woff2"));
        assert_file(tmp.path().join("dist/fonts/glyphs.ttf"));
    }

    #[test]
    fn test_images_keep_structure() {
        let fixture = ProjectFixture::standard();
        let tmp = fixture.write();
        let ctx = context(&fixture, tmp.path(), BuildOptions::development());

        assert_eq!(images(&ctx).unwrap(), 2);
        assert_file(tmp.path().join("dist/images/logo.png"));
        assert_file(tmp.path().join("dist/images/sub/bg.png"));
    }

    fn failing_imagemin() -> crate::tools::ToolRegistry {
        let mut tools = fake_registry();
        tools.register_processor(
            names::IMAGEMIN,
            Arc::new(FakeProcessor::new(names::IMAGEMIN, FakeBehavior::FailOn("CORRUPT".into()))),
        );
        tools
    }

    #[test]
    fn test_image_failure_tolerated_in_development() {
        let fixture = ProjectFixture::standard().with_file("assets/images/broken.png", "CORRUPT");
        let tmp = fixture.write();
        let ctx = TaskContext::new(
            fixture.load_manifest(tmp.path()),
            BuildOptions::development(),
            failing_imagemin(),
        );

        assert_eq!(images(&ctx).unwrap(), 2);
        assert_file(tmp.path().join("dist/images/logo.png"));
        assert_missing(tmp.path().join("dist/images/broken.png"));
    }

    #[test]
    fn test_image_failure_in_production_writes_nothing() {
        let fixture = ProjectFixture::standard().with_file("assets/images/zz_broken.png", "CORRUPT");
        let tmp = fixture.write();
        let ctx = TaskContext::new(
            fixture.load_manifest(tmp.path()),
            BuildOptions::production(),
            failing_imagemin(),
        );
        let events = ctx.reload.subscribe();

        let err = images(&ctx).unwrap_err();
        assert!(matches!(err, AssetError::Pipeline { .. }));
        assert_missing(tmp.path().join("dist/images/logo.png"));
        assert_missing(tmp.path().join("dist/images/sub/bg.png"));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_videos_copied() {
        let fixture = ProjectFixture::standard();
        let tmp = fixture.write();
        let ctx = context(&fixture, tmp.path(), BuildOptions::development());
        let events = ctx.reload.subscribe();

        assert_eq!(videos(&ctx).unwrap(), 1);
        assert_eq!(assert_file(tmp.path().join("dist/videos/intro.mp4")), "mp4");
        assert_eq!(events.try_recv().unwrap().class, "videos");
    }

    #[test]
    fn test_missing_directories_copy_nothing() {
        let fixture = ProjectFixture::new();
        let tmp = fixture.write();
        let ctx = context(&fixture, tmp.path(), BuildOptions::development());

        assert_eq!(videos(&ctx).unwrap(), 0);
        assert_eq!(fonts(&ctx).unwrap(), 0);
        assert_missing(tmp.path().join("dist"));
    }
}
