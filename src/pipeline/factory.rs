//! Construction of per-bundle pipelines.

use std::path::PathBuf;

use crate::core::dependency::AssetType;
use crate::core::manifest::{Manifest, DEFAULT_SOURCE};
use crate::core::options::BuildOptions;
use crate::pipeline::stage::{FileFilter, Pipeline, Stage, ToolRole};
use crate::tools::names;

/// Manifest-derived inputs to the factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// The only script that is transpiled
    pub transpile_entry: PathBuf,

    /// Source root as written in the manifest (e.g. `assets/`)
    pub source_prefix: String,
}

impl PipelineSettings {
    pub fn from_manifest(manifest: &Manifest) -> Self {
        PipelineSettings {
            transpile_entry: manifest.transpile_entry(),
            source_prefix: manifest.paths.source.clone(),
        }
    }

    /// `sourceRoot` written into maps of this type.
    pub fn source_root(&self, asset_type: AssetType) -> String {
        format!("{}{}/", self.source_prefix, asset_type.dir_name())
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        PipelineSettings {
            transpile_entry: PathBuf::from(format!("{}scripts/main.js", DEFAULT_SOURCE)),
            source_prefix: DEFAULT_SOURCE.to_string(),
        }
    }
}

/// Build a fresh pipeline for one bundle.
///
/// Stage order is fixed: compile, concat, post-process/minify, rev, maps.
pub fn build_pipeline(
    asset_type: AssetType,
    output_name: &str,
    options: &BuildOptions,
    settings: &PipelineSettings,
) -> Pipeline {
    let mut stages = Vec::new();

    if options.maps {
        stages.push(Stage::SourceMapInit);
    }

    match asset_type {
        AssetType::Styles => {
            stages.push(Stage::Tool {
                role: ToolRole::Compile,
                tool: names::SASS.to_string(),
                filter: FileFilter::Extension("scss".to_string()),
            });
            stages.push(Stage::Concat {
                file_name: output_name.to_string(),
            });
            stages.push(Stage::Tool {
                role: ToolRole::Postprocess,
                tool: names::AUTOPREFIXER.to_string(),
                filter: FileFilter::All,
            });
            stages.push(Stage::Tool {
                role: ToolRole::Minify,
                tool: names::CSSNANO.to_string(),
                filter: FileFilter::All,
            });
        }
        AssetType::Scripts => {
            stages.push(Stage::Tool {
                role: ToolRole::Compile,
                tool: names::BABEL.to_string(),
                filter: FileFilter::Exact(settings.transpile_entry.clone()),
            });
            stages.push(Stage::Concat {
                file_name: output_name.to_string(),
            });
            stages.push(Stage::Tool {
                role: ToolRole::Minify,
                tool: names::UGLIFY.to_string(),
                filter: FileFilter::All,
            });
        }
    }

    if options.rev {
        stages.push(Stage::Rev);
    }

    if options.maps {
        stages.push(Stage::SourceMapWrite {
            source_root: settings.source_root(asset_type),
        });
    }

    Pipeline {
        asset_type,
        name: output_name.to_string(),
        stages,
        policy: options.policy(),
    }
}
