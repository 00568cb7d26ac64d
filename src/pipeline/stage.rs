//! Pipeline stages and their execution.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::dependency::AssetType;
use crate::core::error::AssetError;
use crate::core::options::FailurePolicy;
use crate::pipeline::asset::AssetFile;
use crate::pipeline::sourcemap::{mapping_url_comment, SourceMap};
use crate::tools::command::ToolUnavailable;
use crate::tools::registry::ToolRegistry;
use crate::tools::spec::ToolVars;
use crate::util::fs::to_slash;
use crate::util::hash::content_hash;

/// Which files a tool stage applies to. Other files pass through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileFilter {
    /// Every file
    All,
    /// Files with this extension
    Extension(String),
    /// Exactly this file
    Exact(PathBuf),
}

impl FileFilter {
    pub fn matches(&self, file: &AssetFile) -> bool {
        match self {
            FileFilter::All => true,
            FileFilter::Extension(ext) => file
                .extension()
                .map(|e| e.eq_ignore_ascii_case(ext))
                .unwrap_or(false),
            FileFilter::Exact(path) => file.path == *path,
        }
    }
}

/// Role of a tool stage within the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolRole {
    Compile,
    Postprocess,
    Minify,
}

impl fmt::Display for ToolRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ToolRole::Compile => "compile",
            ToolRole::Postprocess => "postprocess",
            ToolRole::Minify => "minify",
        })
    }
}

/// One transform step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// Start tracking line maps
    SourceMapInit,

    /// Run a processor over matching files
    Tool {
        role: ToolRole,
        tool: String,
        filter: FileFilter,
    },

    /// Join every file into one
    Concat { file_name: String },

    /// Fingerprint file names with a content hash
    Rev,

    /// Emit `.map` files and link them from the artifacts
    SourceMapWrite { source_root: String },
}

impl Stage {
    /// Stage name, as reported in errors.
    pub fn name(&self) -> String {
        match self {
            Stage::SourceMapInit => "sourcemaps-init".to_string(),
            Stage::Tool { role, .. } => role.to_string(),
            Stage::Concat { .. } => "concat".to_string(),
            Stage::Rev => "rev".to_string(),
            Stage::SourceMapWrite { .. } => "sourcemaps-write".to_string(),
        }
    }
}

/// What stages need at run time.
#[derive(Debug, Clone, Copy)]
pub struct StageEnv<'a> {
    /// Tool lookup
    pub tools: &'a ToolRegistry,

    /// Placeholder values for tool arguments
    pub vars: &'a ToolVars,

    /// Directory bundle paths are relative to (e.g. `<source>styles`)
    pub namespace: &'a Path,
}

/// Ordered stages for one bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    /// Bundle type
    pub asset_type: AssetType,

    /// Output file name
    pub name: String,

    /// Stages, in execution order
    pub stages: Vec<Stage>,

    /// Error mode
    pub policy: FailurePolicy,
}

/// Files produced by a pipeline run.
#[derive(Debug, Default)]
pub struct PipelineOutput {
    /// Artifacts (bundle and maps)
    pub files: Vec<AssetFile>,

    /// Tolerated failures of individual source files
    pub dropped: Vec<AssetError>,
}

impl Pipeline {
    /// Names of the stages, in order.
    pub fn stage_names(&self) -> Vec<String> {
        self.stages.iter().map(Stage::name).collect()
    }

    /// Run every stage over `files`.
    ///
    /// Before concatenation a tolerated failure drops the failing file;
    /// from concatenation on, any failure fails the whole bundle.
    pub fn run(
        &self,
        mut files: Vec<AssetFile>,
        env: &StageEnv<'_>,
    ) -> Result<PipelineOutput, AssetError> {
        let mut dropped = Vec::new();
        let mut concatenated = false;

        for stage in &self.stages {
            tracing::debug!("{}: {} ({} files)", self.name, stage.name(), files.len());

            if let Stage::Concat { file_name } = stage {
                files = concat(files, file_name, env.namespace).into_iter().collect();
                concatenated = true;
                continue;
            }

            let mut next = Vec::with_capacity(files.len());
            for file in files {
                match self.apply(stage, file, env) {
                    Ok(out) => next.extend(out),
                    Err(err) if !concatenated && !self.policy.is_fatal(&err) => {
                        tracing::error!("{}", err);
                        dropped.push(err);
                    }
                    Err(err) => return Err(err),
                }
            }
            files = next;
        }

        Ok(PipelineOutput { files, dropped })
    }

    fn apply(
        &self,
        stage: &Stage,
        mut file: AssetFile,
        env: &StageEnv<'_>,
    ) -> Result<Vec<AssetFile>, AssetError> {
        match stage {
            Stage::SourceMapInit => {
                let source = to_slash(&crate::util::fs::relative_path(env.namespace, &file.path));
                file.source_map = Some(SourceMap::identity(source, &file.text()));
                Ok(vec![file])
            }

            Stage::Tool { role, tool, filter } => {
                if !filter.matches(&file) {
                    return Ok(vec![file]);
                }
                let processor = env.tools.processor(tool)?;
                let output = processor
                    .process(&file.path, &file.contents, env.vars)
                    .map_err(|err| classify_tool_error(&role.to_string(), tool, &file.path, err))?;
                file.set_contents(output);

                if *role == ToolRole::Compile {
                    let ext = self.asset_type.extension();
                    if file.extension().as_deref() != Some(ext) {
                        let renamed = file.path.with_extension(ext);
                        file.rename(&renamed);
                    }
                }
                Ok(vec![file])
            }

            // Handled in `run`.
            Stage::Concat { .. } => Ok(vec![file]),

            Stage::Rev => {
                let original = file.relative_slash();
                let hash = content_hash(&file.contents);
                let stem = file
                    .path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let name = match file.extension() {
                    Some(ext) => format!("{}-{}.{}", stem, hash, ext),
                    None => format!("{}-{}", stem, hash),
                };
                let renamed = file.path.with_file_name(name);
                file.rename(&renamed);
                file.revision_of = Some(original);
                Ok(vec![file])
            }

            Stage::SourceMapWrite { source_root } => {
                let Some(map) = file.source_map.take() else {
                    return Ok(vec![file]);
                };
                let file_name = file.file_name();
                let map_name = format!("{}.map", file_name);
                let ext = file.extension().unwrap_or_default();

                let json = map.to_json(&file_name, source_root).map_err(|e| {
                    AssetError::pipeline(stage.name(), None, &file.path, e.to_string())
                })?;

                file.contents
                    .extend_from_slice(mapping_url_comment(&ext, &map_name).as_bytes());

                let mut map_file = AssetFile::new(
                    file.path.with_file_name(&map_name),
                    file.base.clone(),
                    json.into_bytes(),
                );
                map_file.revision_of = None;
                Ok(vec![file, map_file])
            }
        }
    }
}

/// Join files with `\n` into `<namespace>/<file_name>`.
fn concat(files: Vec<AssetFile>, file_name: &str, namespace: &Path) -> Option<AssetFile> {
    if files.is_empty() {
        return None;
    }

    let with_maps = files.iter().all(|f| f.source_map.is_some());
    let map = with_maps.then(|| {
        SourceMap::concat(
            files
                .iter()
                .map(|f| (f.source_map.as_ref(), f.line_count())),
        )
    });

    let mut contents = Vec::new();
    for (i, file) in files.iter().enumerate() {
        if i > 0 {
            contents.push(b'\n');
        }
        contents.extend_from_slice(&file.contents);
    }

    let mut out = AssetFile::new(namespace.join(file_name), namespace, contents);
    out.source_map = map;
    Some(out)
}

/// Map a tool failure to a `Tool` error when the executable is missing,
/// a `Pipeline` error otherwise.
pub(crate) fn classify_tool_error(stage: &str, tool: &str, file: &Path, err: anyhow::Error) -> AssetError {
    match err.downcast_ref::<ToolUnavailable>() {
        Some(unavailable) => AssetError::Tool {
            tool: tool.to_string(),
            message: unavailable.to_string(),
        },
        None => AssetError::pipeline(stage, Some(tool), file, format!("{:#}", err)),
    }
}
