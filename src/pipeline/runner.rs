//! Runs every bundle of an asset type and writes the combined output.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::core::dependency::{AssetType, Dependency};
use crate::core::error::AssetError;
use crate::core::manifest::Manifest;
use crate::core::options::BuildOptions;
use crate::pipeline::asset::AssetFile;
use crate::pipeline::ledger::RevisionLedger;
use crate::pipeline::reload::ReloadHub;
use crate::pipeline::stage::{Pipeline, PipelineOutput, StageEnv};
use crate::tools::{ToolRegistry, ToolVars};
use crate::util::fs::{glob_files, read_bytes, write_atomic};

/// Outputs of every bundle of one asset type.
#[derive(Debug, Default)]
pub struct CombinedOutput {
    /// Artifacts, relative to their namespace
    pub files: Vec<AssetFile>,

    /// Tolerated failures (dropped files and bundles)
    pub failures: Vec<AssetError>,
}

impl CombinedOutput {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Runs bundles through freshly built pipelines.
#[derive(Debug, Clone, Copy)]
pub struct BundleRunner<'a> {
    pub manifest: &'a Manifest,
    pub options: &'a BuildOptions,
    pub tools: &'a ToolRegistry,
    pub ledger: &'a RevisionLedger,
    pub reload: &'a ReloadHub,
}

impl<'a> BundleRunner<'a> {
    /// Run every bundle of `asset_type` and write the results under
    /// `<dist><output_dir_name>/`.
    ///
    /// With a fail-fast policy nothing is written unless every bundle
    /// succeeded.
    pub fn run_bundles<F>(
        &self,
        asset_type: AssetType,
        output_dir_name: &str,
        factory: F,
    ) -> Result<CombinedOutput, AssetError>
    where
        F: Fn(AssetType, &str) -> Pipeline + Sync,
    {
        let combined = self.compute(asset_type, factory)?;
        self.write(asset_type, output_dir_name, &combined)?;
        Ok(combined)
    }

    /// Run the pipelines without touching the output tree.
    pub fn compute<F>(&self, asset_type: AssetType, factory: F) -> Result<CombinedOutput, AssetError>
    where
        F: Fn(AssetType, &str) -> Pipeline + Sync,
    {
        let dependencies: Vec<&Dependency> = self.manifest.dependencies_of(asset_type).collect();
        if dependencies.is_empty() {
            tracing::debug!("no {} bundles declared", asset_type);
            return Ok(CombinedOutput::default());
        }

        let namespace = self.manifest.source_dir().join(asset_type.dir_name());
        let vars = ToolVars::new(self.options);

        let results: Vec<(&Dependency, Result<PipelineOutput, AssetError>)> = dependencies
            .par_iter()
            .map(|dep| {
                let result = self.run_one(dep, &namespace, &vars, &factory);
                (*dep, result)
            })
            .collect();

        let policy = self.options.policy();
        let mut combined = CombinedOutput::default();
        let mut fatal = None;

        for (dep, result) in results {
            match result {
                Ok(output) => {
                    combined.files.extend(output.files);
                    combined.failures.extend(output.dropped);
                }
                Err(err) if policy.is_fatal(&err) => {
                    tracing::error!("bundle `{}` failed: {}", dep.name, err);
                    if fatal.is_none() {
                        fatal = Some(err);
                    }
                }
                Err(err) => {
                    tracing::error!("bundle `{}` dropped: {}", dep.name, err);
                    combined.failures.push(err);
                }
            }
        }

        match fatal {
            Some(err) => Err(err),
            None => Ok(combined),
        }
    }

    fn run_one<F>(
        &self,
        dep: &Dependency,
        namespace: &Path,
        vars: &ToolVars,
        factory: &F,
    ) -> Result<PipelineOutput, AssetError>
    where
        F: Fn(AssetType, &str) -> Pipeline + Sync,
    {
        let root = self.manifest.root();
        let paths = glob_files(root, &dep.globs).map_err(|e| AssetError::io_chain(root, e))?;

        if paths.is_empty() {
            tracing::warn!(
                "bundle `{}` matched no files ({})",
                dep.name,
                dep.globs.join(", ")
            );
            return Ok(PipelineOutput::default());
        }

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let contents = read_bytes(&path).map_err(|e| AssetError::io_chain(&path, e))?;
            files.push(AssetFile::new(path, namespace, contents));
        }

        let pipeline = factory(dep.asset_type, &dep.name);
        let env = StageEnv {
            tools: self.tools,
            vars,
            namespace,
        };
        tracing::debug!("{}: {} source file(s)", dep.name, files.len());
        pipeline.run(files, &env)
    }

    /// Write a combined output, broadcast bundle writes, record revisions.
    pub fn write(
        &self,
        asset_type: AssetType,
        output_dir_name: &str,
        combined: &CombinedOutput,
    ) -> Result<Vec<PathBuf>, AssetError> {
        let out_dir = self.manifest.dist_dir().join(output_dir_name);
        let mut written = Vec::with_capacity(combined.files.len());

        for file in &combined.files {
            let dest = out_dir.join(file.relative());
            write_atomic(&dest, &file.contents).map_err(|e| AssetError::io_chain(&dest, e))?;
            self.reload.publish_bundle(asset_type.dir_name(), &dest);
            written.push(dest);
        }

        self.ledger.record(output_dir_name, &combined.files)?;
        Ok(written)
    }
}
