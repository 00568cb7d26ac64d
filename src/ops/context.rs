//! Everything a task needs, passed explicitly.

use std::path::Path;
use std::sync::Arc;

use crate::core::manifest::Manifest;
use crate::core::options::{BuildOptions, FailurePolicy};
use crate::pipeline::{BundleRunner, PipelineSettings, ReloadEvent, ReloadHub, RevisionLedger};
use crate::tools::{ToolRegistry, ToolVars};

/// Per-invocation state shared by every task.
#[derive(Debug)]
pub struct TaskContext {
    pub manifest: Manifest,
    pub options: BuildOptions,
    pub tools: ToolRegistry,
    pub ledger: RevisionLedger,
    pub reload: Arc<ReloadHub>,
}

impl TaskContext {
    pub fn new(manifest: Manifest, options: BuildOptions, tools: ToolRegistry) -> Self {
        let ledger = RevisionLedger::new(manifest.revision_manifest_path());
        TaskContext {
            manifest,
            options,
            tools,
            ledger,
            reload: Arc::new(ReloadHub::new()),
        }
    }

    /// Share an existing reload hub, e.g. across watch-mode reloads.
    pub fn with_reload(mut self, reload: Arc<ReloadHub>) -> Self {
        self.reload = reload;
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.options.policy()
    }

    pub fn vars(&self) -> ToolVars {
        ToolVars::new(&self.options)
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings::from_manifest(&self.manifest)
    }

    pub fn bundle_runner(&self) -> BundleRunner<'_> {
        BundleRunner {
            manifest: &self.manifest,
            options: &self.options,
            tools: &self.tools,
            ledger: &self.ledger,
            reload: &self.reload,
        }
    }

    /// Announce a written file to reload listeners.
    pub fn publish(&self, class: &str, path: &Path) {
        self.reload.publish(ReloadEvent::new(class, path));
    }
}
