//! Lookup of tools by name.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use crate::core::error::AssetError;
use crate::tools::command::{CommandTool, Passthrough};
use crate::tools::spec::{ResolvedTool, ToolSpec};
use crate::tools::{names, Generator, Linter, Processor};

/// Registry of the tools available to pipelines and tasks.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    processors: HashMap<String, Arc<dyn Processor>>,
    linters: HashMap<String, Arc<dyn Linter>>,
    generators: HashMap<String, Arc<dyn Generator>>,
}

impl ToolRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry from the built-in definitions and `[tools]` overrides.
    ///
    /// Commands run in `cwd`. A disabled processor is replaced by a
    /// passthrough; disabled linters and generators are left out.
    pub fn from_specs(specs: &BTreeMap<String, ToolSpec>, cwd: &Path) -> Self {
        let mut registry = ToolRegistry::new();

        for name in specs.keys() {
            if !names::ALL.contains(&name.as_str()) {
                tracing::warn!("ignoring configuration for unknown tool `{}`", name);
            }
        }

        for &name in names::ALL {
            let Some(tool) = ResolvedTool::resolve(name, specs.get(name)) else {
                continue;
            };

            if !tool.enabled {
                tracing::debug!("tool `{}` is disabled", name);
                if names::PROCESSORS.contains(&name) {
                    registry.register_processor(name, Arc::new(Passthrough::new(name)));
                }
                continue;
            }

            let command = Arc::new(CommandTool::new(tool, cwd));
            if names::PROCESSORS.contains(&name) {
                registry.register_processor(name, command.clone());
            }
            if names::LINTERS.contains(&name) {
                registry.register_linter(name, command.clone());
            }
            if names::GENERATORS.contains(&name) {
                registry.register_generator(name, command);
            }
        }

        registry
    }

    pub fn register_processor(&mut self, name: impl Into<String>, tool: Arc<dyn Processor>) {
        self.processors.insert(name.into(), tool);
    }

    pub fn register_linter(&mut self, name: impl Into<String>, tool: Arc<dyn Linter>) {
        self.linters.insert(name.into(), tool);
    }

    pub fn register_generator(&mut self, name: impl Into<String>, tool: Arc<dyn Generator>) {
        self.generators.insert(name.into(), tool);
    }

    /// Look up a processor. A missing processor is a tool error.
    pub fn processor(&self, name: &str) -> Result<Arc<dyn Processor>, AssetError> {
        self.processors
            .get(name)
            .cloned()
            .ok_or_else(|| AssetError::Tool {
                tool: name.to_string(),
                message: "no processor is registered under this name".to_string(),
            })
    }

    /// Look up a linter; `None` when disabled.
    pub fn linter(&self, name: &str) -> Option<Arc<dyn Linter>> {
        self.linters.get(name).cloned()
    }

    /// Look up a generator; `None` when disabled.
    pub fn generator(&self, name: &str) -> Option<Arc<dyn Generator>> {
        self.generators.get(name).cloned()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut processors: Vec<_> = self.processors.keys().collect();
        processors.sort();
        let mut linters: Vec<_> = self.linters.keys().collect();
        linters.sort();
        let mut generators: Vec<_> = self.generators.keys().collect();
        generators.sort();
        f.debug_struct("ToolRegistry")
            .field("processors", &processors)
            .field("linters", &linters)
            .field("generators", &generators)
            .finish()
    }
}
