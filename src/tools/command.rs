//! Tools backed by external commands, plus the passthrough processor.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::tools::spec::{ResolvedTool, ToolVars};
use crate::tools::{Generator, LintOutcome, Linter, Processor};
use crate::util::process::{find_executable, ProcessBuilder};

/// The executable behind a tool could not be located.
#[derive(Debug, Error)]
#[error("`{command}` was not found on PATH")]
pub struct ToolUnavailable {
    pub tool: String,
    pub command: String,
}

/// A tool that runs an external command.
///
/// As a processor the file contents go to stdin and stdout becomes the new
/// contents. As a linter the exit status decides pass/fail. As a generator
/// the command writes into `{output_dir}`.
#[derive(Debug, Clone)]
pub struct CommandTool {
    spec: ResolvedTool,
    cwd: PathBuf,
}

impl CommandTool {
    /// Create a command tool running in `cwd`.
    pub fn new(spec: ResolvedTool, cwd: impl Into<PathBuf>) -> Self {
        CommandTool {
            spec,
            cwd: cwd.into(),
        }
    }

    fn program(&self) -> Result<PathBuf> {
        let command = Path::new(&self.spec.command);
        if command.components().count() > 1 {
            let path = if command.is_absolute() {
                command.to_path_buf()
            } else {
                self.cwd.join(command)
            };
            if path.exists() {
                return Ok(path);
            }
        } else if let Some(path) = find_executable(&self.spec.command) {
            return Ok(path);
        }

        Err(ToolUnavailable {
            tool: self.spec.name.clone(),
            command: self.spec.command.clone(),
        }
        .into())
    }

    fn builder(&self, vars: &ToolVars) -> Result<ProcessBuilder> {
        let mut builder = ProcessBuilder::new(self.program()?)
            .args(vars.expand(&self.spec.args))
            .cwd(&self.cwd);
        for (key, value) in &self.spec.env {
            builder = builder.env(key, value);
        }
        Ok(builder)
    }
}

impl Processor for CommandTool {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn process(&self, path: &Path, contents: &[u8], vars: &ToolVars) -> Result<Vec<u8>> {
        let vars = vars.clone().with("file", path.to_string_lossy());
        let builder = self.builder(&vars)?.stdin(contents.to_vec());
        tracing::debug!("{}: {}", self.spec.name, builder.display_command());

        let output = builder.exec_and_check()?;
        Ok(output.stdout)
    }
}

impl Linter for CommandTool {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn lint(&self, files: &[PathBuf], vars: &ToolVars) -> Result<LintOutcome> {
        let vars = vars
            .clone()
            .with_files(files.iter().map(|f| f.to_string_lossy().into_owned()));
        let builder = self.builder(&vars)?;
        tracing::debug!("{}: {}", self.spec.name, builder.display_command());

        let output = builder.exec()?;
        let mut report = String::from_utf8_lossy(&output.stdout).into_owned();
        report.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(LintOutcome {
            passed: output.status.success(),
            report,
        })
    }
}

impl Generator for CommandTool {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn generate(&self, inputs: &[PathBuf], output_dir: &Path, vars: &ToolVars) -> Result<()> {
        let vars = vars
            .clone()
            .with("output_dir", output_dir.to_string_lossy())
            .with_files(inputs.iter().map(|f| f.to_string_lossy().into_owned()));
        let builder = self.builder(&vars)?;
        tracing::debug!("{}: {}", self.spec.name, builder.display_command());

        builder
            .exec_and_check()
            .with_context(|| format!("`{}` failed to generate assets", self.spec.name))?;
        Ok(())
    }
}

/// A processor that returns its input unchanged.
///
/// Stands in for a tool disabled with `enabled = false`.
#[derive(Debug, Clone)]
pub struct Passthrough {
    name: String,
}

impl Passthrough {
    pub fn new(name: impl Into<String>) -> Self {
        Passthrough { name: name.into() }
    }
}

impl Processor for Passthrough {
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&self, path: &Path, contents: &[u8], _vars: &ToolVars) -> Result<Vec<u8>> {
        tracing::trace!("{} disabled, passing {} through", self.name, path.display());
        Ok(contents.to_vec())
    }
}
