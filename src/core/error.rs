//! Classified build errors.
//!
//! Every failure that crosses a component boundary is an [`AssetError`].
//! Whether an error aborts the build is decided in exactly one place,
//! [`FailurePolicy`](crate::core::options::FailurePolicy), from the
//! error's [`ErrorKind`].

use std::fmt;
use std::path::{Path, PathBuf};

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error class, used by the failure policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Lint,
    Pipeline,
    Io,
    Tool,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Config => "config",
            ErrorKind::Lint => "lint",
            ErrorKind::Pipeline => "pipeline",
            ErrorKind::Io => "io",
            ErrorKind::Tool => "tool",
        };
        f.write_str(s)
    }
}

/// An error raised while loading configuration or running tasks.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum AssetError {
    #[error("invalid configuration: {message}")]
    #[diagnostic(code(sluice::config))]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    #[error(
        "could not find `assets/manifest.json` in `{}` or any parent directory",
        searched.display()
    )]
    #[diagnostic(code(sluice::config::no_manifest))]
    ManifestNotFound { searched: PathBuf },

    #[error("unknown task `{name}`")]
    #[diagnostic(code(sluice::config::unknown_task))]
    UnknownTask { name: String, available: Vec<String> },

    #[error("`{tool}` reported lint errors")]
    #[diagnostic(code(sluice::lint))]
    Lint { tool: String, report: String },

    #[error("{stage} failed for {}: {message}", file.display())]
    #[diagnostic(code(sluice::pipeline))]
    Pipeline {
        stage: String,
        tool: Option<String>,
        file: PathBuf,
        message: String,
    },

    #[error("{}: {message}", path.display())]
    #[diagnostic(code(sluice::io))]
    Io { path: PathBuf, message: String },

    #[error("tool `{tool}` is unavailable: {message}")]
    #[diagnostic(code(sluice::tool))]
    Tool { tool: String, message: String },
}

impl AssetError {
    /// A configuration error without a specific file.
    pub fn config(message: impl Into<String>) -> Self {
        AssetError::Config {
            message: message.into(),
            path: None,
        }
    }

    /// A configuration error located in a file.
    pub fn config_at(path: &Path, message: impl Into<String>) -> Self {
        AssetError::Config {
            message: message.into(),
            path: Some(path.to_path_buf()),
        }
    }

    /// A filesystem failure.
    pub fn io(path: &Path, err: impl fmt::Display) -> Self {
        AssetError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    /// Wrap an `anyhow` error from a filesystem helper, keeping its chain.
    pub fn io_chain(path: &Path, err: anyhow::Error) -> Self {
        AssetError::Io {
            path: path.to_path_buf(),
            message: format!("{:#}", err),
        }
    }

    /// A stage failure for one file.
    pub fn pipeline(
        stage: impl Into<String>,
        tool: Option<&str>,
        file: &Path,
        message: impl Into<String>,
    ) -> Self {
        AssetError::Pipeline {
            stage: stage.into(),
            tool: tool.map(str::to_string),
            file: file.to_path_buf(),
            message: message.into(),
        }
    }

    /// The error class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AssetError::Config { .. }
            | AssetError::ManifestNotFound { .. }
            | AssetError::UnknownTask { .. } => ErrorKind::Config,
            AssetError::Lint { .. } => ErrorKind::Lint,
            AssetError::Pipeline { .. } => ErrorKind::Pipeline,
            AssetError::Io { .. } => ErrorKind::Io,
            AssetError::Tool { .. } => ErrorKind::Tool,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            AssetError::Config { message, path } => {
                let mut diag = Diagnostic::error(format!("invalid configuration: {}", message));
                if let Some(path) = path {
                    diag = diag.with_location(path);
                }
                diag.with_suggestion(suggestions::CHECK_MANIFEST)
            }

            AssetError::ManifestNotFound { .. } => {
                Diagnostic::error(self.to_string()).with_suggestion(suggestions::NO_MANIFEST)
            }

            AssetError::UnknownTask { name, available } => {
                Diagnostic::error(format!("unknown task `{}`", name))
                    .with_context(format!("available tasks: {}", available.join(", ")))
                    .with_suggestion(suggestions::LIST_TASKS)
            }

            AssetError::Lint { tool, report } => {
                let mut diag = Diagnostic::error(format!("`{}` reported lint errors", tool));
                for line in report.lines().filter(|l| !l.trim().is_empty()).take(20) {
                    diag = diag.with_context(line.to_string());
                }
                diag
            }

            AssetError::Pipeline {
                stage,
                tool,
                file,
                message,
            } => {
                let headline = match tool {
                    Some(tool) => format!("{} stage (`{}`) failed", stage, tool),
                    None => format!("{} stage failed", stage),
                };
                let mut diag = Diagnostic::error(headline).with_location(file);
                for line in message.lines().filter(|l| !l.trim().is_empty()).take(20) {
                    diag = diag.with_context(line.to_string());
                }
                diag
            }

            AssetError::Io { path, message } => {
                Diagnostic::error(message.clone()).with_location(path)
            }

            AssetError::Tool { tool, message } => {
                Diagnostic::error(format!("tool `{}` is unavailable", tool))
                    .with_context(message.clone())
                    .with_suggestion(suggestions::CONFIGURE_TOOL)
            }
        }
    }
}
