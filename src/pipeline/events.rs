//! Build event types for JSON output.
//!
//! These events are emitted one per line when using `--message-format=json`.
//! An external dev proxy can follow `asset-changed` events to reload the
//! browser.
//!
//! # Event Types
//!
//! - `task-started`: A task began running
//! - `task-finished`: A task completed (success or failure)
//! - `asset-changed`: An artifact was written to the output tree
//! - `build-finished`: The whole invocation completed
//! - `diagnostic`: A warning or error message

use std::path::PathBuf;

use serde::Serialize;

use crate::pipeline::reload::ReloadEvent;

/// A build event emitted during a run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "reason")]
pub enum BuildEvent {
    #[serde(rename = "task-started")]
    TaskStarted { task: String },

    #[serde(rename = "task-finished")]
    TaskFinished {
        task: String,
        success: bool,
        duration_ms: u64,
    },

    /// An artifact was written.
    #[serde(rename = "asset-changed")]
    AssetChanged {
        /// Asset class (`styles`, `scripts`, `fonts`, ...)
        class: String,
        /// Written file
        path: PathBuf,
    },

    #[serde(rename = "build-finished")]
    BuildFinished {
        success: bool,
        duration_ms: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        tasks_run: Option<u64>,
    },

    #[serde(rename = "diagnostic")]
    Diagnostic {
        /// Severity level ("error", "warning")
        level: String,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        file: Option<PathBuf>,
    },
}

impl BuildEvent {
    pub fn task_started(task: impl Into<String>) -> Self {
        BuildEvent::TaskStarted { task: task.into() }
    }

    pub fn task_finished(task: impl Into<String>, success: bool, duration_ms: u64) -> Self {
        BuildEvent::TaskFinished {
            task: task.into(),
            success,
            duration_ms,
        }
    }

    /// Create a build finished event.
    pub fn finished(success: bool, duration_ms: u64, tasks_run: Option<u64>) -> Self {
        BuildEvent::BuildFinished {
            success,
            duration_ms,
            tasks_run,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        BuildEvent::Diagnostic {
            level: "warning".to_string(),
            message: message.into(),
            file: None,
        }
    }

    pub fn error(message: impl Into<String>, file: Option<PathBuf>) -> Self {
        BuildEvent::Diagnostic {
            level: "error".to_string(),
            message: message.into(),
            file,
        }
    }

    /// Serialize this event to a JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// How events are reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MessageFormat {
    /// Status lines and logs only
    #[default]
    Human,
    /// One JSON event per line on stdout
    Json,
}

impl MessageFormat {
    /// Print an event if machine-readable output is enabled.
    pub fn emit(&self, event: &BuildEvent) {
        if *self == MessageFormat::Json {
            println!("{}", event.to_json());
        }
    }

    pub fn is_json(&self) -> bool {
        *self == MessageFormat::Json
    }
}

impl From<&ReloadEvent> for BuildEvent {
    fn from(event: &ReloadEvent) -> Self {
        BuildEvent::AssetChanged {
            class: event.class.clone(),
            path: event.path.clone(),
        }
    }
}
