//! Build options and the failure policy derived from them.

use crate::core::error::{AssetError, ErrorKind};

/// Flags derived from the invocation mode.
///
/// Computed once per invocation, read-only afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Content-hash bundle filenames
    pub rev: bool,

    /// Emit source maps
    pub maps: bool,

    /// Abort a task when a pipeline stage fails
    pub fail_task: bool,

    /// Abort when a linter reports errors
    pub fail_lint: bool,

    /// Drop `debugger` statements while minifying scripts
    pub strip_js_debug: bool,

    /// Use the online favicon service
    pub real_favicon_api: bool,
}

impl BuildOptions {
    /// Options for a `--production` build.
    pub fn production() -> Self {
        BuildOptions::from_production_flag(true)
    }

    /// Options for a development build.
    pub fn development() -> Self {
        BuildOptions::from_production_flag(false)
    }

    /// Derive every flag from the production switch.
    pub fn from_production_flag(production: bool) -> Self {
        BuildOptions {
            rev: production,
            maps: !production,
            fail_task: production,
            fail_lint: production,
            strip_js_debug: production,
            real_favicon_api: production,
        }
    }

    /// Whether these are production options.
    pub fn is_production(&self) -> bool {
        self.rev && self.fail_task
    }

    /// The failure policy for this build.
    pub fn policy(&self) -> FailurePolicy {
        FailurePolicy {
            fail_task: self.fail_task,
            fail_lint: self.fail_lint,
        }
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions::development()
    }
}

/// Decides which errors abort a build.
///
/// This is the only place fatality is decided; tasks and pipelines ask it
/// instead of inspecting flags themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailurePolicy {
    /// Pipeline errors are fatal
    pub fail_task: bool,

    /// Lint errors are fatal
    pub fail_lint: bool,
}

impl FailurePolicy {
    /// A policy where every error is fatal.
    pub fn strict() -> Self {
        FailurePolicy {
            fail_task: true,
            fail_lint: true,
        }
    }

    /// A policy that tolerates pipeline and lint errors.
    pub fn tolerant() -> Self {
        FailurePolicy {
            fail_task: false,
            fail_lint: false,
        }
    }

    /// Whether an error of this kind aborts the enclosing task.
    pub fn is_fatal_kind(&self, kind: ErrorKind) -> bool {
        match kind {
            ErrorKind::Config | ErrorKind::Io | ErrorKind::Tool => true,
            ErrorKind::Lint => self.fail_lint,
            ErrorKind::Pipeline => self.fail_task,
        }
    }

    /// Whether this error aborts the enclosing task.
    pub fn is_fatal(&self, err: &AssetError) -> bool {
        self.is_fatal_kind(err.kind())
    }

    /// Whether pipeline failures abort their bundle set.
    pub fn fails_fast(&self) -> bool {
        self.fail_task
    }
}
