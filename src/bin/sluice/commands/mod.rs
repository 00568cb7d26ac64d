//! Command implementations

pub mod completions;
pub mod run;
pub mod tasks;
pub mod watch;

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::GlobalArgs;
use sluice::core::{BuildOptions, Manifest};
use sluice::pipeline::MessageFormat;
use sluice::util::config::{global_config_path, load_config, project_config_path};
use sluice::util::{Config, GlobalContext};

/// Everything loaded before a task runs.
pub struct Session {
    pub manifest: Manifest,
    pub root: PathBuf,
    pub config: Config,
    pub options: BuildOptions,
    pub format: MessageFormat,
    pub verbose: bool,
}

impl Session {
    /// Locate and load the manifest and the tool configuration, and size
    /// the thread pool.
    pub fn load(args: &GlobalArgs) -> Result<Self> {
        let ctx = GlobalContext::new()?;

        let location = ctx.find_manifest(args.manifest.as_deref())?;
        tracing::debug!("using manifest {}", location.path.display());
        let manifest = Manifest::load(&location.path, &location.root)?;

        let config = load_config(
            global_config_path().as_deref(),
            &project_config_path(&location.root),
        )?;

        // Jobs: CLI > config > None (auto-detect)
        if let Some(jobs) = args.jobs.or(config.build.jobs) {
            if let Err(e) = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build_global()
            {
                tracing::debug!("thread pool already initialized: {}", e);
            }
        }

        Ok(Session {
            manifest,
            root: location.root,
            config,
            options: BuildOptions::from_production_flag(args.production),
            format: args.message_format.into(),
            verbose: args.verbose,
        })
    }

    pub fn mode(&self) -> &'static str {
        if self.options.is_production() {
            "production"
        } else {
            "development"
        }
    }
}
