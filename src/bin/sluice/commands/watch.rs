//! `sluice watch` command

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use super::run::{forward_events, run_tasks};
use super::Session;
use crate::cli::GlobalArgs;
use sluice::ops::{watch, TaskContext};
use sluice::pipeline::ReloadHub;
use sluice::tools::ToolRegistry;
use sluice::AssetError;

pub fn execute(args: &GlobalArgs) -> Result<()> {
    let session = Session::load(args)?;
    let debounce = Duration::from_millis(session.config.debounce_ms());

    // One hub for the whole session; every rebuild publishes into it.
    let hub = Arc::new(ReloadHub::new());
    let forwarder = forward_events(session.format, hub.subscribe());

    if !session.format.is_json() {
        eprintln!(
            "    Watching {} ({})",
            session.manifest.source_dir().display(),
            session.mode()
        );
    }

    let result = watch(session.manifest.clone(), debounce, |manifest, tasks| {
        let tools = ToolRegistry::from_specs(&session.config.tools, &session.root);
        let ctx = TaskContext::new(manifest.clone(), session.options, tools).with_reload(hub.clone());
        run_tasks(&session, &ctx, tasks).map_err(|e| match e.downcast::<AssetError>() {
            Ok(err) => err,
            Err(other) => AssetError::config(format!("{:#}", other)),
        })
    });

    drop(hub);
    if let Some(handle) = forwarder {
        let _ = handle.join();
    }
    result?;
    Ok(())
}
