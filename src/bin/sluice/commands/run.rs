//! Running tasks: `sluice`, `sluice build`, `sluice styles`, `sluice run ...`

use std::sync::mpsc::Receiver;
use std::thread::{self, JoinHandle};

use anyhow::Result;

use super::Session;
use crate::cli::GlobalArgs;
use sluice::graph::{plan, TaskExecutor};
use sluice::ops::{standard_graph, TaskContext};
use sluice::pipeline::{BuildEvent, MessageFormat, ReloadEvent};
use sluice::tools::ToolRegistry;

pub fn execute(args: &GlobalArgs, tasks: &[&str]) -> Result<()> {
    let session = Session::load(args)?;
    let tools = ToolRegistry::from_specs(&session.config.tools, &session.root);
    let ctx = TaskContext::new(session.manifest.clone(), session.options, tools);

    let forwarder = forward_events(session.format, ctx.reload.subscribe());
    let result = run_tasks(&session, &ctx, tasks);

    // Dropping the context closes the reload channel and ends the forwarder.
    drop(ctx);
    if let Some(handle) = forwarder {
        let _ = handle.join();
    }
    result
}

/// Plan and execute `tasks` against a context.
pub fn run_tasks(session: &Session, ctx: &TaskContext, tasks: &[&str]) -> Result<()> {
    let graph = standard_graph();
    let plan = plan(&graph, tasks)?;

    if !session.format.is_json() {
        eprintln!("     Running {} ({})", tasks.join(", "), session.mode());
    }

    let summary = TaskExecutor::new(&graph, ctx.policy())
        .verbose(session.verbose)
        .message_format(session.format)
        .execute(&plan, ctx)?;

    if !summary.is_clean() && !session.format.is_json() {
        eprintln!(
            "     Warning {} task(s) failed and were skipped: {}",
            summary.failures.len(),
            summary
                .failures
                .iter()
                .map(|(name, _)| name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(())
}

/// Print reload events as JSON lines.
pub fn forward_events(format: MessageFormat, events: Receiver<ReloadEvent>) -> Option<JoinHandle<()>> {
    if !format.is_json() {
        return None;
    }
    Some(thread::spawn(move || {
        for event in events {
            format.emit(&BuildEvent::from(&event));
        }
    }))
}
