//! Task executor with progress reporting.

use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::core::error::AssetError;
use crate::core::options::FailurePolicy;
use crate::graph::plan::Plan;
use crate::graph::task::TaskGraph;
use crate::pipeline::events::{BuildEvent, MessageFormat};

/// Outcome of a completed run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Tasks whose action ran, in completion order per level
    pub executed: Vec<String>,

    /// Tolerated task failures
    pub failures: Vec<(String, AssetError)>,
}

impl RunSummary {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs plans level by level.
pub struct TaskExecutor<'a, C> {
    graph: &'a TaskGraph<C>,
    policy: FailurePolicy,
    verbose: bool,
    format: MessageFormat,
}

impl<'a, C: Sync> TaskExecutor<'a, C> {
    /// Create a new executor.
    pub fn new(graph: &'a TaskGraph<C>, policy: FailurePolicy) -> Self {
        TaskExecutor {
            graph,
            policy,
            verbose: false,
            format: MessageFormat::Human,
        }
    }

    /// Enable verbose output.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn message_format(mut self, format: MessageFormat) -> Self {
        self.format = format;
        self
    }

    /// Execute a plan.
    ///
    /// Tasks of one level run concurrently. A fatal failure stops the run
    /// after the current level: nothing that depends on it starts.
    pub fn execute(&self, plan: &Plan, ctx: &C) -> Result<RunSummary, AssetError> {
        let start = Instant::now();
        let total = plan.task_count();

        if self.verbose {
            eprintln!("     Running {} task(s) in {} level(s)", total, plan.levels().len());
        }

        let pb = if !self.verbose && !self.format.is_json() && total > 1 {
            let pb = ProgressBar::new(total as u64);
            if let Ok(style) =
                ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            Some(pb)
        } else {
            None
        };

        let mut summary = RunSummary::default();

        for level in plan.levels() {
            let results: Vec<(String, Option<Result<(), AssetError>>)> = level
                .par_iter()
                .map(|name| {
                    let outcome = self.run_task(name, ctx);
                    if let Some(pb) = &pb {
                        pb.set_message(name.clone());
                        pb.inc(1);
                    }
                    (name.clone(), outcome)
                })
                .collect();

            let mut fatal = None;
            for (name, outcome) in results {
                match outcome {
                    None => {}
                    Some(Ok(())) => summary.executed.push(name),
                    Some(Err(err)) if self.policy.is_fatal(&err) => {
                        tracing::error!("task `{}` failed: {}", name, err);
                        if fatal.is_none() {
                            fatal = Some(err);
                        }
                    }
                    Some(Err(err)) => {
                        tracing::warn!("task `{}` failed: {}", name, err);
                        summary.executed.push(name.clone());
                        summary.failures.push((name, err));
                    }
                }
            }

            if let Some(err) = fatal {
                if let Some(pb) = pb {
                    pb.abandon_with_message("failed");
                }
                self.format.emit(&BuildEvent::finished(
                    false,
                    start.elapsed().as_millis() as u64,
                    Some(summary.executed.len() as u64),
                ));
                return Err(err);
            }
        }

        if let Some(pb) = pb {
            pb.finish_with_message("done");
        }

        let elapsed = start.elapsed();
        self.format.emit(&BuildEvent::finished(
            summary.is_clean(),
            elapsed.as_millis() as u64,
            Some(summary.executed.len() as u64),
        ));
        if !self.format.is_json() {
            eprintln!(
                "    Finished {} task(s) in {:.2}s",
                summary.executed.len(),
                elapsed.as_secs_f64()
            );
        }

        Ok(summary)
    }

    /// Run one task; `None` when it has no action of its own.
    fn run_task(&self, name: &str, ctx: &C) -> Option<Result<(), AssetError>> {
        let task = self.graph.get(name)?;
        let action = task.action.as_ref()?;

        let start = Instant::now();
        self.format.emit(&BuildEvent::task_started(name));
        tracing::debug!("starting `{}`", name);

        let result = action(ctx);

        let elapsed = start.elapsed();
        self.format.emit(&BuildEvent::task_finished(
            name,
            result.is_ok(),
            elapsed.as_millis() as u64,
        ));
        if let Err(ref err) = result {
            self.format
                .emit(&BuildEvent::error(err.to_string(), None));
        } else {
            tracing::info!("finished `{}` after {:.0}ms", name, elapsed.as_secs_f64() * 1000.0);
        }

        Some(result)
    }
}
