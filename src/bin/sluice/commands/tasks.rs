//! `sluice tasks` command

use anyhow::Result;
use serde::Serialize;

use crate::cli::GlobalArgs;
use sluice::graph::Step;
use sluice::ops::{standard_graph, DEFAULT_TASK};
use sluice::pipeline::MessageFormat;

#[derive(Serialize)]
struct TaskInfo<'a> {
    name: &'a str,
    description: &'a str,
    aliases: &'a [String],
    requires: Vec<&'a str>,
    series: Vec<String>,
}

pub fn execute(args: &GlobalArgs) -> Result<()> {
    let graph = standard_graph();
    let infos: Vec<TaskInfo<'_>> = graph
        .tasks()
        .map(|task| TaskInfo {
            name: task.name(),
            description: task.description(),
            aliases: task.aliases(),
            requires: task.prerequisites(),
            series: task.series_steps().iter().map(describe_step).collect(),
        })
        .collect();

    if MessageFormat::from(args.message_format).is_json() {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    let width = infos.iter().map(|t| t.name.len()).max().unwrap_or(0);
    for info in &infos {
        let marker = if info.name == DEFAULT_TASK { " (default)" } else { "" };
        println!("{:<width$}  {}{}", info.name, info.description, marker, width = width);
        if !info.aliases.is_empty() {
            println!("{:<width$}    alias: {}", "", info.aliases.join(", "), width = width);
        }
        if !info.series.is_empty() {
            println!("{:<width$}    runs: {}", "", info.series.join(" -> "), width = width);
        } else if !info.requires.is_empty() {
            println!("{:<width$}    after: {}", "", info.requires.join(", "), width = width);
        }
    }

    Ok(())
}

fn describe_step(step: &Step) -> String {
    match step {
        Step::Task(name) => name.clone(),
        Step::Parallel(names) => format!("[{}]", names.join(", ")),
    }
}
