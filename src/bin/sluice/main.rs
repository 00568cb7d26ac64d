//! sluice CLI - a manifest-driven front-end asset pipeline runner

use std::io::IsTerminal;

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use sluice::ops::DEFAULT_TASK;
use sluice::util::diagnostic;
use sluice::AssetError;

fn main() {
    let cli = Cli::parse();
    let color = !cli.global.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli) {
        match e.downcast_ref::<AssetError>() {
            Some(err) => diagnostic::emit(&err.to_diagnostic(), color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging; stdout is reserved for JSON events.
    let filter = if cli.global.verbose {
        EnvFilter::new("sluice=debug")
    } else {
        EnvFilter::new("sluice=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_ansi(!cli.global.no_color)
        .with_writer(std::io::stderr)
        .init();

    let global = &cli.global;
    match cli.command {
        None => commands::run::execute(global, &[DEFAULT_TASK]),
        Some(Commands::Run(args)) => {
            let tasks: Vec<&str> = args.tasks.iter().map(String::as_str).collect();
            commands::run::execute(global, &tasks)
        }
        Some(Commands::Watch) => commands::watch::execute(global),
        Some(Commands::Tasks) => commands::tasks::execute(global),
        Some(Commands::Completions(args)) => commands::completions::execute(args),
        Some(command) => {
            let task = command
                .task_name()
                .ok_or_else(|| anyhow!("command does not name a task"))?;
            commands::run::execute(global, &[task])
        }
    }
}
