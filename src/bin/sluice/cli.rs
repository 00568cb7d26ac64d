//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use sluice::pipeline::MessageFormat;

/// sluice - a manifest-driven front-end asset pipeline runner
#[derive(Parser)]
#[command(name = "sluice")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Task to run (runs `default` when omitted)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Flags shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Build for production: hashed names, no source maps, fail on errors
    #[arg(long, global = true, env = "SLUICE_PRODUCTION")]
    pub production: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to the asset manifest (default: search for assets/manifest.json)
    #[arg(long, global = true, value_name = "PATH")]
    pub manifest: Option<PathBuf>,

    /// Number of parallel jobs
    #[arg(short, long, global = true)]
    pub jobs: Option<usize>,

    /// Output format for build events
    #[arg(long, global = true, value_enum, default_value_t = FormatArg::Human)]
    pub message_format: FormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Human,
    Json,
}

impl From<FormatArg> for MessageFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Human => MessageFormat::Human,
            FormatArg::Json => MessageFormat::Json,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile, combine and optimize style bundles
    Styles,

    /// Transpile, combine and optimize script bundles
    Scripts,

    /// Copy fonts into a flat directory
    Fonts,

    /// Optimize images
    Images,

    /// Copy videos
    Videos,

    /// Generate favicon files
    Favicons,

    /// Combine SVG icons into a symbol sprite
    Icons,

    /// Lint project scripts
    #[command(alias = "lint-scripts")]
    Jslint,

    /// Lint Sass sources
    #[command(alias = "lint-styles")]
    Sasslint,

    /// Inject vendor style imports into style sources
    #[command(alias = "inject")]
    Wiredep,

    /// Delete the output directory
    Clean,

    /// Build every asset
    Build,

    /// Rebuild assets as their sources change
    Watch,

    /// Run one or more tasks by name
    Run(RunArgs),

    /// List the tasks and their prerequisites
    Tasks,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

impl Commands {
    /// The task a command runs, for commands that map onto one.
    pub fn task_name(&self) -> Option<&'static str> {
        let name = match self {
            Commands::Styles => "styles",
            Commands::Scripts => "scripts",
            Commands::Fonts => "fonts",
            Commands::Images => "images",
            Commands::Videos => "videos",
            Commands::Favicons => "favicons",
            Commands::Icons => "icons",
            Commands::Jslint => "jslint",
            Commands::Sasslint => "sasslint",
            Commands::Wiredep => "wiredep",
            Commands::Clean => "clean",
            Commands::Build => "build",
            _ => return None,
        };
        Some(name)
    }
}

#[derive(Args)]
pub struct RunArgs {
    /// Task names or aliases
    #[arg(required = true)]
    pub tasks: Vec<String>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
