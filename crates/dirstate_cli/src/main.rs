//! dirstate CLI: query directory change state and newest-file listings.
//!
//! Provides `dirstate latest` for the newest files in a directory,
//! `dirstate changed` and `dirstate status` for change detection against a
//! state file, `dirstate ls` for glob listings, and `dirstate setup` for
//! creating the directories named in `dirstate.toml`.

#![warn(missing_docs)]

mod changed;
mod latest;
mod ls;
mod setup;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use dirstate_config::DirstateConfig;
use tracing_subscriber::EnvFilter;

/// dirstate: directory change detection and newest-file queries.
#[derive(Parser, Debug)]
#[command(name = "dirstate", version, about = "Directory state tracker")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `dirstate.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the most recently modified files in a directory, newest first.
    Latest(LatestArgs),
    /// Report whether a directory changed since its recorded state.
    Changed(StateArgs),
    /// Show which files differ from the recorded state without updating it.
    Status(StateArgs),
    /// List directory entries matching a glob pattern.
    Ls(LsArgs),
    /// Create every directory listed under `[directories]` in the config.
    Setup,
}

/// Arguments for the `dirstate latest` subcommand.
#[derive(Parser, Debug)]
pub struct LatestArgs {
    /// Directory to query.
    pub directory: PathBuf,

    /// Maximum number of files to print (0 for all).
    #[arg(short = 'n', long = "count")]
    pub count: Option<usize>,

    /// Only include files ending with this suffix, e.g. `.jpg`.
    #[arg(short, long)]
    pub ext: Option<String>,

    /// State file recording the directory snapshot.
    #[arg(long)]
    pub state_file: Option<PathBuf>,
}

/// Arguments for the `dirstate changed` and `dirstate status` subcommands.
#[derive(Parser, Debug)]
pub struct StateArgs {
    /// Directory to check.
    pub directory: PathBuf,

    /// State file recording the directory snapshot.
    #[arg(long)]
    pub state_file: Option<PathBuf>,
}

/// Arguments for the `dirstate ls` subcommand.
#[derive(Parser, Debug)]
pub struct LsArgs {
    /// Directory to list.
    pub directory: PathBuf,

    /// Glob pattern to match entries against.
    #[arg(short, long, default_value = "*")]
    pub pattern: String,

    /// Match the pattern in every subdirectory as well.
    #[arg(short, long)]
    pub recursive: bool,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Optional path to a custom config file.
    pub config: Option<PathBuf>,
}

impl GlobalArgs {
    /// Loads the configuration named by `--config`, or `./dirstate.toml` if
    /// present, or the defaults.
    pub fn load_config(&self) -> Result<DirstateConfig, Box<dyn std::error::Error>> {
        let config = match &self.config {
            Some(path) => dirstate_config::load_config_file(path)?,
            None => dirstate_config::load_config_or_default(Path::new("."))?,
        };
        Ok(config)
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);

    let global = GlobalArgs {
        quiet: cli.quiet,
        config: cli.config,
    };

    let mut stdout = std::io::stdout().lock();
    let result = match cli.command {
        Command::Latest(ref args) => latest::run(args, &global, &mut stdout),
        Command::Changed(ref args) => changed::run_changed(args, &global, &mut stdout),
        Command::Status(ref args) => changed::run_status(args, &global, &mut stdout),
        Command::Ls(ref args) => ls::run(args, &mut stdout),
        Command::Setup => setup::run(&global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the stderr log subscriber. `--verbose` and `--quiet` take
/// precedence over `RUST_LOG`.
fn init_tracing(quiet: bool, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
