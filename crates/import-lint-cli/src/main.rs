//! `import-lint`: rewrites `@trigger.dev/core` barrel imports into the
//! sub-path imports that actually define each symbol.
//!
//! ```bash
//! import-lint check [--fix] [--format text|json|compact|pretty] [PATH]
//! import-lint list-rules
//! import-lint init [--force]
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

use commands::check::CheckArgs;

/// Linter that rewrites barrel imports into specific sub-path imports
#[derive(Parser)]
#[command(name = "import-lint", author, version, about, long_about = None)]
struct Cli {
    /// Log resolution steps (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file, overriding project and global lookup
    #[arg(short, long, global = true, env = "IMPORT_LINT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lint a project, optionally applying fixes
    Check(CheckArgs),

    /// Show the available rules
    ListRules,

    /// Write a starter import-lint.toml into the current directory
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

/// How `check` prints its result.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// Multi-line blocks with help and the proposed fix.
    #[default]
    Text,
    /// The whole result as pretty JSON.
    Json,
    /// `file:line:col: severity [CODE] message`, one per line.
    Compact,
    /// Source snippets with labels.
    Pretty,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(if cli.verbose { "debug" } else { "info" }))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Check(args) => {
            let source = config_resolver::resolve(&args.path, cli.config.as_deref());
            commands::check::run(&args, &source)
        }
        Command::ListRules => {
            commands::list_rules::run();
            Ok(())
        }
        Command::Init { force } => commands::init::run(force),
    }
}
