//! leetdigest CLI — the main entry point.
//!
//! Commands:
//! - `run`      — Build and deliver one digest
//! - `daemon`   — Deliver digests on the configured cron schedule
//! - `init`     — Write the default config file
//! - `validate` — Load, validate and summarise configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod wiring;

#[derive(Parser)]
#[command(
    name = "leetdigest",
    about = "leetdigest — daily LeetCode & algorithms digest",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ~/.leetdigest/config.toml)
    #[arg(short, long, global = true, env = "LEETDIGEST_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and deliver one digest
    Run {
        /// Print the digest to stdout instead of posting it
        #[arg(long)]
        dry_run: bool,

        /// Seed for problem and article sampling
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run once now, then on every scheduled tick
    Daemon,

    /// Write the default config file
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Validate configuration and show the effective settings
    Validate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Run { dry_run, seed } => commands::run::run(config, dry_run, seed).await?,
        Commands::Daemon => commands::daemon::run(config).await?,
        Commands::Init { force } => commands::init::run(config, force).await?,
        Commands::Validate => commands::validate::run(config).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_flags_parse() {
        let cli = Cli::parse_from(["leetdigest", "run", "--dry-run", "--seed", "7"]);
        match cli.command {
            Commands::Run { dry_run, seed } => {
                assert!(dry_run);
                assert_eq!(seed, Some(7));
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "leetdigest",
            "validate",
            "--config",
            "/tmp/digest.toml",
            "--json-logs",
        ]);
        assert!(matches!(cli.command, Commands::Validate));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/digest.toml")));
        assert!(cli.json_logs);
        assert!(!cli.verbose);
    }

    #[test]
    fn init_force_flag() {
        let cli = Cli::parse_from(["leetdigest", "init", "--force"]);
        assert!(matches!(cli.command, Commands::Init { force: true }));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["leetdigest"]).is_err());
    }
}
