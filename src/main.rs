//! partsbin CLI entry point
//!
//! Parses arguments, loads configuration and dispatches to subcommands.

use clap::Parser;
use console::style;
use partsbin::cli::{Cli, Commands};
use partsbin::config::ConfigManager;
use partsbin::error::PartsbinResult;
use partsbin::ui;
use std::error::Error as _;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(source) = e.source() {
                eprintln!("  {}", style(source).dim());
            }
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> PartsbinResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config.general.log_format);
    ui::init_theme();

    let cache_root = ConfigManager::cache_root(&config, cli.cache_dir.as_deref());
    debug!("Cache root: {}", cache_root.display());

    match cli.command {
        Commands::Get(args) => partsbin::cli::commands::get(args, &config, &cache_root).await,
        Commands::Cache(args) => partsbin::cli::commands::cache(args, &config, &cache_root).await,
        Commands::Config(args) => {
            partsbin::cli::commands::config(args, &config, &config_manager).await
        }
    }
}

/// Logs go to stderr so `get` can stream file contents on stdout.
/// 0 = warn, 1 = info, 2+ = debug.
fn init_logging(verbose: u8, log_format: &str) {
    let filter = match verbose {
        0 => EnvFilter::new("partsbin=warn"),
        1 => EnvFilter::new("partsbin=info"),
        _ => EnvFilter::new("partsbin=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
