//! Capstan - Package acquisition and content cache
//!
//! CLI entry point that dispatches to subcommands.

use capstan::cli::{Cli, Commands};
use capstan::config::ConfigManager;
use capstan::error::CapstanResult;
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> CapstanResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("capstan=warn"),
        1 => EnvFilter::new("capstan=info"),
        _ => EnvFilter::new("capstan=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };
    let config = config_manager.load()?;

    // Dispatch to command
    match cli.command {
        Commands::Download(args) => capstan::cli::commands::download(args, &config),
        Commands::Cache(args) => capstan::cli::commands::cache(args, &config),
        Commands::Config(args) => capstan::cli::commands::config(args, &config_manager, &config),
    }
}
