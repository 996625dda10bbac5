//! crash-analyzer - crash dump triage for CI jobs
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use crash_analyzer::cli::commands::{self, CommandContext};
use crash_analyzer::cli::{Cli, Commands};
use crash_analyzer::config::ConfigManager;
use crash_analyzer::error::CrashResult;
use crash_analyzer::ui;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
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

async fn run() -> CrashResult<()> {
    let cli = Cli::parse();

    // Completions need neither config nor logging
    if let Commands::Completions { shell } = cli.command {
        return commands::completions(shell);
    }

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    // 0 = warn (spinners only), 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("crash_analyzer=warn"),
        1 => EnvFilter::new("crash_analyzer=info"),
        _ => EnvFilter::new("crash_analyzer=debug"),
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr);
    if config.general.log_format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
    debug!("Loaded configuration from {}", config_manager.path().display());

    ui::init_theme();
    let ctx = CommandContext::new(config, cli.env_dir, cli.temp_env, cli.package_job);

    match cli.command {
        Commands::Completions { .. } => unreachable!("Completions handled above"),
        Commands::Dump(args) => commands::dump(args, &ctx).await,
        Commands::Debug(args) => commands::debug(args, &ctx).await,
        Commands::Symbols(args) => commands::symbols(args, &ctx).await,
        Commands::Cache(args) => commands::cache(args, &ctx).await,
        Commands::Config(args) => commands::config(args, &ctx, &config_manager).await,
    }
}
