//! Config command - show or edit configuration

use super::CommandContext;
use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{CrashError, CrashResult};
use crate::ui;
use std::path::PathBuf;

/// Keys accepted by `config set`
const KEYS: &[&str] = &[
    "general.env_dir",
    "general.log_format",
    "gitlab.url",
    "gitlab.project",
    "gitlab.token_env",
    "resolve.package_job",
    "symbols.stable_url",
    "symbols.beta_url",
    "debuggers.windbg",
    "debuggers.delve",
];

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    ctx: &CommandContext,
    manager: &ConfigManager,
) -> CrashResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(&ctx.config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(ctx, manager, force).await?,
        Some(ConfigAction::Set { key, value }) => {
            let mut config = ctx.config.clone();
            set_value(&mut config, &key, &value)?;
            manager.save(&config).await?;
            ui::step_ok(&ctx.ui, &format!("Set {} = {}", key, value));
        }
    }

    Ok(())
}

fn show_config(config: &Config) -> CrashResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(ctx: &CommandContext, manager: &ConfigManager, force: bool) -> CrashResult<()> {
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn(
            &ctx.ui,
            &format!("Config already exists at {}", path.display()),
        );
        ui::remark(&ctx.ui, "Use --force to overwrite");
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    ui::step_ok(
        &ctx.ui,
        &format!("Configuration initialized at {}", path.display()),
    );
    Ok(())
}

/// Apply a dot-separated `key` to `config`
///
/// Debugger commands are comma-separated; empty items are kept so that
/// `cmd.exe,/c,start,` still passes the empty window title to `start`.
fn set_value(config: &mut Config, key: &str, value: &str) -> CrashResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "env_dir"] => config.general.env_dir = Some(PathBuf::from(value)),
        ["general", "log_format"] => match value {
            "text" | "json" => config.general.log_format = value.to_string(),
            _ => {
                return Err(CrashError::User(format!(
                    "Invalid log format: {}. Use text or json",
                    value
                )))
            }
        },

        ["gitlab", "url"] => config.gitlab.url = value.trim_end_matches('/').to_string(),
        ["gitlab", "project"] => config.gitlab.project = value.to_string(),
        ["gitlab", "token_env"] => config.gitlab.token_env = value.to_string(),

        ["resolve", "package_job"] => config.resolve.package_job = value.to_string(),

        ["symbols", "stable_url"] => config.symbols.stable_url = value.to_string(),
        ["symbols", "beta_url"] => config.symbols.beta_url = value.to_string(),

        ["debuggers", "windbg"] => config.debuggers.windbg = command_list(value)?,
        ["debuggers", "delve"] => config.debuggers.delve = command_list(value)?,

        _ => {
            return Err(CrashError::User(format!(
                "Unknown config key: {}. Valid keys: {}",
                key,
                KEYS.join(", ")
            )))
        }
    }

    Ok(())
}

fn command_list(value: &str) -> CrashResult<Vec<String>> {
    let items: Vec<String> = value.split(',').map(|s| s.trim().to_string()).collect();
    if items.first().map_or(true, |program| program.is_empty()) {
        return Err(CrashError::User(
            "Debugger command must start with a program".to_string(),
        ));
    }
    Ok(items)
}
