//! Debug command - resolve dump and symbols, then launch the debuggers

use super::{blocking, CommandContext};
use crate::archive::find_dump_files;
use crate::cli::args::DebugArgs;
use crate::debugger::DebuggerCommand;
use crate::error::{CrashError, CrashResult};
use crate::resolve::Resolver;
use crate::session::Session;
use crate::ui;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Execute the debug command
pub async fn execute(args: DebugArgs, ctx: &CommandContext) -> CrashResult<()> {
    let session = ctx.session_with_project()?;
    ui::intro(&ctx.ui, &format!("crash-analyzer: debug job {}", args.job_id));
    ui::step_info(
        &ctx.ui,
        &format!("Resolving artifacts and symbols of job {}", args.job_id),
    );

    let job_id = args.job_id.clone();
    let package_job = ctx.package_job.clone();
    let (mut session, dumps, symbol_dir) = blocking(move || {
        let resolver = Resolver::new(&session, &package_job);
        let mut artifacts = resolver.get_or_fetch_artifacts(&job_id)?;
        let tree = artifacts
            .get()
            .ok_or_else(|| CrashError::NoArtifacts { job: job_id.clone() })?;
        let dumps = find_dump_files(&tree);
        let symbol_dir = resolver.symbols_for_job(&job_id)?;
        Ok((session, dumps, symbol_dir))
    })
    .await?;

    let dump = match args.dump {
        Some(path) => {
            if !path.is_file() {
                return Err(CrashError::User(format!(
                    "Dump file not found: {}",
                    path.display()
                )));
            }
            path
        }
        None if dumps.is_empty() => return Err(CrashError::NoDumpFiles(args.job_id)),
        None => ui::select_path(&ctx.ui, "Select a dump file", &dumps).await?,
    };
    session.select_dump(dump);

    let symbols = session.load_symbols(&symbol_dir)?.to_vec();
    let symbol = match args.symbol {
        Some(path) => matching_symbol(&symbols, &path),
        None => ui::select_path(&ctx.ui, "Select a symbol file", &symbols).await?,
    };
    session.select_symbol(symbol)?;

    launch(ctx, &session, args.no_launch).await
}

/// The loaded symbol file `requested` refers to, or `requested` itself
/// when it matches none of them
fn matching_symbol(symbols: &[PathBuf], requested: &Path) -> PathBuf {
    let wanted = requested.canonicalize().ok();
    symbols
        .iter()
        .find(|candidate| {
            candidate.as_path() == requested
                || (wanted.is_some() && candidate.canonicalize().ok() == wanted)
        })
        .cloned()
        .unwrap_or_else(|| requested.to_path_buf())
}

async fn launch(ctx: &CommandContext, session: &Session, no_launch: bool) -> CrashResult<()> {
    let (Some(dump), Some(symbol)) = (session.active_dump(), session.active_symbol()) else {
        return Err(CrashError::Internal(
            "dump and symbol must be selected before launching".to_string(),
        ));
    };

    let commands = [
        ("WinDbg", DebuggerCommand::windbg(&ctx.config.debuggers, dump)?),
        (
            "Delve",
            DebuggerCommand::delve(&ctx.config.debuggers, symbol, dump)?,
        ),
    ];

    ui::section(&ctx.ui, "Debugger commands:");
    for (name, command) in &commands {
        ui::key_value(&ctx.ui, name, &command.to_string());
    }

    if no_launch {
        ui::outro_success(&ctx.ui, "Debugger commands ready");
        return Ok(());
    }

    for (name, command) in &commands {
        debug!("Launching {}", name);
        let code = command.run().await?;
        if code != 0 {
            ui::step_warn(&ctx.ui, &format!("{} exited with code {}", name, code));
        }
    }

    ui::outro_success(&ctx.ui, "Debugging session finished");
    Ok(())
}
