//! Dump command - fetch a job's artifacts and list its crash dumps

use super::{blocking, CommandContext};
use crate::archive::{find_dump_files, find_symbol_files};
use crate::cli::args::DumpArgs;
use crate::error::{CrashError, CrashResult};
use crate::resolve::Resolver;
use crate::ui;
use std::path::Path;

/// Execute the dump command
pub async fn execute(args: DumpArgs, ctx: &CommandContext) -> CrashResult<()> {
    let session = ctx.session_with_project()?;
    ui::intro(&ctx.ui, &format!("crash-analyzer: job {}", args.job_id));
    ui::step_info(
        &ctx.ui,
        &format!("Fetching artifacts of job {}", args.job_id),
    );

    let job_id = args.job_id.clone();
    let package_job = ctx.package_job.clone();
    let with_symbols = args.with_symbols;
    let (dumps, symbols) = blocking(move || {
        let resolver = Resolver::new(&session, &package_job);
        let mut artifacts = resolver.get_or_fetch_artifacts(&job_id)?;
        let tree = artifacts
            .get()
            .ok_or_else(|| CrashError::NoArtifacts { job: job_id.clone() })?;

        let dumps = find_dump_files(&tree);
        if dumps.is_empty() {
            return Err(CrashError::NoDumpFiles(job_id));
        }

        let symbols = if with_symbols {
            Some(resolver.symbols_for_job(&job_id))
        } else {
            None
        };
        Ok((dumps, symbols))
    })
    .await?;

    ui::path_list(&ctx.ui, "Dump files:", &dumps);

    match symbols {
        None => {}
        Some(Ok(dir)) => list_symbols(ctx, &dir)?,
        Some(Err(e)) if e.is_not_found() => {
            ui::step_warn(&ctx.ui, &format!("Symbols unavailable: {}", e));
            if let Some(hint) = e.hint() {
                ui::remark(&ctx.ui, hint);
            }
        }
        Some(Err(e)) => return Err(e),
    }

    ui::outro_success(&ctx.ui, &format!("{} dump file(s) ready", dumps.len()));
    Ok(())
}

fn list_symbols(ctx: &CommandContext, dir: &Path) -> CrashResult<()> {
    let files = find_symbol_files(dir);
    if files.is_empty() {
        return Err(CrashError::NoSymbolFiles(dir.to_path_buf()));
    }
    ui::path_list(&ctx.ui, "Symbol files:", &files);
    Ok(())
}
