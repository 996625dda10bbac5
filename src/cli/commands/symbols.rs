//! Symbols command - fetch debug symbols for a job or a release

use super::{blocking, CommandContext};
use crate::archive::find_symbol_files;
use crate::cli::args::SymbolsArgs;
use crate::error::{CrashError, CrashResult};
use crate::resolve::{symbols_for_version, Resolver};
use crate::ui::{self, TaskSpinner};

/// Execute the symbols command
pub async fn execute(args: SymbolsArgs, ctx: &CommandContext) -> CrashResult<()> {
    let dir = match (args.job, args.release) {
        (Some(job_id), _) => {
            let session = ctx.session_with_project()?;
            ui::step_info(&ctx.ui, &format!("Resolving symbols of job {}", job_id));
            let package_job = ctx.package_job.clone();
            blocking(move || Resolver::new(&session, &package_job).symbols_for_job(&job_id))
                .await?
        }
        (None, Some(version)) => {
            let session = ctx.session()?;
            let mut spinner = TaskSpinner::new(&ctx.ui);
            spinner.start(&format!("Fetching symbols for release {}...", version));
            let config = ctx.config.symbols.clone();
            let label = version.clone();
            match blocking(move || symbols_for_version(&session, &config, &version)).await {
                Ok(dir) => {
                    spinner.stop(&format!("Symbols for {} cached", label));
                    dir
                }
                Err(e) => {
                    spinner.stop_error(&format!("No symbols for {}", label));
                    return Err(e);
                }
            }
        }
        (None, None) => {
            return Err(CrashError::User(
                "Pass --job or --release to choose the symbols".to_string(),
            ))
        }
    };

    let files = find_symbol_files(&dir);
    if files.is_empty() {
        return Err(CrashError::NoSymbolFiles(dir));
    }
    ui::path_list(&ctx.ui, "Symbol files:", &files);
    println!("{}", dir.display());
    Ok(())
}
