//! Cache command - inspect the local artifact and symbol cache

use super::CommandContext;
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::error::CrashResult;
use crate::session::Session;
use console::style;
use serde::Serialize;

/// One cached job
#[derive(Debug, Serialize)]
struct CachedJob {
    project: String,
    job: String,
    pipeline: Option<String>,
    version: Option<String>,
    artifacts: bool,
}

/// Everything the cache holds
#[derive(Debug, Serialize)]
struct CacheListing {
    jobs: Vec<CachedJob>,
    symbols: Vec<String>,
}

/// Execute the cache command
pub async fn execute(args: CacheArgs, ctx: &CommandContext) -> CrashResult<()> {
    match args.action {
        CacheAction::List { format } => list_cache(&ctx.session()?, format),
        CacheAction::Path => {
            println!("{}", ctx.session()?.env().display());
            Ok(())
        }
    }
}

fn list_cache(session: &Session, format: OutputFormat) -> CrashResult<()> {
    let listing = collect(session)?;

    match format {
        OutputFormat::Table => print_table(&listing),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&listing)?),
    }
    Ok(())
}

fn collect(session: &Session) -> CrashResult<CacheListing> {
    let store = session.artifact_store();
    let mut jobs = Vec::new();
    for (project, job) in store.list()? {
        let Some(mut artifacts) = store.get(&project, &job) else {
            continue;
        };
        jobs.push(CachedJob {
            pipeline: artifacts.pipeline()?,
            version: artifacts.version()?,
            artifacts: artifacts.get().is_some(),
            project,
            job,
        });
    }

    Ok(CacheListing {
        jobs,
        symbols: session.symbol_store().versions()?,
    })
}

fn print_table(listing: &CacheListing) {
    if listing.jobs.is_empty() && listing.symbols.is_empty() {
        println!("Cache is empty.");
        return;
    }

    println!(
        "{:<28} {:<12} {:<12} {:<20} {:<9}",
        "PROJECT", "JOB", "PIPELINE", "VERSION", "ARTIFACTS"
    );
    println!("{}", "-".repeat(84));
    for job in &listing.jobs {
        let artifacts = if job.artifacts {
            style("yes").green().to_string()
        } else {
            style("no").dim().to_string()
        };
        println!(
            "{:<28} {:<12} {:<12} {:<20} {:<9}",
            job.project,
            job.job,
            job.pipeline.as_deref().unwrap_or("-"),
            job.version.as_deref().unwrap_or("-"),
            artifacts
        );
    }

    println!();
    println!("Symbols cached for {} version(s):", listing.symbols.len());
    for version in &listing.symbols {
        println!("  {}", version);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn collect_reports_jobs_and_versions() {
        let temp = TempDir::new().unwrap();
        let session = Session::new(temp.path());

        let tree = temp.path().join("tree");
        fs::create_dir_all(&tree).unwrap();
        fs::write(tree.join("agent.dmp"), b"MDMP").unwrap();

        let store = session.artifact_store();
        let mut with_tree = store.add("DataDog/datadog-agent", "11", Some(&tree)).unwrap();
        with_tree.set_version("agent-7.50.0").unwrap();
        store.add("DataDog/datadog-agent", "12", None).unwrap();
        session.symbol_store().add("agent-7.50.0", &tree).unwrap();

        let listing = collect(&session).unwrap();
        assert_eq!(listing.jobs.len(), 2);
        assert_eq!(listing.jobs[0].project, "DataDog/datadog-agent");
        assert_eq!(listing.jobs[0].version.as_deref(), Some("agent-7.50.0"));
        assert!(listing.jobs[0].artifacts);
        assert!(!listing.jobs[1].artifacts);
        assert_eq!(listing.symbols, vec!["agent-7.50.0"]);
    }

    #[test]
    fn collect_empty_env() {
        let temp = TempDir::new().unwrap();
        let listing = collect(&Session::new(temp.path())).unwrap();
        assert!(listing.jobs.is_empty());
        assert!(listing.symbols.is_empty());
    }
}
