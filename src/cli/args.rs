//! CLI argument definitions using clap derive

use clap::{ArgAction, ArgGroup, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// crash-analyzer - debug crash dumps from CI jobs
///
/// Downloads and caches CI job artifacts, finds the debug symbols of the
/// build a job tested, and hands dump and symbols to the debuggers.
#[derive(Parser, Debug)]
#[command(name = "crash-analyzer")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "CRASH_ANALYZER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Cache environment directory
    #[arg(long = "env", global = true, env = "CRASH_ANALYZER_HOME")]
    pub env_dir: Option<PathBuf>,

    /// Use a throwaway cache environment, deleted on exit (overrides --env)
    #[arg(long, global = true)]
    pub temp_env: bool,

    /// Name of the pipeline job that builds the debug symbols
    #[arg(long, global = true)]
    pub package_job: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download (or reuse) a job's artifacts and list its crash dumps
    Dump(DumpArgs),

    /// Resolve dump and symbols for a job and launch the debuggers
    Debug(DebugArgs),

    /// Fetch debug symbols for a job or a released version
    Symbols(SymbolsArgs),

    /// Inspect the local cache
    Cache(CacheArgs),

    /// Show or edit configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

/// Arguments for the dump command
#[derive(Parser, Debug)]
pub struct DumpArgs {
    /// CI job that produced the dump
    pub job_id: String,

    /// Also resolve the job's debug symbols
    #[arg(long)]
    pub with_symbols: bool,
}

/// Arguments for the debug command
#[derive(Parser, Debug)]
pub struct DebugArgs {
    /// CI job that produced the dump
    pub job_id: String,

    /// Dump file to use instead of prompting
    #[arg(long)]
    pub dump: Option<PathBuf>,

    /// Symbol file to use instead of prompting
    #[arg(long)]
    pub symbol: Option<PathBuf>,

    /// Print the debugger commands without running them
    #[arg(long)]
    pub no_launch: bool,
}

/// Arguments for the symbols command
#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["job", "release"])))]
pub struct SymbolsArgs {
    /// Resolve symbols through the job's pipeline package job
    #[arg(short, long, value_name = "JOB_ID")]
    pub job: Option<String>,

    /// Download symbols published for a release (e.g. 7.50.0, 7.51.0-rc.2)
    #[arg(short, long, value_name = "VERSION")]
    pub release: Option<String>,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List cached jobs and symbol versions
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Print the cache environment directory
    Path,
}

/// Output format for list commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., gitlab.project)
        key: String,
        /// Value to set
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_dump() {
        let cli = Cli::parse_from(["crash-analyzer", "dump", "123", "--with-symbols"]);
        match cli.command {
            Commands::Dump(args) => {
                assert_eq!(args.job_id, "123");
                assert!(args.with_symbols);
            }
            _ => panic!("expected Dump command"),
        }
    }

    #[test]
    fn cli_parses_debug_overrides() {
        let cli = Cli::parse_from([
            "crash-analyzer",
            "debug",
            "123",
            "--dump",
            "/tmp/agent.dmp",
            "--no-launch",
        ]);
        match cli.command {
            Commands::Debug(args) => {
                assert_eq!(args.dump, Some(PathBuf::from("/tmp/agent.dmp")));
                assert!(args.symbol.is_none());
                assert!(args.no_launch);
            }
            _ => panic!("expected Debug command"),
        }
    }

    #[test]
    fn cli_symbols_requires_source() {
        assert!(Cli::try_parse_from(["crash-analyzer", "symbols"]).is_err());
        assert!(Cli::try_parse_from([
            "crash-analyzer",
            "symbols",
            "--job",
            "1",
            "--release",
            "7.50.0"
        ])
        .is_err());

        let cli = Cli::parse_from(["crash-analyzer", "symbols", "--release", "7.50.0"]);
        match cli.command {
            Commands::Symbols(args) => {
                assert_eq!(args.release.as_deref(), Some("7.50.0"));
                assert!(args.job.is_none());
            }
            _ => panic!("expected Symbols command"),
        }
    }

    #[test]
    fn cli_global_flags() {
        let cli = Cli::parse_from([
            "crash-analyzer",
            "--env",
            "/tmp/env",
            "--package-job",
            "windows_msi_x64",
            "dump",
            "1",
        ]);
        assert_eq!(cli.env_dir, Some(PathBuf::from("/tmp/env")));
        assert_eq!(cli.package_job.as_deref(), Some("windows_msi_x64"));
        assert!(!cli.temp_env);

        let cli = Cli::parse_from([
            "crash-analyzer",
            "symbols",
            "--release",
            "7.50.0",
            "--temp-env",
        ]);
        assert!(cli.temp_env);
    }

    #[test]
    fn cli_verbose_levels() {
        let cli = Cli::parse_from(["crash-analyzer", "cache", "path"]);
        assert_eq!(cli.verbose, 0);

        let cli = Cli::parse_from(["crash-analyzer", "-vv", "cache", "path"]);
        assert_eq!(cli.verbose, 2);
    }
}
