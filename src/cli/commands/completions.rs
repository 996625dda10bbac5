//! Completions command - print shell completion scripts

use crate::cli::args::Cli;
use crate::error::CrashResult;
use clap::CommandFactory;
use clap_complete::{generate, Shell};
use std::io;

/// Execute the completions command
pub fn execute(shell: Shell) -> CrashResult<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    generate(shell, &mut command, name, &mut io::stdout());
    Ok(())
}
