//! Hand-off to external debuggers

use crate::config::schema::DebuggersConfig;
use crate::error::{CrashError, CrashResult};
use std::fmt;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// A fully assembled debugger command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebuggerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl DebuggerCommand {
    fn from_template(template: &[String], extra: &[&Path]) -> CrashResult<Self> {
        let (program, args) = template
            .split_first()
            .ok_or_else(|| CrashError::User("debugger command is empty".to_string()))?;
        let mut args = args.to_vec();
        args.extend(extra.iter().map(|p| p.display().to_string()));
        Ok(Self {
            program: program.clone(),
            args,
        })
    }

    /// WinDbg opening `dump`
    pub fn windbg(config: &DebuggersConfig, dump: &Path) -> CrashResult<Self> {
        Self::from_template(&config.windbg, &[dump])
    }

    /// Delve loading `dump` against the executable symbols in `symbol`
    pub fn delve(config: &DebuggersConfig, symbol: &Path, dump: &Path) -> CrashResult<Self> {
        Self::from_template(&config.delve, &[symbol, dump])
    }

    /// Run the command attached to the terminal and return its exit code
    pub async fn run(&self) -> CrashResult<i32> {
        debug!("Executing: {}", self);
        let status = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| CrashError::command_failed(self.to_string(), e))?;

        Ok(status.code().unwrap_or(-1))
    }
}

impl fmt::Display for DebuggerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(' ') {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windbg_command() {
        let config = DebuggersConfig::default();
        let cmd = DebuggerCommand::windbg(&config, Path::new("/cache/agent.dmp")).unwrap();
        assert_eq!(cmd.program, "cmd.exe");
        assert_eq!(cmd.args, vec!["/c", "start", "", "/cache/agent.dmp"]);
        assert_eq!(cmd.to_string(), "cmd.exe /c start \"\" /cache/agent.dmp");
    }

    #[test]
    fn delve_command() {
        let config = DebuggersConfig::default();
        let cmd = DebuggerCommand::delve(
            &config,
            Path::new("/syms/agent.exe.debug"),
            Path::new("/my dumps/agent.dmp"),
        )
        .unwrap();
        assert_eq!(
            cmd.to_string(),
            "dlv.exe core /syms/agent.exe.debug \"/my dumps/agent.dmp\""
        );
    }

    #[test]
    fn empty_template_rejected() {
        let config = DebuggersConfig {
            windbg: vec![],
            ..DebuggersConfig::default()
        };
        assert!(DebuggerCommand::windbg(&config, Path::new("a.dmp")).is_err());
    }

    #[tokio::test]
    async fn missing_program_is_command_failure() {
        let cmd = DebuggerCommand {
            program: "crash-analyzer-no-such-debugger".to_string(),
            args: vec![],
        };
        let err = cmd.run().await.unwrap_err();
        assert!(matches!(err, CrashError::CommandFailed { .. }));
    }
}
