//! External command launching
//!
//! Everything the harness runs outside its own process (git, pip, the import
//! toolkit) goes through [`ProcessLauncher`], so callers can be exercised
//! without spawning anything.

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{OaaError, OaaResult};

/// A fully described external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Extra environment for the child, on top of the inherited one
    pub envs: Vec<(String, String)>,
    pub current_dir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Value following `flag` in the argument list, if any
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

/// Renders the command line without environment values, which may hold secrets
impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg.replace('\'', "'\\''"))?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Runs external commands and reports their exit code
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Run `spec` to completion, returning the child's exit code
    async fn launch(&self, spec: &CommandSpec) -> OaaResult<i32>;
}

/// Launcher backed by real child processes with inherited stdio
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

#[async_trait]
impl ProcessLauncher for SystemLauncher {
    async fn launch(&self, spec: &CommandSpec) -> OaaResult<i32> {
        info!("Running {}", spec.program);
        debug!("Command line: {}", spec);

        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .envs(spec.envs.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(dir) = &spec.current_dir {
            command.current_dir(dir);
        }

        let status = command.status().await.map_err(|source| OaaError::Spawn {
            program: spec.program.clone(),
            source,
        })?;

        let code = exit_code(status);
        debug!("{} exited with {}", spec.program, code);
        Ok(code)
    }
}

/// Shell-style exit code: signal-terminated children map to 128 + signal
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}
