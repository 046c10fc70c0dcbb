//! Runner scripts emitted at the harness root
//!
//! Each script repeats the credential guard in shell form so it fails fast
//! even when invoked without the CLI on hand, then execs the CLI.

use std::path::{Path, PathBuf};

use crate::error::OaaResult;
use crate::guard::{API_KEY_VAR, BLOCKED_EXIT_CODE, MISSING_CREDENTIALS_MESSAGE, URL_VAR};

/// A runner script to write at the harness root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerScript {
    pub file_name: &'static str,
    pub description: &'static str,
    /// CLI arguments after the program name
    pub subcommand: &'static [&'static str],
}

pub const HRIS_SCRIPT: RunnerScript = RunnerScript {
    file_name: "run_hris_import.sh",
    description: "Import the HRIS dataset",
    subcommand: &["import", "hris"],
};

pub const APP_SCRIPT: RunnerScript = RunnerScript {
    file_name: "run_app_import.sh",
    description: "Import the custom application dataset",
    subcommand: &["import", "app"],
};

pub const ALL_SCRIPT: RunnerScript = RunnerScript {
    file_name: "run_all_imports.sh",
    description: "Import the HRIS dataset, then the custom application dataset",
    subcommand: &["import", "all"],
};

/// Every script, in emission order
pub const RUNNER_SCRIPTS: [RunnerScript; 3] = [HRIS_SCRIPT, APP_SCRIPT, ALL_SCRIPT];

impl RunnerScript {
    /// Full script text for the given CLI program.
    ///
    /// `config` is forwarded as `--config` so the script imports from the same
    /// layout setup wrote.
    pub fn render(&self, cli_program: &str, config: Option<&Path>) -> String {
        let program = match config {
            Some(path) => format!(
                "{} --config {}",
                cli_program,
                shell_quote(&path.to_string_lossy())
            ),
            None => cli_program.to_string(),
        };
        format!(
            "#!/usr/bin/env bash\n\
             # {description}\n\
             if [ -z \"${url}\" ] || [ -z \"${key}\" ]; then\n\
             \x20 echo \"{message}\" >&2\n\
             \x20 exit {code}\n\
             fi\n\
             exec {program} {args} \"$@\"\n",
            description = self.description,
            url = URL_VAR,
            key = API_KEY_VAR,
            message = MISSING_CREDENTIALS_MESSAGE,
            code = BLOCKED_EXIT_CODE,
            program = program,
            args = self.subcommand.join(" "),
        )
    }

    /// Write the script under `root` and mark it executable
    pub fn write(&self, root: &Path, cli_program: &str, config: Option<&Path>) -> OaaResult<PathBuf> {
        let path = root.join(self.file_name);
        std::fs::write(&path, self.render(cli_program, config))?;
        make_executable(&path)?;
        Ok(path)
    }
}

/// Single-quote `value` for a POSIX shell
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

#[cfg(unix)]
fn make_executable(path: &Path) -> OaaResult<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> OaaResult<()> {
    Ok(())
}
