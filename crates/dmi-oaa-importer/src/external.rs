//! ExternalImporter: drives the `oaa-community` toolkit as a black box
//!
//! The toolkit's exit code is the only signal taken from it; its output goes
//! straight to the terminal.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

use dmi_oaa::guard::{API_KEY_VAR, URL_VAR};
use dmi_oaa::{CommandSpec, OaaResult, ProcessLauncher};

use crate::importer::{ImportOutcome, ImportRequest, Importer};

pub const PROVIDER_NAME_FLAG: &str = "--provider-name";
pub const APPLICATION_NAME_FLAG: &str = "--application-name";
pub const CSV_DIR_FLAG: &str = "--csv-dir";

/// Importer that runs one toolkit entry point per request
pub struct ExternalImporter<'a> {
    launcher: &'a dyn ProcessLauncher,
    python: String,
    entry_point: PathBuf,
}

impl<'a> ExternalImporter<'a> {
    /// Create an importer running `python entry_point ...` through `launcher`
    pub fn new(
        launcher: &'a dyn ProcessLauncher,
        python: impl Into<String>,
        entry_point: impl Into<PathBuf>,
    ) -> Self {
        Self {
            launcher,
            python: python.into(),
            entry_point: entry_point.into(),
        }
    }

    pub fn entry_point(&self) -> &Path {
        &self.entry_point
    }

    /// The exact command an import request maps to
    pub fn command_for(&self, request: &ImportRequest) -> CommandSpec {
        CommandSpec::new(self.python.clone())
            .arg(self.entry_point.to_string_lossy())
            .args([PROVIDER_NAME_FLAG, request.provider_name.as_str()])
            .args([APPLICATION_NAME_FLAG, request.application_name.as_str()])
            .arg(CSV_DIR_FLAG)
            .arg(request.csv_dir.to_string_lossy())
            .env(URL_VAR, request.credentials.url.clone())
            .env(API_KEY_VAR, request.credentials.api_key.clone())
    }
}

#[async_trait]
impl<'a> Importer for ExternalImporter<'a> {
    async fn import(&self, request: &ImportRequest) -> OaaResult<ImportOutcome> {
        info!(
            "Importing {:?} as {}/{}",
            request.csv_dir, request.provider_name, request.application_name
        );
        let exit_code = self.launcher.launch(&self.command_for(request)).await?;
        Ok(ImportOutcome { exit_code })
    }
}
