//! Importer trait: the capability of pushing one CSV directory to the service

use async_trait::async_trait;
use std::path::PathBuf;

use dmi_oaa::{Credentials, OaaResult};

/// One import: which labels to use, where the CSVs live, and who is uploading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    /// Provider namespace on the service
    pub provider_name: String,
    /// Application namespace within the provider
    pub application_name: String,
    /// Absolute path of the CSV directory
    pub csv_dir: PathBuf,
    pub credentials: Credentials,
}

/// Result of an import that actually ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    pub exit_code: i32,
}

impl ImportOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Pushes a CSV directory into the authorization-graph service.
///
/// Implemented by:
/// - `ExternalImporter`: runs the `oaa-community` toolkit as a child process
#[async_trait]
pub trait Importer: Send + Sync {
    /// Run one import to completion
    async fn import(&self, request: &ImportRequest) -> OaaResult<ImportOutcome>;
}
