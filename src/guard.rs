//! Credential precondition shared by every import entry point
//!
//! Each runner and the orchestrator call [`check_credentials`] before doing
//! anything else. A failed check is terminal for that entry point: the caller
//! prints [`MISSING_CREDENTIALS_MESSAGE`] and exits with status 1.

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Environment variable holding the service endpoint
pub const URL_VAR: &str = "VEZA_URL";

/// Environment variable holding the API key
pub const API_KEY_VAR: &str = "VEZA_API_KEY";

/// Fixed message printed when either variable is absent
pub const MISSING_CREDENTIALS_MESSAGE: &str = "Unable to locate all environment variables";

/// Exit status used when the guard blocks an entry point
pub const BLOCKED_EXIT_CODE: i32 = 1;

/// The single recognized precondition failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    #[error("Unable to locate all environment variables")]
    MissingCredentials {
        /// Missing variables, in declaration order
        missing: Vec<&'static str>,
    },
}

impl GuardError {
    /// Names of the variables that were unset or empty
    pub fn missing(&self) -> &[&'static str] {
        match self {
            GuardError::MissingCredentials { missing } => missing,
        }
    }
}

/// Where credential values are read from
pub trait CredentialSource {
    fn lookup(&self, name: &str) -> Option<String>;
}

/// Reads from the current process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl CredentialSource for ProcessEnv {
    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl CredentialSource for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Service credentials that passed the guard
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub url: String,
    pub api_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Verify that both service variables are present and non-empty.
///
/// Whitespace-only values are treated as empty.
pub fn check_credentials(source: &dyn CredentialSource) -> Result<Credentials, GuardError> {
    let read = |name: &str| source.lookup(name).filter(|v| !v.trim().is_empty());

    let url = read(URL_VAR);
    let api_key = read(API_KEY_VAR);

    match (url, api_key) {
        (Some(url), Some(api_key)) => Ok(Credentials { url, api_key }),
        (url, api_key) => {
            let mut missing = Vec::new();
            if url.is_none() {
                missing.push(URL_VAR);
            }
            if api_key.is_none() {
                missing.push(API_KEY_VAR);
            }
            Err(GuardError::MissingCredentials { missing })
        }
    }
}
