//! Dunder Mifflin OAA import harness
//!
//! Prepares and drives a demo import of a fictitious company's HR and
//! application-access data into an authorization-graph service through the
//! external `oaa-community` toolkit.
//!
//! # Components
//!
//! - [`dataset`]: the fixed HRIS and custom application snapshots and their
//!   CSV rendering.
//! - [`bootstrap`]: writes `hris_csv/` and `dmi_csv/`, clones the toolkit,
//!   installs its requirements and emits the runner scripts.
//! - [`guard`]: the credential precondition every import entry point checks.
//! - [`process`]: the [`ProcessLauncher`] seam used for every external command.
//! - [`config`]: [`HarnessConfig`], loaded from YAML or defaulted.
//!
//! Import runners and the orchestrator live in the `dmi-oaa-importer` crate.
//!
//! ## Example Usage
//!
//! ```rust
//! use dmi_oaa::dataset::{unmatched_identities, ApplicationDataset, Dataset, HrisDataset};
//!
//! let hris = HrisDataset::sample().unwrap();
//! let app = ApplicationDataset::sample().unwrap();
//!
//! // Every application user resolves to an employee
//! assert!(unmatched_identities(&hris, &app).is_empty());
//!
//! let tables = hris.tables();
//! assert_eq!(tables[0].file_name, "departments.csv");
//! ```

#![warn(clippy::all)]

pub mod bootstrap;
pub mod config;
pub mod dataset;
pub mod error;
pub mod guard;
pub mod process;

// Re-export main types for convenience
pub use bootstrap::{Bootstrap, BootstrapOptions, BootstrapReport};
pub use config::{HarnessConfig, ImportLabels, ToolkitConfig};
pub use error::{OaaError, OaaResult};
pub use guard::{
    check_credentials, CredentialSource, Credentials, GuardError, ProcessEnv,
    MISSING_CREDENTIALS_MESSAGE,
};
pub use process::{CommandSpec, ProcessLauncher, SystemLauncher};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
