//! dmi-oaa-importer: guarded imports into the authorization-graph service
//!
//! - **`Importer`**: the capability of importing one CSV directory.
//!   `ExternalImporter` implements it by running the `oaa-community` toolkit.
//! - **`ImportRunner`**: one guarded import (HRIS or custom application).
//! - **`Orchestrator`**: the HRIS runner followed by the application runner.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use dmi_oaa::{HarnessConfig, ProcessEnv, SystemLauncher};
//! use dmi_oaa_importer::{ExternalImporter, ImportJob, ImportRunner};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = HarnessConfig::default();
//!     let job = ImportJob::hris(&config).unwrap();
//!     let importer = ExternalImporter::new(
//!         &SystemLauncher,
//!         config.toolkit.python.clone(),
//!         job.entry_point(&config).unwrap(),
//!     );
//!
//!     let state = ImportRunner::new(job, &importer).run(&ProcessEnv).await.unwrap();
//!     std::process::exit(state.exit_code());
//! }
//! ```

pub mod external;
pub mod importer;
pub mod orchestrator;
pub mod runner;

pub use external::ExternalImporter;
pub use importer::{ImportOutcome, ImportRequest, Importer};
pub use orchestrator::{ContinuationPolicy, OrchestrationReport, Orchestrator, StepReport};
pub use runner::{ImportJob, ImportRunner, JobKind, RunState, NOT_FOUND_EXIT_CODE};
