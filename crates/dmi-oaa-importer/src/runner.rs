//! Guarded import runners
//!
//! A runner has two terminal states: [`RunState::Blocked`] when the
//! credential guard fails (the importer is never called) and
//! [`RunState::Executed`] once the importer has run.

use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};

use dmi_oaa::guard::BLOCKED_EXIT_CODE;
use dmi_oaa::{check_credentials, CredentialSource, GuardError, HarnessConfig, OaaError, OaaResult};

use crate::importer::{ImportOutcome, ImportRequest, Importer};

/// Exit status recorded when the importer's program cannot be started, as a shell reports it
pub const NOT_FOUND_EXIT_CODE: i32 = 127;

/// Which dataset a job imports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    Hris,
    Application,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::Hris => write!(f, "HRIS"),
            JobKind::Application => write!(f, "custom application"),
        }
    }
}

/// Everything needed to import one dataset, minus credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportJob {
    pub kind: JobKind,
    pub provider_name: String,
    pub application_name: String,
    pub csv_dir: PathBuf,
}

impl ImportJob {
    /// HRIS job against `<root>/hris_csv`
    pub fn hris(config: &HarnessConfig) -> OaaResult<Self> {
        Ok(Self {
            kind: JobKind::Hris,
            provider_name: config.hris.provider_name.clone(),
            application_name: config.hris.application_name.clone(),
            csv_dir: config.hris_csv_dir()?,
        })
    }

    /// Custom application job against `<root>/dmi_csv`
    pub fn application(config: &HarnessConfig) -> OaaResult<Self> {
        Ok(Self {
            kind: JobKind::Application,
            provider_name: config.application.provider_name.clone(),
            application_name: config.application.application_name.clone(),
            csv_dir: config.app_csv_dir()?,
        })
    }

    /// Toolkit script that handles this job
    pub fn entry_point(&self, config: &HarnessConfig) -> OaaResult<PathBuf> {
        let entry = match self.kind {
            JobKind::Hris => &config.toolkit.hris_entry,
            JobKind::Application => &config.toolkit.app_entry,
        };
        Ok(config.toolkit_dir()?.join(entry))
    }
}

/// Terminal state of one runner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    Blocked(GuardError),
    Executed(ImportOutcome),
}

impl RunState {
    /// Process exit status for this state
    pub fn exit_code(&self) -> i32 {
        match self {
            RunState::Blocked(_) => BLOCKED_EXIT_CODE,
            RunState::Executed(outcome) => outcome.exit_code,
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, RunState::Blocked(_))
    }
}

/// A job bound to the importer that carries it out
pub struct ImportRunner<'a> {
    job: ImportJob,
    importer: &'a dyn Importer,
}

impl<'a> ImportRunner<'a> {
    pub fn new(job: ImportJob, importer: &'a dyn Importer) -> Self {
        Self { job, importer }
    }

    pub fn job(&self) -> &ImportJob {
        &self.job
    }

    /// Check credentials, then delegate to the importer. No retry.
    ///
    /// A program that cannot be started counts as an executed import that
    /// exited with [`NOT_FOUND_EXIT_CODE`]; other importer errors propagate.
    pub async fn run(&self, source: &dyn CredentialSource) -> OaaResult<RunState> {
        let credentials = match check_credentials(source) {
            Ok(credentials) => credentials,
            Err(err) => {
                warn!("{} import blocked: missing {:?}", self.job.kind, err.missing());
                return Ok(RunState::Blocked(err));
            }
        };

        let request = ImportRequest {
            provider_name: self.job.provider_name.clone(),
            application_name: self.job.application_name.clone(),
            csv_dir: self.job.csv_dir.clone(),
            credentials,
        };
        let outcome = match self.importer.import(&request).await {
            Ok(outcome) => outcome,
            Err(OaaError::Spawn { program, source: err }) => {
                warn!("{} import could not start {}: {}", self.job.kind, program, err);
                ImportOutcome {
                    exit_code: NOT_FOUND_EXIT_CODE,
                }
            }
            Err(err) => return Err(err),
        };
        if outcome.success() {
            info!("{} import succeeded", self.job.kind);
        } else {
            warn!("{} import exited with {}", self.job.kind, outcome.exit_code);
        }
        Ok(RunState::Executed(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_jobs_follow_config() {
        let config = HarnessConfig::default().with_root("/srv/demo");

        let hris = ImportJob::hris(&config).unwrap();
        assert_eq!(hris.kind, JobKind::Hris);
        assert_eq!(hris.provider_name, "HRIS");
        assert_eq!(hris.application_name, "HRIS_APP");
        assert_eq!(hris.csv_dir, Path::new("/srv/demo/hris_csv"));

        let app = ImportJob::application(&config).unwrap();
        assert_eq!(app.provider_name, "DMI_APP");
        assert_eq!(app.application_name, "DMIAPP");
        assert_eq!(app.csv_dir, Path::new("/srv/demo/dmi_csv"));
    }

    #[test]
    fn test_entry_points_live_in_checkout() {
        let config = HarnessConfig::default().with_root("/srv/demo");
        let hris = ImportJob::hris(&config).unwrap();
        let app = ImportJob::application(&config).unwrap();
        assert_eq!(
            hris.entry_point(&config).unwrap(),
            Path::new("/srv/demo/oaa-community").join(&config.toolkit.hris_entry)
        );
        assert_eq!(
            app.entry_point(&config).unwrap(),
            Path::new("/srv/demo/oaa-community").join(&config.toolkit.app_entry)
        );
    }

    #[test]
    fn test_exit_codes() {
        let blocked = RunState::Blocked(GuardError::MissingCredentials { missing: vec!["VEZA_URL"] });
        assert_eq!(blocked.exit_code(), 1);
        assert!(blocked.is_blocked());

        let executed = RunState::Executed(ImportOutcome { exit_code: 7 });
        assert_eq!(executed.exit_code(), 7);
        assert!(!executed.is_blocked());
    }
}
