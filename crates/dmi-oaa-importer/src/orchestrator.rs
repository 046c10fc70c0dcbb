//! Orchestrator: HRIS import, then custom application import
//!
//! The orchestrator checks credentials itself before printing anything, and
//! each runner checks them again. By default the second import runs even if
//! the first exited non-zero; [`ContinuationPolicy::HaltOnFailure`] stops
//! after the first failing step instead.

use tracing::{info, warn};

use dmi_oaa::guard::BLOCKED_EXIT_CODE;
use dmi_oaa::{check_credentials, CredentialSource, GuardError, OaaResult};

use crate::runner::{ImportRunner, JobKind, RunState};

pub const START_BANNER: &str = "=== Dunder Mifflin OAA import: starting ===";
pub const END_BANNER: &str = "=== Dunder Mifflin OAA import: finished ===";

/// What to do after a step exits non-zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContinuationPolicy {
    /// Run every step regardless
    #[default]
    Continue,
    /// Skip the remaining steps
    HaltOnFailure,
}

/// One step that ran (or was blocked by its own guard)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub kind: JobKind,
    pub state: RunState,
}

/// Outcome of an orchestrated run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrchestrationReport {
    /// Set when the orchestrator's own guard stopped the run
    pub blocked: Option<GuardError>,
    /// Steps in execution order
    pub steps: Vec<StepReport>,
}

impl OrchestrationReport {
    /// Exit status of the last step executed (1 when blocked up front)
    pub fn exit_code(&self) -> i32 {
        if self.blocked.is_some() {
            return BLOCKED_EXIT_CODE;
        }
        // An unblocked run always records its first step; an empty report
        // means nothing was attempted.
        match self.steps.last() {
            Some(step) => step.state.exit_code(),
            None => 0,
        }
    }
}

/// Runs import steps in order
pub struct Orchestrator<'a> {
    runners: Vec<ImportRunner<'a>>,
    policy: ContinuationPolicy,
}

impl<'a> Orchestrator<'a> {
    /// Orchestrate `hris` followed by `application`
    pub fn new(hris: ImportRunner<'a>, application: ImportRunner<'a>) -> Self {
        Self {
            runners: vec![hris, application],
            policy: ContinuationPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ContinuationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn run(&self, source: &dyn CredentialSource) -> OaaResult<OrchestrationReport> {
        if let Err(err) = check_credentials(source) {
            warn!("Orchestration blocked: missing {:?}", err.missing());
            return Ok(OrchestrationReport {
                blocked: Some(err),
                steps: Vec::new(),
            });
        }

        println!("{}", START_BANNER);

        let mut report = OrchestrationReport::default();
        for runner in &self.runners {
            let state = runner.run(source).await?;
            let failed = state.exit_code() != 0;
            report.steps.push(StepReport {
                kind: runner.job().kind,
                state,
            });

            if failed && self.policy == ContinuationPolicy::HaltOnFailure {
                warn!("{} import failed, halting", runner.job().kind);
                break;
            }
        }

        println!("{}", END_BANNER);
        info!("Orchestration finished with exit code {}", report.exit_code());
        Ok(report)
    }
}
