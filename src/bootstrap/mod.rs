//! Environment setup
//!
//! Materializes both sample datasets, fetches the import toolkit and installs
//! its dependencies, then emits the runner scripts. Steps run in that order and
//! nothing is rolled back when a later step fails.

pub mod scripts;

pub use scripts::{RunnerScript, RUNNER_SCRIPTS};

use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::HarnessConfig;
use crate::dataset::{unmatched_identities, ApplicationDataset, Dataset, HrisDataset};
use crate::error::{OaaError, OaaResult};
use crate::process::{CommandSpec, ProcessLauncher};

/// Which optional setup steps to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapOptions {
    /// Clone the toolkit and install its requirements
    pub fetch_toolkit: bool,
    /// Write the runner scripts
    pub emit_scripts: bool,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            fetch_toolkit: true,
            emit_scripts: true,
        }
    }
}

/// What a bootstrap run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub dataset_files: Vec<PathBuf>,
    /// False when the checkout already existed or fetching was disabled
    pub cloned: bool,
    pub installed: bool,
    pub scripts: Vec<PathBuf>,
    /// Application user identities with no employee counterpart
    pub unmatched_identities: Vec<String>,
}

/// Setup driver
pub struct Bootstrap<'a> {
    config: &'a HarnessConfig,
    launcher: &'a dyn ProcessLauncher,
}

impl<'a> Bootstrap<'a> {
    pub fn new(config: &'a HarnessConfig, launcher: &'a dyn ProcessLauncher) -> Self {
        Self { config, launcher }
    }

    pub async fn run(&self, options: BootstrapOptions) -> OaaResult<BootstrapReport> {
        let mut report = self.materialize_datasets()?;

        if options.fetch_toolkit {
            report.cloned = self.fetch_toolkit().await?;
            self.install_requirements().await?;
            report.installed = true;
        } else {
            info!("Skipping toolkit fetch");
        }

        if options.emit_scripts {
            report.scripts = self.emit_scripts()?;
        }

        info!(
            "Bootstrap complete: {} dataset files, {} scripts",
            report.dataset_files.len(),
            report.scripts.len()
        );
        Ok(report)
    }

    /// Write both datasets into their directories
    pub fn materialize_datasets(&self) -> OaaResult<BootstrapReport> {
        let hris = HrisDataset::sample()?;
        let app = ApplicationDataset::sample()?;

        let unmatched = unmatched_identities(&hris, &app);
        for identity in &unmatched {
            warn!("Application user identity {} has no matching employee", identity);
        }

        let mut dataset_files = hris.write_to(&self.config.hris_csv_dir()?)?;
        dataset_files.extend(app.write_to(&self.config.app_csv_dir()?)?);

        Ok(BootstrapReport {
            dataset_files,
            unmatched_identities: unmatched,
            ..BootstrapReport::default()
        })
    }

    /// Clone the toolkit unless a checkout is already present.
    ///
    /// Returns whether a clone ran.
    pub async fn fetch_toolkit(&self) -> OaaResult<bool> {
        let checkout = self.config.toolkit_dir()?;
        if checkout.join(".git").exists() {
            info!("Toolkit already present at {:?}, skipping clone", checkout);
            return Ok(false);
        }

        let clone = CommandSpec::new("git")
            .arg("clone")
            .arg(self.config.toolkit.repo_url.clone())
            .arg(checkout.to_string_lossy());
        self.run_checked(&clone).await?;
        Ok(true)
    }

    /// Install the toolkit's declared Python dependencies
    pub async fn install_requirements(&self) -> OaaResult<()> {
        let requirements = self
            .config
            .toolkit_dir()?
            .join(&self.config.toolkit.requirements);
        let install = CommandSpec::new(self.config.toolkit.python.clone())
            .args(["-m", "pip", "install", "-r"])
            .arg(requirements.to_string_lossy());
        self.run_checked(&install).await
    }

    /// Write the three runner scripts at the harness root
    pub fn emit_scripts(&self) -> OaaResult<Vec<PathBuf>> {
        let root = self.config.root_dir()?;
        let config = self.config.source.as_deref();
        RUNNER_SCRIPTS
            .iter()
            .map(|script| script.write(&root, &self.config.cli_program, config))
            .collect()
    }

    async fn run_checked(&self, spec: &CommandSpec) -> OaaResult<()> {
        match self.launcher.launch(spec).await? {
            0 => Ok(()),
            code => Err(OaaError::CommandFailed {
                command: spec.to_string(),
                code,
            }),
        }
    }
}
