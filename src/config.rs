//! Harness configuration
//!
//! Every field has a default, so running without a config file reproduces the
//! stock demo layout in the current working directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{OaaError, OaaResult};

/// Where the import toolkit comes from and how its entry points are run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolkitConfig {
    /// Git URL of the toolkit
    pub repo_url: String,
    /// Checkout directory, relative to the harness root
    pub checkout_dir: String,
    /// Python interpreter used for installs and imports
    pub python: String,
    /// Requirements file, relative to the checkout
    pub requirements: String,
    /// HRIS import script, relative to the checkout
    pub hris_entry: String,
    /// Custom application import script, relative to the checkout
    pub app_entry: String,
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            repo_url: "https://github.com/Veza/oaa-community.git".to_string(),
            checkout_dir: "oaa-community".to_string(),
            python: "python3".to_string(),
            requirements: "requirements.txt".to_string(),
            hris_entry: "connectors/hris/csv/oaa_hris_csv.py".to_string(),
            app_entry: "connectors/custom/csv/oaa_custom_csv.py".to_string(),
        }
    }
}

/// Provider and application labels sent with one import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportLabels {
    pub provider_name: String,
    pub application_name: String,
}

impl ImportLabels {
    pub fn hris() -> Self {
        Self {
            provider_name: "HRIS".to_string(),
            application_name: "HRIS_APP".to_string(),
        }
    }

    pub fn application() -> Self {
        Self {
            provider_name: "DMI_APP".to_string(),
            application_name: "DMIAPP".to_string(),
        }
    }
}

/// Top-level harness configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Harness root (None = working directory at invocation time)
    pub root: Option<PathBuf>,
    /// HRIS CSV directory name
    pub hris_dir: String,
    /// Custom application CSV directory name
    pub app_dir: String,
    /// Program the emitted runner scripts exec
    pub cli_program: String,
    pub toolkit: ToolkitConfig,
    pub hris: ImportLabels,
    pub application: ImportLabels,
    /// Absolute path of the file this config was loaded from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            root: None,
            hris_dir: "hris_csv".to_string(),
            app_dir: "dmi_csv".to_string(),
            cli_program: "dmi-oaa".to_string(),
            toolkit: ToolkitConfig::default(),
            hris: ImportLabels::hris(),
            application: ImportLabels::application(),
            source: None,
        }
    }
}

impl HarnessConfig {
    /// Load from a YAML file, or fall back to defaults when no path is given
    pub fn load(path: Option<&Path>) -> OaaResult<Self> {
        match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                let mut config = Self::from_yaml(&text).map_err(|source| OaaError::Config {
                    path: path.to_path_buf(),
                    source,
                })?;
                config.source = Some(if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    std::env::current_dir()?.join(path)
                });
                info!("Loaded harness config from {:?}", path);
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Builder-style root override
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Absolute harness root.
    ///
    /// Relative roots, and the default, resolve against the current directory.
    pub fn root_dir(&self) -> OaaResult<PathBuf> {
        let cwd = std::env::current_dir()?;
        Ok(match &self.root {
            Some(root) if root.is_absolute() => root.clone(),
            Some(root) => cwd.join(root),
            None => cwd,
        })
    }

    pub fn hris_csv_dir(&self) -> OaaResult<PathBuf> {
        Ok(self.root_dir()?.join(&self.hris_dir))
    }

    pub fn app_csv_dir(&self) -> OaaResult<PathBuf> {
        Ok(self.root_dir()?.join(&self.app_dir))
    }

    pub fn toolkit_dir(&self) -> OaaResult<PathBuf> {
        Ok(self.root_dir()?.join(&self.toolkit.checkout_dir))
    }
}
