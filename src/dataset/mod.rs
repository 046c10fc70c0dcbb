//! Sample datasets for the Dunder Mifflin demo
//!
//! Two static snapshots are written to disk at setup time:
//! - **HRIS** (`hris_csv/`): departments, locations, employees and their
//!   department/location assignments.
//! - **Custom application** (`dmi_csv/`): the application record, its
//!   permissions, resources, local users and groups, and entitlements.
//!
//! Application users are linked to employees through their `identity`
//! (an email address). [`unmatched_identities`] reports users whose identity
//! has no employee counterpart.

pub mod application;
pub mod csv;
pub mod hris;

pub use application::{
    Application, ApplicationDataset, Entitlement, Group, Permission, Resource, User, UserGroup,
};
pub use csv::CsvRecord;
pub use hris::{Department, Employee, EmployeeDepartment, EmployeeLocation, HrisDataset, Location};

use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::OaaResult;

/// One table rendered to CSV text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedTable {
    pub file_name: &'static str,
    pub contents: String,
    pub rows: usize,
}

impl RenderedTable {
    pub fn new<R: CsvRecord>(file_name: &'static str, records: &[R]) -> Self {
        Self {
            file_name,
            contents: csv::render(records),
            rows: records.len(),
        }
    }
}

/// A set of tables that lives in one directory
pub trait Dataset {
    /// Short label used in logs
    fn name(&self) -> &'static str;

    /// Every table of the dataset, rendered
    fn tables(&self) -> Vec<RenderedTable>;

    /// Write every table into `dir`, creating it if needed.
    ///
    /// Existing files are overwritten.
    fn write_to(&self, dir: &Path) -> OaaResult<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::new();
        for table in self.tables() {
            let path = dir.join(table.file_name);
            std::fs::write(&path, table.contents.as_bytes())?;
            written.push(path);
        }
        info!("Wrote {} {} tables to {:?}", written.len(), self.name(), dir);
        Ok(written)
    }
}

/// Empty literal columns mean "no value"
pub(crate) fn optional(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Application user identities with no matching employee identity, in user order
pub fn unmatched_identities(hris: &HrisDataset, app: &ApplicationDataset) -> Vec<String> {
    let known: HashSet<&str> = hris.employees.iter().map(|e| e.identity.as_str()).collect();
    app.users
        .iter()
        .filter(|u| !known.contains(u.identity.as_str()))
        .map(|u| u.identity.clone())
        .collect()
}
