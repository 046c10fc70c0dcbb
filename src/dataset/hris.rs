//! HRIS dataset: the org chart of the Scranton branch

use chrono::NaiveDate;

use super::csv::CsvRecord;
use super::{optional, Dataset, RenderedTable};
use crate::error::{OaaError, OaaResult};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Department node; root departments have no parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Department {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    pub id: String,
    pub name: String,
    /// Email address, joined against application user identities
    pub identity: String,
    pub hire_date: NaiveDate,
    pub title: String,
    pub manager_id: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeDepartment {
    pub employee_id: String,
    pub department_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeLocation {
    pub employee_id: String,
    pub location_id: String,
}

impl CsvRecord for Department {
    const HEADER: &'static [&'static str] = &["id", "name", "parent_id"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.parent_id.clone().unwrap_or_default(),
        ]
    }
}

impl CsvRecord for Location {
    const HEADER: &'static [&'static str] = &["id", "name"];

    fn fields(&self) -> Vec<String> {
        vec![self.id.clone(), self.name.clone()]
    }
}

impl CsvRecord for Employee {
    const HEADER: &'static [&'static str] = &[
        "id",
        "name",
        "identity",
        "hire_date",
        "title",
        "manager_id",
        "is_active",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.identity.clone(),
            self.hire_date.format(DATE_FORMAT).to_string(),
            self.title.clone(),
            self.manager_id.clone().unwrap_or_default(),
            self.is_active.to_string(),
        ]
    }
}

impl CsvRecord for EmployeeDepartment {
    const HEADER: &'static [&'static str] = &["employee_id", "department_id"];

    fn fields(&self) -> Vec<String> {
        vec![self.employee_id.clone(), self.department_id.clone()]
    }
}

impl CsvRecord for EmployeeLocation {
    const HEADER: &'static [&'static str] = &["employee_id", "location_id"];

    fn fields(&self) -> Vec<String> {
        vec![self.employee_id.clone(), self.location_id.clone()]
    }
}

/// The HRIS snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HrisDataset {
    pub departments: Vec<Department>,
    pub locations: Vec<Location>,
    pub employees: Vec<Employee>,
    pub employee_departments: Vec<EmployeeDepartment>,
    pub employee_locations: Vec<EmployeeLocation>,
}

// (id, name, parent)
const DEPARTMENTS: &[(&str, &str, &str)] = &[
    ("D100", "Dunder Mifflin Paper Company", ""),
    ("D200", "Scranton Branch", "D100"),
    ("D210", "Management", "D200"),
    ("D220", "Sales", "D200"),
    ("D230", "Accounting", "D200"),
    ("D240", "Warehouse", "D200"),
    ("D250", "Reception", "D200"),
    ("D300", "Human Resources", "D100"),
];

const LOCATIONS: &[(&str, &str)] = &[
    ("L100", "Scranton Business Park"),
    ("L200", "Corporate Headquarters, New York"),
];

// (id, name, identity, hire date, title, manager, active)
const EMPLOYEES: &[(&str, &str, &str, &str, &str, &str, bool)] = &[
    ("E001", "Michael Scott", "michael.scott@dundermifflin.com", "1993-03-15", "Regional Manager", "", true),
    ("E002", "Dwight Schrute", "dwight.schrute@dundermifflin.com", "2001-04-02", "Assistant to the Regional Manager", "E001", true),
    ("E003", "Jim Halpert", "jim.halpert@dundermifflin.com", "2001-10-01", "Sales Representative", "E001", true),
    ("E004", "Pam Beesly", "pam.beesly@dundermifflin.com", "2002-06-17", "Receptionist", "E001", true),
    ("E005", "Angela Martin", "angela.martin@dundermifflin.com", "1999-08-23", "Senior Accountant", "E001", true),
    ("E006", "Oscar Martinez", "oscar.martinez@dundermifflin.com", "2000-05-08", "Accountant", "E005", true),
    ("E007", "Kevin Malone", "kevin.malone@dundermifflin.com", "2000-09-04", "Accountant", "E005", true),
    ("E008", "Stanley Hudson", "stanley.hudson@dundermifflin.com", "1995-02-13", "Sales Representative", "E001", true),
    ("E009", "Darryl Philbin", "darryl.philbin@dundermifflin.com", "2002-01-14", "Warehouse Foreman", "E001", true),
    ("E010", "Toby Flenderson", "toby.flenderson@dundermifflin.com", "2000-11-06", "HR Representative", "", true),
    ("E011", "Ryan Howard", "ryan.howard@dundermifflin.com", "2005-03-24", "Temp", "E001", false),
];

// (employee, department)
const EMPLOYEE_DEPARTMENTS: &[(&str, &str)] = &[
    ("E001", "D210"),
    ("E002", "D220"),
    ("E003", "D220"),
    ("E004", "D250"),
    ("E005", "D230"),
    ("E006", "D230"),
    ("E007", "D230"),
    ("E008", "D220"),
    ("E009", "D240"),
    ("E010", "D300"),
    ("E011", "D220"),
];

// (employee, location)
const EMPLOYEE_LOCATIONS: &[(&str, &str)] = &[
    ("E001", "L100"),
    ("E002", "L100"),
    ("E003", "L100"),
    ("E004", "L100"),
    ("E005", "L100"),
    ("E006", "L100"),
    ("E007", "L100"),
    ("E008", "L100"),
    ("E009", "L100"),
    ("E010", "L100"),
    ("E010", "L200"),
    ("E011", "L100"),
];

fn parse_date(employee_id: &str, value: &str) -> OaaResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| {
        OaaError::Dataset(format!("hire date {:?} for {}: {}", value, employee_id, e))
    })
}

impl HrisDataset {
    /// The fixed Dunder Mifflin snapshot
    pub fn sample() -> OaaResult<Self> {
        let employees = EMPLOYEES
            .iter()
            .map(|&(id, name, identity, hired, title, manager, is_active)| {
                Ok(Employee {
                    id: id.to_string(),
                    name: name.to_string(),
                    identity: identity.to_string(),
                    hire_date: parse_date(id, hired)?,
                    title: title.to_string(),
                    manager_id: optional(manager),
                    is_active,
                })
            })
            .collect::<OaaResult<Vec<_>>>()?;

        Ok(Self {
            departments: DEPARTMENTS
                .iter()
                .map(|&(id, name, parent)| Department {
                    id: id.to_string(),
                    name: name.to_string(),
                    parent_id: optional(parent),
                })
                .collect(),
            locations: LOCATIONS
                .iter()
                .map(|&(id, name)| Location {
                    id: id.to_string(),
                    name: name.to_string(),
                })
                .collect(),
            employees,
            employee_departments: EMPLOYEE_DEPARTMENTS
                .iter()
                .map(|&(employee, department)| EmployeeDepartment {
                    employee_id: employee.to_string(),
                    department_id: department.to_string(),
                })
                .collect(),
            employee_locations: EMPLOYEE_LOCATIONS
                .iter()
                .map(|&(employee, location)| EmployeeLocation {
                    employee_id: employee.to_string(),
                    location_id: location.to_string(),
                })
                .collect(),
        })
    }

    pub fn employee_by_identity(&self, identity: &str) -> Option<&Employee> {
        self.employees.iter().find(|e| e.identity == identity)
    }
}

impl Dataset for HrisDataset {
    fn name(&self) -> &'static str {
        "HRIS"
    }

    fn tables(&self) -> Vec<RenderedTable> {
        vec![
            RenderedTable::new("departments.csv", &self.departments),
            RenderedTable::new("locations.csv", &self.locations),
            RenderedTable::new("employees.csv", &self.employees),
            RenderedTable::new("employee_departments.csv", &self.employee_departments),
            RenderedTable::new("employee_locations.csv", &self.employee_locations),
        ]
    }
}
