//! Custom application dataset: who can order paper and run the warehouse

use super::csv::CsvRecord;
use super::{optional, Dataset, RenderedTable};
use crate::error::{OaaError, OaaResult};

/// Type tag carried by every application record
pub const APPLICATION_TYPE: &str = "Custom";

/// Prefix of user principal references in entitlements
pub const USER_PRINCIPAL_PREFIX: &str = "user:";

/// Prefix of group principal references in entitlements
pub const GROUP_PRINCIPAL_PREFIX: &str = "group:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    pub id: String,
    pub name: String,
    pub application_type: String,
}

/// Application permission mapped onto coarse access levels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    pub id: String,
    pub name: String,
    pub access: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub id: String,
    pub name: String,
    pub resource_type: String,
    pub description: String,
    pub parent_id: Option<String>,
}

/// Application-local user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub identity: String,
    pub full_name: String,
    pub job_title: String,
    pub branch: String,
    pub is_active: bool,
}

/// Application-local group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub identity: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserGroup {
    pub user_id: String,
    pub group_id: String,
}

/// Grant of a permission to a principal, on one resource or application-wide
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entitlement {
    /// `user:<user id>` or `group:<group id>`
    pub principal: String,
    pub permission_id: String,
    /// None grants the permission on the whole application
    pub resource_id: Option<String>,
}

impl Entitlement {
    pub fn for_user(user_id: &str, permission_id: &str, resource_id: Option<&str>) -> Self {
        Self::new(USER_PRINCIPAL_PREFIX, user_id, permission_id, resource_id)
    }

    pub fn for_group(group_id: &str, permission_id: &str, resource_id: Option<&str>) -> Self {
        Self::new(GROUP_PRINCIPAL_PREFIX, group_id, permission_id, resource_id)
    }

    fn new(prefix: &str, id: &str, permission_id: &str, resource_id: Option<&str>) -> Self {
        Self {
            principal: format!("{}{}", prefix, id),
            permission_id: permission_id.to_string(),
            resource_id: resource_id.map(str::to_string),
        }
    }

    /// User id behind the principal reference, None for groups
    pub fn user_id(&self) -> Option<&str> {
        self.principal.strip_prefix(USER_PRINCIPAL_PREFIX)
    }

    /// Group id behind the principal reference, None for users
    pub fn group_id(&self) -> Option<&str> {
        self.principal.strip_prefix(GROUP_PRINCIPAL_PREFIX)
    }

    pub fn is_application_wide(&self) -> bool {
        self.resource_id.is_none()
    }
}

impl CsvRecord for Application {
    const HEADER: &'static [&'static str] = &["id", "name", "type"];

    fn fields(&self) -> Vec<String> {
        vec![self.id.clone(), self.name.clone(), self.application_type.clone()]
    }
}

impl CsvRecord for Permission {
    const HEADER: &'static [&'static str] = &["id", "name", "permissions"];

    fn fields(&self) -> Vec<String> {
        vec![self.id.clone(), self.name.clone(), self.access.join(",")]
    }
}

impl CsvRecord for Resource {
    const HEADER: &'static [&'static str] = &["id", "name", "type", "description", "parent_id"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.resource_type.clone(),
            self.description.clone(),
            self.parent_id.clone().unwrap_or_default(),
        ]
    }
}

impl CsvRecord for User {
    const HEADER: &'static [&'static str] =
        &["id", "name", "identity", "full_name", "job_title", "branch", "is_active"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.identity.clone(),
            self.full_name.clone(),
            self.job_title.clone(),
            self.branch.clone(),
            self.is_active.to_string(),
        ]
    }
}

impl CsvRecord for Group {
    const HEADER: &'static [&'static str] = &["id", "name", "identity"];

    fn fields(&self) -> Vec<String> {
        vec![self.id.clone(), self.name.clone(), self.identity.clone()]
    }
}

impl CsvRecord for UserGroup {
    const HEADER: &'static [&'static str] = &["user_id", "group_id"];

    fn fields(&self) -> Vec<String> {
        vec![self.user_id.clone(), self.group_id.clone()]
    }
}

impl CsvRecord for Entitlement {
    const HEADER: &'static [&'static str] = &["principal", "permission_id", "resource_id"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.principal.clone(),
            self.permission_id.clone(),
            self.resource_id.clone().unwrap_or_default(),
        ]
    }
}

/// The custom application snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationDataset {
    pub applications: Vec<Application>,
    pub permissions: Vec<Permission>,
    pub resources: Vec<Resource>,
    pub users: Vec<User>,
    pub groups: Vec<Group>,
    pub user_groups: Vec<UserGroup>,
    pub entitlements: Vec<Entitlement>,
}

const APPLICATIONS: &[(&str, &str)] = &[("A100", "DMIAPP")];

// (id, name, access levels)
const PERMISSIONS: &[(&str, &str, &[&str])] = &[
    ("P100", "ViewDept", &["read"]),
    ("P200", "EditDept", &["read", "write"]),
    ("P300", "ApproveTime", &["read", "write"]),
    ("P400", "AccessBranch", &["read"]),
    ("P500", "OrderPaper", &["read"]),
    ("P600", "ManagePricing", &["read", "write"]),
    ("P700", "ManageWarehouse", &["read", "write"]),
];

// (id, name, type, description, parent)
const RESOURCES: &[(&str, &str, &str, &str, &str)] = &[
    ("R100", "Scranton Branch", "branch", "Scranton Branch", ""),
    ("R110", "Management", "department", "Management Department", "R100"),
    ("R120", "Sales", "department", "Sales Department", "R100"),
    ("R130", "Warehouse", "department", "Warehouse Department", "R100"),
    ("R200", "Bond Paper", "paper_type", "Bond Paper, 20 lb", ""),
    ("R210", "Company Letterhead", "paper_type", "Company Letterhead", ""),
];

const BRANCH: &str = "Scranton";

// (id, name, identity, full name, job title, active)
const USERS: &[(&str, &str, &str, &str, &str, bool)] = &[
    ("U100", "michael", "michael.scott@dundermifflin.com", "Michael Scott", "Regional Manager", true),
    ("U200", "jim", "jim.halpert@dundermifflin.com", "Jim Halpert", "Salesman", true),
    ("U300", "pam", "pam.beesly@dundermifflin.com", "Pam Beesly", "Receptionist", true),
    ("U400", "dwight", "dwight.schrute@dundermifflin.com", "Dwight Schrute", "Salesman", true),
    ("U500", "darryl", "darryl.philbin@dundermifflin.com", "Darryl Philbin", "Warehouse Foreman", true),
    ("U600", "ryan", "ryan.howard@dundermifflin.com", "Ryan Howard", "Temp", false),
];

const GROUPS: &[(&str, &str, &str)] = &[
    ("G100", "managers", "managers@dundermifflin.com"),
    ("G200", "sales", "sales@dundermifflin.com"),
    ("G300", "warehouse", "warehouse@dundermifflin.com"),
];

const USER_GROUPS: &[(&str, &str)] = &[
    ("U100", "G100"),
    ("U200", "G200"),
    ("U400", "G200"),
    ("U500", "G300"),
    ("U600", "G200"),
];

// (user, permission, resource)
const ENTITLEMENTS: &[(&str, &str, &str)] = &[
    ("U100", "P100", "R110"),
    ("U100", "P200", "R110"),
    ("U100", "P300", "R110"),
    ("U100", "P400", "R100"),
    ("U100", "P500", "R200"),
    ("U100", "P500", "R210"),
    ("U100", "P600", "R100"),
    ("U100", "P700", "R130"),
    ("U200", "P100", "R120"),
    ("U200", "P400", "R100"),
    ("U200", "P500", "R200"),
    ("U200", "P500", "R210"),
    ("U300", "P100", "R110"),
    ("U300", "P400", "R100"),
    ("U400", "P100", "R120"),
    ("U400", "P400", "R100"),
    ("U400", "P700", "R130"),
    ("U500", "P400", "R100"),
    ("U500", "P700", "R130"),
    ("U600", "P100", "R120"),
];

// (group, permission, resource); empty resource = whole application
const GROUP_ENTITLEMENTS: &[(&str, &str, &str)] = &[
    ("G100", "P100", ""),
    ("G200", "P500", "R200"),
    ("G300", "P700", "R130"),
];

impl ApplicationDataset {
    /// The fixed Dunder Mifflin snapshot
    pub fn sample() -> OaaResult<Self> {
        let dataset = Self {
            applications: APPLICATIONS
                .iter()
                .map(|&(id, name)| Application {
                    id: id.to_string(),
                    name: name.to_string(),
                    application_type: APPLICATION_TYPE.to_string(),
                })
                .collect(),
            permissions: PERMISSIONS
                .iter()
                .map(|&(id, name, access)| Permission {
                    id: id.to_string(),
                    name: name.to_string(),
                    access: access.iter().map(|a| a.to_string()).collect(),
                })
                .collect(),
            resources: RESOURCES
                .iter()
                .map(|&(id, name, resource_type, description, parent)| Resource {
                    id: id.to_string(),
                    name: name.to_string(),
                    resource_type: resource_type.to_string(),
                    description: description.to_string(),
                    parent_id: optional(parent),
                })
                .collect(),
            users: USERS
                .iter()
                .map(|&(id, name, identity, full_name, job_title, is_active)| User {
                    id: id.to_string(),
                    name: name.to_string(),
                    identity: identity.to_string(),
                    full_name: full_name.to_string(),
                    job_title: job_title.to_string(),
                    branch: BRANCH.to_string(),
                    is_active,
                })
                .collect(),
            groups: GROUPS
                .iter()
                .map(|&(id, name, identity)| Group {
                    id: id.to_string(),
                    name: name.to_string(),
                    identity: identity.to_string(),
                })
                .collect(),
            user_groups: USER_GROUPS
                .iter()
                .map(|&(user, group)| UserGroup {
                    user_id: user.to_string(),
                    group_id: group.to_string(),
                })
                .collect(),
            entitlements: ENTITLEMENTS
                .iter()
                .map(|&(user, permission, resource)| {
                    Entitlement::for_user(user, permission, Some(resource))
                })
                .chain(GROUP_ENTITLEMENTS.iter().map(|&(group, permission, resource)| {
                    Entitlement::for_group(group, permission, optional(resource).as_deref())
                }))
                .collect(),
        };

        if dataset.applications.is_empty() {
            return Err(OaaError::Dataset("application dataset has no application record".to_string()));
        }
        Ok(dataset)
    }

    /// Entitlements granted directly to one user
    pub fn entitlements_for(&self, user_id: &str) -> Vec<&Entitlement> {
        self.entitlements
            .iter()
            .filter(|e| e.user_id() == Some(user_id))
            .collect()
    }

    /// Entitlements a user holds through group membership
    pub fn group_entitlements_for(&self, user_id: &str) -> Vec<&Entitlement> {
        let groups: Vec<&str> = self
            .user_groups
            .iter()
            .filter(|m| m.user_id == user_id)
            .map(|m| m.group_id.as_str())
            .collect();
        self.entitlements
            .iter()
            .filter(|e| e.group_id().map_or(false, |g| groups.contains(&g)))
            .collect()
    }
}

impl Dataset for ApplicationDataset {
    fn name(&self) -> &'static str {
        "application"
    }

    fn tables(&self) -> Vec<RenderedTable> {
        vec![
            RenderedTable::new("applications.csv", &self.applications),
            RenderedTable::new("permissions.csv", &self.permissions),
            RenderedTable::new("resources.csv", &self.resources),
            RenderedTable::new("users.csv", &self.users),
            RenderedTable::new("groups.csv", &self.groups),
            RenderedTable::new("user_groups.csv", &self.user_groups),
            RenderedTable::new("entitlements.csv", &self.entitlements),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_application_is_custom() {
        let app = ApplicationDataset::sample().unwrap();
        assert!(app.applications.iter().all(|a| a.application_type == APPLICATION_TYPE));
    }

    #[test]
    fn test_references_resolve() {
        let app = ApplicationDataset::sample().unwrap();
        let users: HashSet<_> = app.users.iter().map(|u| u.id.as_str()).collect();
        let groups: HashSet<_> = app.groups.iter().map(|g| g.id.as_str()).collect();
        let permissions: HashSet<_> = app.permissions.iter().map(|p| p.id.as_str()).collect();
        let resources: HashSet<_> = app.resources.iter().map(|r| r.id.as_str()).collect();

        for r in &app.resources {
            if let Some(parent) = &r.parent_id {
                assert!(resources.contains(parent.as_str()));
            }
        }
        for m in &app.user_groups {
            assert!(users.contains(m.user_id.as_str()));
            assert!(groups.contains(m.group_id.as_str()));
        }
        let mut group_grants = 0;
        for e in &app.entitlements {
            match (e.user_id(), e.group_id()) {
                (Some(user), None) => assert!(users.contains(user), "{}", e.principal),
                (None, Some(group)) => {
                    assert!(groups.contains(group), "{}", e.principal);
                    group_grants += 1;
                }
                _ => panic!("unknown principal {}", e.principal),
            }
            assert!(permissions.contains(e.permission_id.as_str()));
            if let Some(resource) = &e.resource_id {
                assert!(resources.contains(resource.as_str()));
            }
        }
        assert!(group_grants > 0);
    }

    #[test]
    fn test_permission_access_is_quoted() {
        let app = ApplicationDataset::sample().unwrap();
        let tables = app.tables();
        let permissions = tables.iter().find(|t| t.file_name == "permissions.csv").unwrap();
        assert!(permissions.contents.starts_with("id,name,permissions\n"));
        assert!(permissions.contents.contains("P100,ViewDept,read\n"));
        assert!(permissions.contents.contains("P200,EditDept,\"read,write\"\n"));
    }

    #[test]
    fn test_entitlement_principal() {
        let e = Entitlement::for_user("U100", "P100", Some("R110"));
        assert_eq!(e.principal, "user:U100");
        assert_eq!(e.user_id(), Some("U100"));
        assert_eq!(e.group_id(), None);

        let g = Entitlement::for_group("G100", "P100", None);
        assert_eq!(g.principal, "group:G100");
        assert_eq!(g.user_id(), None);
        assert_eq!(g.group_id(), Some("G100"));
        assert!(g.is_application_wide());

        let app = ApplicationDataset::sample().unwrap();
        assert_eq!(app.entitlements_for("U300").len(), 2);
        assert!(app.entitlements_for("U999").is_empty());
    }

    #[test]
    fn test_group_grants_reach_members() {
        let app = ApplicationDataset::sample().unwrap();
        let michael = app.group_entitlements_for("U100");
        assert_eq!(michael.len(), 1);
        assert!(michael[0].is_application_wide());

        // U300 belongs to no group
        assert!(app.group_entitlements_for("U300").is_empty());
    }

    #[test]
    fn test_rendered_rows() {
        let app = ApplicationDataset::sample().unwrap();
        let tables = app.tables();
        let users = tables.iter().find(|t| t.file_name == "users.csv").unwrap();
        assert!(users
            .contents
            .starts_with("id,name,identity,full_name,job_title,branch,is_active\n"));
        assert!(users.contents.contains(
            "U100,michael,michael.scott@dundermifflin.com,Michael Scott,Regional Manager,Scranton,true\n"
        ));

        let entitlements = tables.iter().find(|t| t.file_name == "entitlements.csv").unwrap();
        assert!(entitlements.contents.contains("user:U100,P100,R110\n"));
        assert!(entitlements.contents.contains("group:G100,P100,\n"));
        assert!(entitlements.contents.contains("group:G300,P700,R130\n"));
    }
}
