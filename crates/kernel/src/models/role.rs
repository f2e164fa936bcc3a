//! Role, permission and resource models.
//!
//! The role tables are static and keyed by the [`Role`] enum, so every role
//! must be handled explicitly when a table changes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a role name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

/// A named capability tier assigned to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Manager,
    User,
    Viewer,
    Guest,
}

impl Role {
    /// Every role, most senior first.
    pub const ALL: [Role; 6] = [
        Role::SuperAdmin,
        Role::Admin,
        Role::Manager,
        Role::User,
        Role::Viewer,
        Role::Guest,
    ];

    /// Machine name as stored in user profiles.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::User => "user",
            Role::Viewer => "viewer",
            Role::Guest => "guest",
        }
    }

    /// Static definition (priority, label) for this role.
    pub fn definition(self) -> RoleDefinition {
        match self {
            Role::SuperAdmin => RoleDefinition {
                role: self,
                priority: 1,
                label: "Super administrator",
                description: "Full access, including system maintenance",
            },
            Role::Admin => RoleDefinition {
                role: self,
                priority: 2,
                label: "Administrator",
                description: "Manages users, settings and all operational data",
            },
            Role::Manager => RoleDefinition {
                role: self,
                priority: 3,
                label: "Manager",
                description: "Supervises folders, clients and shipments",
            },
            Role::User => RoleDefinition {
                role: self,
                priority: 4,
                label: "Operator",
                description: "Works on folders, bills of lading and containers",
            },
            Role::Viewer => RoleDefinition {
                role: self,
                priority: 5,
                label: "Viewer",
                description: "Read-only access to operational data and reports",
            },
            Role::Guest => RoleDefinition {
                role: self,
                priority: 6,
                label: "Guest",
                description: "Dashboard and folder lookup only",
            },
        }
    }

    /// Lower number = more senior.
    pub fn priority(self) -> u8 {
        self.definition().priority
    }

    /// Global permissions granted by this role.
    pub fn permissions(self) -> &'static [Permission] {
        match self {
            Role::SuperAdmin => Permission::ALL_GLOBAL,
            Role::Admin => ADMIN_PERMISSIONS,
            Role::Manager => MANAGER_PERMISSIONS,
            Role::User => USER_PERMISSIONS,
            Role::Viewer => VIEWER_PERMISSIONS,
            Role::Guest => GUEST_PERMISSIONS,
        }
    }

    /// Resource-scoped grants of this role.
    pub fn resource_grants(self) -> &'static [(Resource, &'static [Permission])] {
        match self {
            Role::SuperAdmin => SUPER_ADMIN_RESOURCES,
            Role::Admin => ADMIN_RESOURCES,
            Role::Manager => MANAGER_RESOURCES,
            Role::User => USER_RESOURCES,
            Role::Viewer => VIEWER_RESOURCES,
            Role::Guest => GUEST_RESOURCES,
        }
    }

    /// Actions this role may perform on one resource.
    pub fn resource_permissions(self, resource: Resource) -> &'static [Permission] {
        self.resource_grants()
            .iter()
            .find(|(r, _)| *r == resource)
            .map(|(_, perms)| *perms)
            .unwrap_or(&[])
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Static description of a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoleDefinition {
    pub role: Role,
    /// Lower number = more senior.
    pub priority: u8,
    pub label: &'static str,
    pub description: &'static str,
}

/// An atomic allowed action.
///
/// Global capabilities and resource actions share one namespace, so the same
/// value can be checked against the flat permission list or a resource grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewDashboard,
    ManageUsers,
    ManageRoles,
    ManageSettings,
    ViewReports,
    ExportReports,
    ViewAuditLog,
    ManageSystem,
    ManageFolders,
    ManageClients,
    ManageShipments,
    Read,
    Create,
    Update,
    Delete,
    Approve,
    Export,
}

impl Permission {
    /// Every global (non resource-scoped) permission.
    pub const ALL_GLOBAL: &'static [Permission] = &[
        Permission::ViewDashboard,
        Permission::ManageUsers,
        Permission::ManageRoles,
        Permission::ManageSettings,
        Permission::ViewReports,
        Permission::ExportReports,
        Permission::ViewAuditLog,
        Permission::ManageSystem,
        Permission::ManageFolders,
        Permission::ManageClients,
        Permission::ManageShipments,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Permission::ViewDashboard => "view_dashboard",
            Permission::ManageUsers => "manage_users",
            Permission::ManageRoles => "manage_roles",
            Permission::ManageSettings => "manage_settings",
            Permission::ViewReports => "view_reports",
            Permission::ExportReports => "export_reports",
            Permission::ViewAuditLog => "view_audit_log",
            Permission::ManageSystem => "manage_system",
            Permission::ManageFolders => "manage_folders",
            Permission::ManageClients => "manage_clients",
            Permission::ManageShipments => "manage_shipments",
            Permission::Read => "read",
            Permission::Create => "create",
            Permission::Update => "update",
            Permission::Delete => "delete",
            Permission::Approve => "approve",
            Permission::Export => "export",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A domain object category permissions can be scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Folders,
    Clients,
    BillsOfLading,
    Containers,
    Documents,
    Reports,
    Users,
    Settings,
}

impl Resource {
    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Folders => "folders",
            Resource::Clients => "clients",
            Resource::BillsOfLading => "bills_of_lading",
            Resource::Containers => "containers",
            Resource::Documents => "documents",
            Resource::Reports => "reports",
            Resource::Users => "users",
            Resource::Settings => "settings",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Resource action sets.
const FULL_ACCESS: &[Permission] = &[
    Permission::Read,
    Permission::Create,
    Permission::Update,
    Permission::Delete,
    Permission::Approve,
    Permission::Export,
];
const SUPERVISE: &[Permission] = &[
    Permission::Read,
    Permission::Create,
    Permission::Update,
    Permission::Approve,
];
const EDIT: &[Permission] = &[Permission::Read, Permission::Create, Permission::Update];
const CONTRIBUTE: &[Permission] = &[Permission::Read, Permission::Create];
const READ_EXPORT: &[Permission] = &[Permission::Read, Permission::Export];
const READ_UPDATE: &[Permission] = &[Permission::Read, Permission::Update];
const READ_ONLY: &[Permission] = &[Permission::Read];
const USER_ADMIN: &[Permission] = &[
    Permission::Read,
    Permission::Create,
    Permission::Update,
    Permission::Delete,
];

const ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::ViewDashboard,
    Permission::ManageUsers,
    Permission::ManageSettings,
    Permission::ViewReports,
    Permission::ExportReports,
    Permission::ViewAuditLog,
    Permission::ManageFolders,
    Permission::ManageClients,
    Permission::ManageShipments,
];

const MANAGER_PERMISSIONS: &[Permission] = &[
    Permission::ViewDashboard,
    Permission::ViewReports,
    Permission::ExportReports,
    Permission::ManageFolders,
    Permission::ManageClients,
    Permission::ManageShipments,
];

const USER_PERMISSIONS: &[Permission] = &[
    Permission::ViewDashboard,
    Permission::ManageFolders,
    Permission::ManageShipments,
];

const VIEWER_PERMISSIONS: &[Permission] = &[Permission::ViewDashboard, Permission::ViewReports];

const GUEST_PERMISSIONS: &[Permission] = &[Permission::ViewDashboard];

const SUPER_ADMIN_RESOURCES: &[(Resource, &[Permission])] = &[
    (Resource::Folders, FULL_ACCESS),
    (Resource::Clients, FULL_ACCESS),
    (Resource::BillsOfLading, FULL_ACCESS),
    (Resource::Containers, FULL_ACCESS),
    (Resource::Documents, FULL_ACCESS),
    (Resource::Reports, FULL_ACCESS),
    (Resource::Users, FULL_ACCESS),
    (Resource::Settings, FULL_ACCESS),
];

const ADMIN_RESOURCES: &[(Resource, &[Permission])] = &[
    (Resource::Folders, FULL_ACCESS),
    (Resource::Clients, FULL_ACCESS),
    (Resource::BillsOfLading, FULL_ACCESS),
    (Resource::Containers, FULL_ACCESS),
    (Resource::Documents, FULL_ACCESS),
    (Resource::Reports, READ_EXPORT),
    (Resource::Users, USER_ADMIN),
    (Resource::Settings, READ_UPDATE),
];

const MANAGER_RESOURCES: &[(Resource, &[Permission])] = &[
    (Resource::Folders, SUPERVISE),
    (Resource::Clients, SUPERVISE),
    (Resource::BillsOfLading, SUPERVISE),
    (Resource::Containers, SUPERVISE),
    (Resource::Documents, EDIT),
    (Resource::Reports, READ_EXPORT),
    (Resource::Users, READ_ONLY),
];

const USER_RESOURCES: &[(Resource, &[Permission])] = &[
    (Resource::Folders, EDIT),
    (Resource::Clients, READ_ONLY),
    (Resource::BillsOfLading, EDIT),
    (Resource::Containers, EDIT),
    (Resource::Documents, CONTRIBUTE),
];

const VIEWER_RESOURCES: &[(Resource, &[Permission])] = &[
    (Resource::Folders, READ_ONLY),
    (Resource::Clients, READ_ONLY),
    (Resource::BillsOfLading, READ_ONLY),
    (Resource::Containers, READ_ONLY),
    (Resource::Documents, READ_ONLY),
    (Resource::Reports, READ_ONLY),
];

const GUEST_RESOURCES: &[(Resource, &[Permission])] = &[(Resource::Folders, READ_ONLY)];

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_machine_names() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = "dispatcher".parse::<Role>().unwrap_err();
        assert_eq!(err, UnknownRole("dispatcher".to_string()));
        assert_eq!(err.to_string(), "unknown role: dispatcher");
    }

    #[test]
    fn role_serde_uses_snake_case() {
        let json = serde_json::to_string(&Role::SuperAdmin).unwrap();
        assert_eq!(json, "\"super_admin\"");
        let role: Role = serde_json::from_str("\"viewer\"").unwrap();
        assert_eq!(role, Role::Viewer);
    }

    #[test]
    fn priorities_increase_with_role_order() {
        let priorities: Vec<u8> = Role::ALL.iter().map(|r| r.priority()).collect();
        assert_eq!(priorities, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn super_admin_holds_every_global_permission() {
        assert_eq!(Role::SuperAdmin.permissions(), Permission::ALL_GLOBAL);
    }

    #[test]
    fn missing_resource_grant_is_empty() {
        assert!(Role::Guest.resource_permissions(Resource::Users).is_empty());
        assert_eq!(
            Role::Manager.resource_permissions(Resource::Users),
            &[Permission::Read]
        );
    }

    #[test]
    fn bills_of_lading_serializes_as_snake_case() {
        let json = serde_json::to_string(&Resource::BillsOfLading).unwrap();
        assert_eq!(json, "\"bills_of_lading\"");
        assert_eq!(Resource::BillsOfLading.to_string(), "bills_of_lading");
    }
}
