//! Built-in menu configurations, one per role tier.

use super::condition::{ConditionalNavigationItem as Item, MenuCondition, MenuConfiguration};
use crate::models::{Permission, Resource, Role};

/// The five predefined tiers, most senior first.
pub fn configurations() -> Vec<MenuConfiguration> {
    vec![
        MenuConfiguration {
            id: "super_admin_menu".to_string(),
            name: "Super administrator".to_string(),
            priority: 100,
            applies: MenuCondition::new().roles([Role::SuperAdmin]),
            items: vec![
                dashboard(),
                folders(true),
                clients(true),
                shipments(),
                documents(),
                reports(),
                users(),
                settings(),
                audit(),
                system(),
            ],
        },
        MenuConfiguration {
            id: "admin_menu".to_string(),
            name: "Administrator".to_string(),
            priority: 80,
            applies: MenuCondition::new().roles([Role::Admin]),
            items: vec![
                dashboard(),
                folders(true),
                clients(true),
                shipments(),
                documents(),
                reports(),
                users(),
                settings(),
                audit(),
            ],
        },
        MenuConfiguration {
            id: "manager_menu".to_string(),
            name: "Manager".to_string(),
            priority: 60,
            applies: MenuCondition::new().roles([Role::Manager]),
            items: vec![
                dashboard(),
                folders(true),
                clients(true),
                shipments(),
                documents(),
                reports(),
            ],
        },
        MenuConfiguration {
            id: "user_menu".to_string(),
            name: "Operator".to_string(),
            priority: 40,
            applies: MenuCondition::new().roles([Role::User]),
            items: vec![
                dashboard(),
                folders(true),
                clients(false),
                shipments(),
                documents(),
            ],
        },
        MenuConfiguration {
            id: "viewer_menu".to_string(),
            name: "Viewer".to_string(),
            priority: 20,
            applies: MenuCondition::new().roles([Role::Viewer, Role::Guest]),
            items: vec![dashboard(), folders(false), shipments(), reports()],
        },
    ]
}

/// Single-entry menu used when no configuration applies.
pub fn fallback() -> Vec<Item> {
    vec![dashboard()]
}

fn dashboard() -> Item {
    Item::new("dashboard", "home", "/dashboard", 1)
}

fn folders(editable: bool) -> Item {
    let mut children = vec![Item::new("folders_list", "list", "/folders", 1)];
    if editable {
        children.push(
            Item::new("folders_new", "folder-plus", "/folders/new", 2).when(
                MenuCondition::new()
                    .permissions([Permission::ManageFolders])
                    .resources([Resource::Folders]),
            ),
        );
        children.push(
            Item::new("folders_archive", "archive", "/folders/archive", 3)
                .when(MenuCondition::new().roles([Role::SuperAdmin, Role::Admin, Role::Manager])),
        );
    }

    Item::new("folders", "folder", "/folders", 2)
        .when(MenuCondition::new().resources([Resource::Folders]))
        .with_children(children)
}

fn clients(editable: bool) -> Item {
    let mut children = vec![Item::new("clients_list", "list", "/clients", 1)];
    if editable {
        children.push(
            Item::new("clients_import", "upload", "/clients/import", 2)
                .when(MenuCondition::new().permissions([Permission::ManageClients])),
        );
    }

    Item::new("clients", "users", "/clients", 3)
        .when(MenuCondition::new().resources([Resource::Clients]))
        .with_children(children)
}

fn shipments() -> Item {
    Item::new("shipments", "ship", "/shipments", 4).with_children(vec![
        Item::new(
            "bills_of_lading",
            "file-text",
            "/shipments/bills-of-lading",
            1,
        )
        .when(MenuCondition::new().resources([Resource::BillsOfLading])),
        Item::new("containers", "package", "/shipments/containers", 2)
            .when(MenuCondition::new().resources([Resource::Containers])),
    ])
}

fn documents() -> Item {
    Item::new("documents", "paperclip", "/documents", 5)
        .when(MenuCondition::new().resources([Resource::Documents]))
}

fn reports() -> Item {
    Item::new("reports", "bar-chart", "/reports", 6)
        .when(MenuCondition::new().permissions([Permission::ViewReports]))
        .with_children(vec![
            Item::new("reports_overview", "pie-chart", "/reports", 1),
            Item::new("reports_export", "download", "/reports/export", 2)
                .when(MenuCondition::new().permissions([Permission::ExportReports])),
        ])
}

fn users() -> Item {
    Item::new("users", "user-cog", "/admin/users", 7)
        .when(MenuCondition::new().permissions([Permission::ManageUsers]))
}

fn settings() -> Item {
    Item::new("settings", "settings", "/admin/settings", 8)
        .when(MenuCondition::new().permissions([Permission::ManageSettings]))
}

fn audit() -> Item {
    Item::new("audit", "shield", "/admin/audit", 9)
        .when(MenuCondition::new().permissions([Permission::ViewAuditLog]))
}

fn system() -> Item {
    Item::new("system", "server", "/admin/system", 10)
        .when(MenuCondition::new().permissions([Permission::ManageSystem]))
        .with_children(vec![
            Item::new("system_roles", "key", "/admin/system/roles", 1)
                .when(MenuCondition::new().permissions([Permission::ManageRoles])),
        ])
}
