#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Permission service properties over every role combination.

use std::collections::HashSet;

use portline_kernel::models::{Permission, Resource, Role};
use portline_kernel::permissions::PermissionService;
use portline_test_utils::context_with_roles;

/// Every subset of the known roles.
fn role_sets() -> Vec<Vec<Role>> {
    (0..(1u32 << Role::ALL.len()))
        .map(|mask| {
            Role::ALL
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, r)| *r)
                .collect()
        })
        .collect()
}

#[test]
fn test_user_permissions_equal_union_of_tables() {
    for roles in role_sets() {
        let actual: HashSet<Permission> = PermissionService::get_user_permissions(&roles)
            .into_iter()
            .collect();
        let expected: HashSet<Permission> = roles
            .iter()
            .flat_map(|r| r.permissions().iter().copied())
            .collect();
        assert_eq!(actual, expected, "roles: {roles:?}");
    }
}

#[test]
fn test_flat_check_matches_context_permissions() {
    for roles in role_sets() {
        let names: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();
        let ctx = context_with_roles(&names);

        for permission in Permission::ALL_GLOBAL {
            let expected = !ctx.roles.is_empty() && ctx.permissions.contains(permission);
            assert_eq!(
                PermissionService::has_permission(&ctx, *permission, None),
                expected,
                "roles: {roles:?}, permission: {permission}"
            );
        }
    }
}

#[test]
fn test_resource_check_matches_merged_grants() {
    let resources = [
        Resource::Folders,
        Resource::Clients,
        Resource::BillsOfLading,
        Resource::Containers,
        Resource::Documents,
        Resource::Reports,
        Resource::Users,
        Resource::Settings,
    ];

    for roles in role_sets() {
        let names: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();
        let ctx = context_with_roles(&names);

        for resource in resources {
            let merged: HashSet<Permission> = roles
                .iter()
                .flat_map(|r| r.resource_permissions(resource).iter().copied())
                .collect();

            for action in [Permission::Read, Permission::Delete, Permission::Approve] {
                assert_eq!(
                    PermissionService::has_permission(&ctx, action, Some(resource)),
                    merged.contains(&action),
                    "roles: {roles:?}, resource: {resource}, action: {action}"
                );
            }
        }
    }
}

#[test]
fn test_highest_priority_role_prefers_admin_over_user() {
    let ctx = context_with_roles(&["user", "admin"]);
    assert_eq!(
        PermissionService::get_highest_priority_role(&ctx),
        Some(Role::Admin)
    );
}
