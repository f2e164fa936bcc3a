//! Permission checking against a [`UserContext`].
//!
//! All lookups go through the static role tables in [`crate::models::role`];
//! nothing here touches the database.

use std::collections::HashSet;

use tracing::debug;
use uuid::Uuid;

use crate::models::{ContextExtras, Permission, Resource, Role, UserContext};

/// Answers permission and role queries for a user context.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionService;

impl PermissionService {
    /// Check a single permission.
    ///
    /// - With a resource, checks the role-merged grants for that resource.
    /// - Without one, checks the flat `context.permissions` list.
    /// - A context with no roles never holds any permission.
    pub fn has_permission(
        context: &UserContext,
        permission: Permission,
        resource: Option<Resource>,
    ) -> bool {
        if context.roles.is_empty() {
            return false;
        }

        match resource {
            Some(resource) => Self::get_resource_permissions(context, resource).contains(&permission),
            None => context.permissions.contains(&permission),
        }
    }

    /// True when every permission is held.
    pub fn has_all_permissions(
        context: &UserContext,
        permissions: &[Permission],
        resource: Option<Resource>,
    ) -> bool {
        permissions
            .iter()
            .all(|p| Self::has_permission(context, *p, resource))
    }

    /// True when at least one permission is held.
    pub fn has_any_permission(
        context: &UserContext,
        permissions: &[Permission],
        resource: Option<Resource>,
    ) -> bool {
        permissions
            .iter()
            .any(|p| Self::has_permission(context, *p, resource))
    }

    /// Union of the global permissions of every role, in first-seen order.
    pub fn get_user_permissions(roles: &[Role]) -> Vec<Permission> {
        dedup(roles.iter().flat_map(|role| role.permissions().iter().copied()))
    }

    /// Actions the user may perform on one resource, merged across roles.
    pub fn get_resource_permissions(context: &UserContext, resource: Resource) -> Vec<Permission> {
        dedup(
            context
                .roles
                .iter()
                .flat_map(|role| role.resource_permissions(resource).iter().copied()),
        )
    }

    pub fn has_role(context: &UserContext, role: Role) -> bool {
        context.roles.contains(&role)
    }

    pub fn has_any_role(context: &UserContext, roles: &[Role]) -> bool {
        roles.iter().any(|role| context.roles.contains(role))
    }

    /// The most senior role held (lowest priority number).
    ///
    /// Ties keep the role that appears first in `context.roles`.
    pub fn get_highest_priority_role(context: &UserContext) -> Option<Role> {
        let mut best: Option<Role> = None;
        for role in &context.roles {
            match best {
                Some(current) if current.priority() <= role.priority() => {}
                _ => best = Some(*role),
            }
        }
        best
    }

    /// Build a context from raw role names.
    ///
    /// Unrecognized role names are dropped; the permission list is the union
    /// of the remaining roles' tables.
    pub fn create_user_context<I, S>(
        user_id: Uuid,
        email: &str,
        roles: I,
        extras: ContextExtras,
    ) -> UserContext
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut valid: Vec<Role> = Vec::new();
        for name in roles {
            let name = name.as_ref();
            match name.parse::<Role>() {
                Ok(role) if !valid.contains(&role) => valid.push(role),
                Ok(_) => {}
                Err(e) => debug!(user_id = %user_id, error = %e, "ignoring role"),
            }
        }

        let permissions = Self::get_user_permissions(&valid);

        UserContext {
            id: user_id,
            email: email.to_string(),
            roles: valid,
            permissions,
            department: extras.department,
            organization: extras.organization,
            metadata: extras.metadata,
        }
    }
}

fn dedup(permissions: impl Iterator<Item = Permission>) -> Vec<Permission> {
    let mut seen = HashSet::new();
    permissions.filter(|p| seen.insert(*p)).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn context(roles: &[&str]) -> UserContext {
        PermissionService::create_user_context(
            Uuid::nil(),
            "ops@portline.test",
            roles.iter().copied(),
            ContextExtras::default(),
        )
    }

    #[test]
    fn user_permissions_are_union_of_role_tables() {
        let roles = [Role::Viewer, Role::User];
        let perms: HashSet<Permission> = PermissionService::get_user_permissions(&roles)
            .into_iter()
            .collect();

        let expected: HashSet<Permission> = Role::Viewer
            .permissions()
            .iter()
            .chain(Role::User.permissions())
            .copied()
            .collect();

        assert_eq!(perms, expected);
    }

    #[test]
    fn user_permissions_have_no_duplicates() {
        let perms = PermissionService::get_user_permissions(&[Role::Admin, Role::Manager]);
        let unique: HashSet<_> = perms.iter().copied().collect();
        assert_eq!(perms.len(), unique.len());
    }

    #[test]
    fn unknown_roles_contribute_nothing() {
        let ctx = context(&["viewer", "harbour_master"]);
        assert_eq!(ctx.roles, vec![Role::Viewer]);
        assert_eq!(ctx.permissions, Role::Viewer.permissions().to_vec());
    }

    #[test]
    fn duplicate_role_names_collapse() {
        let ctx = context(&["user", "user"]);
        assert_eq!(ctx.roles, vec![Role::User]);
    }

    #[test]
    fn zero_roles_hold_nothing() {
        let mut ctx = context(&[]);
        // Even a hand-filled permission list is ignored without roles.
        ctx.permissions = vec![Permission::ViewDashboard];

        assert!(!PermissionService::has_permission(
            &ctx,
            Permission::ViewDashboard,
            None
        ));
        assert!(!PermissionService::has_permission(
            &ctx,
            Permission::Read,
            Some(Resource::Folders)
        ));
    }

    #[test]
    fn flat_and_resource_checks_are_independent() {
        // Viewer role, but a permission list that does not match it.
        let mut ctx = context(&["viewer"]);
        ctx.permissions = vec![Permission::Delete];

        assert!(PermissionService::has_permission(
            &ctx,
            Permission::Delete,
            None
        ));
        assert!(!PermissionService::has_permission(
            &ctx,
            Permission::Delete,
            Some(Resource::Folders)
        ));
        assert!(!PermissionService::has_permission(
            &ctx,
            Permission::Read,
            None
        ));
        assert!(PermissionService::has_permission(
            &ctx,
            Permission::Read,
            Some(Resource::Folders)
        ));
    }

    #[test]
    fn resource_permissions_merge_across_roles() {
        let ctx = context(&["guest", "viewer"]);
        assert_eq!(
            PermissionService::get_resource_permissions(&ctx, Resource::Reports),
            vec![Permission::Read]
        );
        assert!(PermissionService::get_resource_permissions(&ctx, Resource::Users).is_empty());
    }

    #[test]
    fn all_and_any_permissions() {
        let ctx = context(&["manager"]);
        assert!(PermissionService::has_all_permissions(
            &ctx,
            &[Permission::ViewReports, Permission::ManageClients],
            None
        ));
        assert!(!PermissionService::has_all_permissions(
            &ctx,
            &[Permission::ViewReports, Permission::ManageUsers],
            None
        ));
        assert!(PermissionService::has_any_permission(
            &ctx,
            &[Permission::ManageUsers, Permission::ViewReports],
            None
        ));
        assert!(!PermissionService::has_any_permission(&ctx, &[], None));
        assert!(PermissionService::has_all_permissions(&ctx, &[], None));
    }

    #[test]
    fn role_membership() {
        let ctx = context(&["user", "viewer"]);
        assert!(PermissionService::has_role(&ctx, Role::User));
        assert!(!PermissionService::has_role(&ctx, Role::Admin));
        assert!(PermissionService::has_any_role(
            &ctx,
            &[Role::Admin, Role::Viewer]
        ));
        assert!(!PermissionService::has_any_role(&ctx, &[]));
    }

    #[test]
    fn highest_priority_role_is_most_senior() {
        let ctx = context(&["user", "admin"]);
        assert_eq!(
            PermissionService::get_highest_priority_role(&ctx),
            Some(Role::Admin)
        );
        assert_eq!(
            PermissionService::get_highest_priority_role(&context(&[])),
            None
        );
    }

    #[test]
    fn highest_priority_role_ties_keep_first() {
        let mut ctx = context(&["viewer"]);
        ctx.roles = vec![Role::Viewer, Role::Guest, Role::Viewer];
        assert_eq!(
            PermissionService::get_highest_priority_role(&ctx),
            Some(Role::Viewer)
        );
    }

    #[test]
    fn create_user_context_merges_extras() {
        let mut metadata = serde_json::Map::new();
        metadata.insert("branch".to_string(), serde_json::json!("Antwerp"));

        let ctx = PermissionService::create_user_context(
            Uuid::nil(),
            "ops@portline.test",
            ["manager"],
            ContextExtras {
                department: Some("import".to_string()),
                organization: Some("portline-be".to_string()),
                metadata,
            },
        );

        assert_eq!(ctx.department.as_deref(), Some("import"));
        assert_eq!(ctx.organization.as_deref(), Some("portline-be"));
        assert_eq!(ctx.metadata.get("branch").unwrap(), "Antwerp");
        assert_eq!(ctx.permissions, Role::Manager.permissions().to_vec());
    }
}
