//! Navigation items and the conditions that gate them.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::{Permission, Resource, Role, UserContext};
use crate::permissions::PermissionService;

/// Code-only predicate over a user context.
pub type CustomCheck = Arc<dyn Fn(&UserContext) -> bool + Send + Sync>;

/// Predicate deciding visibility of an item or applicability of a
/// configuration.
///
/// Every clause that is present must pass. An empty condition always passes.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MenuCondition {
    /// All of these must be held (flat permission list).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_permissions: Option<Vec<Permission>>,
    /// At least one of these roles must be held.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_roles: Option<Vec<Role>>,
    /// Each resource must grant at least one action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_resources: Option<Vec<Resource>>,
    /// Accepted departments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<Vec<String>>,
    /// Accepted organizations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<Vec<String>>,
    #[serde(skip)]
    pub custom_check: Option<CustomCheck>,
}

impl MenuCondition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn permissions(mut self, permissions: impl Into<Vec<Permission>>) -> Self {
        self.required_permissions = Some(permissions.into());
        self
    }

    pub fn roles(mut self, roles: impl Into<Vec<Role>>) -> Self {
        self.allowed_roles = Some(roles.into());
        self
    }

    pub fn resources(mut self, resources: impl Into<Vec<Resource>>) -> Self {
        self.required_resources = Some(resources.into());
        self
    }

    pub fn departments<I, S>(mut self, departments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.department = Some(departments.into_iter().map(Into::into).collect());
        self
    }

    pub fn organizations<I, S>(mut self, organizations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.organization = Some(organizations.into_iter().map(Into::into).collect());
        self
    }

    pub fn custom(mut self, check: impl Fn(&UserContext) -> bool + Send + Sync + 'static) -> Self {
        self.custom_check = Some(Arc::new(check));
        self
    }

    /// Evaluate against a context, stopping at the first failing clause.
    pub fn matches(&self, context: &UserContext) -> bool {
        if let Some(required) = &self.required_permissions
            && !PermissionService::has_all_permissions(context, required, None)
        {
            return false;
        }

        if let Some(allowed) = &self.allowed_roles
            && !PermissionService::has_any_role(context, allowed)
        {
            return false;
        }

        if let Some(resources) = &self.required_resources
            && !resources
                .iter()
                .all(|r| !PermissionService::get_resource_permissions(context, *r).is_empty())
        {
            return false;
        }

        if let Some(departments) = &self.department
            && !member_of(departments, context.department.as_deref())
        {
            return false;
        }

        if let Some(organizations) = &self.organization
            && !member_of(organizations, context.organization.as_deref())
        {
            return false;
        }

        match &self.custom_check {
            Some(check) => check(context),
            None => true,
        }
    }
}

fn member_of(accepted: &[String], value: Option<&str>) -> bool {
    value.is_some_and(|v| accepted.iter().any(|a| a == v))
}

impl fmt::Debug for MenuCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuCondition")
            .field("required_permissions", &self.required_permissions)
            .field("allowed_roles", &self.allowed_roles)
            .field("required_resources", &self.required_resources)
            .field("department", &self.department)
            .field("organization", &self.organization)
            .field("custom_check", &self.custom_check.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// A navigation entry, possibly with children of the same shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalNavigationItem {
    pub id: String,
    pub icon: String,
    /// Translation key for the label.
    pub label_key: String,
    pub href: String,
    /// Sort position among siblings (ascending).
    #[serde(default)]
    pub order: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ConditionalNavigationItem>,
    /// Absent means always visible. Never sent to clients.
    #[serde(default, skip_serializing)]
    pub condition: Option<MenuCondition>,
}

impl ConditionalNavigationItem {
    pub fn new(id: &str, icon: &str, href: &str, order: i32) -> Self {
        Self {
            id: id.to_string(),
            icon: icon.to_string(),
            label_key: format!("navigation.{id}"),
            href: href.to_string(),
            order,
            children: Vec::new(),
            condition: None,
        }
    }

    pub fn when(mut self, condition: MenuCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_children(mut self, children: Vec<ConditionalNavigationItem>) -> Self {
        self.children = children;
        self
    }
}

/// A complete navigation tree and the condition under which it applies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuConfiguration {
    pub id: String,
    pub name: String,
    /// Higher wins.
    pub priority: i32,
    #[serde(default)]
    pub applies: MenuCondition,
    pub items: Vec<ConditionalNavigationItem>,
}
