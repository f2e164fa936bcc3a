//! CLI command implementations.
//!
//! These commands work from the static role tables and menu configurations
//! only; no database connection is opened.

use anyhow::{Context, Result};
use uuid::Uuid;

use crate::menu::{FilterPolicy, MenuSource};
use crate::models::{ContextExtras, Role};
use crate::permissions::PermissionService;

/// Print the role table with priorities and permission counts.
pub fn cmd_roles() {
    print!("{}", roles_table());
}

fn roles_table() -> String {
    let mut out = format!(
        "{:<14} {:<10} {:<22} {:<12} {}\n{}\n",
        "ROLE",
        "PRIORITY",
        "LABEL",
        "PERMISSIONS",
        "RESOURCES",
        "-".repeat(72)
    );

    for role in Role::ALL {
        let definition = role.definition();
        let resources: Vec<&str> = role
            .resource_grants()
            .iter()
            .map(|(resource, _)| resource.as_str())
            .collect();

        out.push_str(&format!(
            "{:<14} {:<10} {:<22} {:<12} {}\n",
            role.as_str(),
            definition.priority,
            definition.label,
            role.permissions().len(),
            resources.join(",")
        ));
    }

    out
}

/// Print the menu a user with the given roles would see, as JSON.
pub fn cmd_menu(
    roles: &[String],
    department: Option<String>,
    organization: Option<String>,
    source: &MenuSource,
    policy: FilterPolicy,
) -> Result<()> {
    for name in roles {
        if name.parse::<Role>().is_err() {
            eprintln!("warning: ignoring unknown role '{name}'");
        }
    }

    let json = menu_json(roles, department, organization, source, policy)?;
    println!("{json}");

    Ok(())
}

fn menu_json(
    roles: &[String],
    department: Option<String>,
    organization: Option<String>,
    source: &MenuSource,
    policy: FilterPolicy,
) -> Result<String> {
    let context = PermissionService::create_user_context(
        Uuid::nil(),
        "cli@localhost",
        roles,
        ContextExtras {
            department,
            organization,
            ..Default::default()
        },
    );

    let menu = source.load().resolve(&context, policy);
    serde_json::to_string_pretty(&menu).context("failed to serialize menu")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use serde_json::Value;

    use super::*;

    fn menu(roles: &[&str], policy: FilterPolicy) -> Value {
        let roles: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
        let json = menu_json(&roles, None, None, &MenuSource::Builtin, policy).unwrap();
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn roles_table_lists_every_role() {
        let table = roles_table();
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 2 + Role::ALL.len());
        assert!(lines[0].starts_with("ROLE"));
        assert!(lines[2].starts_with("super_admin"));
        assert!(lines.last().unwrap().starts_with("guest"));
    }

    #[test]
    fn menu_json_selects_configuration() {
        let value = menu(&["manager"], FilterPolicy::default());
        assert_eq!(value["configurationId"], "manager_menu");
        assert!(value["items"].as_array().is_some_and(|items| !items.is_empty()));
    }

    #[test]
    fn menu_json_hides_conditions() {
        let value = menu(&["super_admin"], FilterPolicy::default());
        assert!(!value.to_string().contains("condition\""));
        assert_eq!(value["items"][0]["labelKey"], "navigation.dashboard");
    }

    #[test]
    fn unknown_roles_get_fallback_menu() {
        let value = menu(&["forklift_driver"], FilterPolicy::default());
        assert!(value["configurationId"].is_null());
        assert_eq!(value["items"].as_array().unwrap().len(), 1);
        assert_eq!(value["items"][0]["href"], "/dashboard");
    }

    #[test]
    fn cmd_menu_succeeds_for_builtin_source() {
        let roles = vec!["viewer".to_string(), "nobody".to_string()];
        assert!(cmd_menu(&roles, None, None, &MenuSource::Builtin, FilterPolicy::default()).is_ok());
    }
}
