//! User identity models: sessions, profiles and the per-request context.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::role::{Permission, Role};

/// Active backend session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
}

/// Extended user profile row.
///
/// Roles are kept as raw strings; unrecognized names are dropped when the
/// [`UserContext`] is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: Option<String>,
    pub roles: Vec<String>,
    pub department: Option<String>,
    pub organization: Option<String>,
    pub metadata: Value,
}

impl UserProfile {
    /// Context fields carried over from the profile.
    pub fn extras(&self) -> ContextExtras {
        let metadata = match &self.metadata {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };

        ContextExtras {
            department: self.department.clone(),
            organization: self.organization.clone(),
            metadata,
        }
    }
}

/// Optional fields merged into a [`UserContext`] on creation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextExtras {
    pub department: Option<String>,
    pub organization: Option<String>,
    pub metadata: Map<String, Value>,
}

/// Identity and capabilities of the current user.
///
/// Built once per request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserContext {
    pub id: Uuid,
    pub email: String,
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn profile_extras_keep_object_metadata() {
        let profile = UserProfile {
            id: Uuid::nil(),
            email: None,
            roles: vec![],
            department: Some("export".to_string()),
            organization: None,
            metadata: serde_json::json!({"branch": "Le Havre"}),
        };

        let extras = profile.extras();
        assert_eq!(extras.department.as_deref(), Some("export"));
        assert_eq!(extras.metadata.get("branch").unwrap(), "Le Havre");
    }

    #[test]
    fn profile_extras_ignore_non_object_metadata() {
        let profile = UserProfile {
            id: Uuid::nil(),
            email: None,
            roles: vec![],
            department: None,
            organization: None,
            metadata: Value::Null,
        };

        assert!(profile.extras().metadata.is_empty());
    }
}
