//! Identity backend: resolves the current session and the user profile.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Session, UserProfile};

/// Source of session and profile data for the navigation provider.
#[async_trait]
pub trait IdentityBackend: Send + Sync {
    /// The active session, if any.
    async fn current_session(&self) -> Result<Option<Session>>;

    /// The extended profile of a user.
    async fn find_user_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>>;
}

#[async_trait]
impl<T: IdentityBackend + ?Sized> IdentityBackend for Arc<T> {
    async fn current_session(&self) -> Result<Option<Session>> {
        (**self).current_session().await
    }

    async fn find_user_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
        (**self).find_user_profile(user_id).await
    }
}

/// Hands out the identity backend for a bearer token.
pub trait SessionBackends: Send + Sync {
    fn for_token(&self, token: &str) -> Arc<dyn IdentityBackend>;
}

/// Resolves every token against PostgreSQL.
#[derive(Clone)]
pub struct PgSessionBackends {
    pool: PgPool,
}

impl PgSessionBackends {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SessionBackends for PgSessionBackends {
    fn for_token(&self, token: &str) -> Arc<dyn IdentityBackend> {
        Arc::new(PgIdentityBackend::new(self.pool.clone(), token))
    }
}

/// PostgreSQL backend bound to one session token.
#[derive(Clone)]
pub struct PgIdentityBackend {
    pool: PgPool,
    token: String,
}

impl PgIdentityBackend {
    pub fn new(pool: PgPool, token: impl Into<String>) -> Self {
        Self {
            pool,
            token: token.into(),
        }
    }
}

#[async_trait]
impl IdentityBackend for PgIdentityBackend {
    async fn current_session(&self) -> Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT s.user_id, u.email
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = $1 AND s.expires_at > now()
            "#,
        )
        .bind(&self.token)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch session")?;

        Ok(session)
    }

    async fn find_user_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id,
                   email,
                   COALESCE(roles, '{}') AS roles,
                   department,
                   organization,
                   COALESCE(metadata, '{}'::jsonb) AS metadata
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch user profile")?;

        Ok(profile)
    }
}
