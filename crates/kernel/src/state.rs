//! Application state shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use moka::future::Cache;
use sqlx::PgPool;
use tracing::info;

use crate::config::Config;
use crate::db;
use crate::identity::{IdentityBackend, PgSessionBackends, SessionBackends};
use crate::menu::{DynamicNavigationProvider, MenuSource, NavigationOptions};

/// Maximum number of per-session navigation providers kept in memory.
const MAX_PROVIDERS: u64 = 10_000;

/// Upper bound on provider lifetime; moka rejects TTLs beyond 1000 years.
const MAX_PROVIDER_TTL: Duration = Duration::from_secs(86_400 * 365);

/// Navigation provider bound to one session token.
pub type SessionNavigation = DynamicNavigationProvider<Arc<dyn IdentityBackend>>;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// PostgreSQL connection pool.
    db: PgPool,

    /// Identity backend per session token.
    backends: Arc<dyn SessionBackends>,

    /// Settings for every navigation provider. The menu source is loaded
    /// once and shared by all providers.
    navigation: NavigationOptions,

    /// Session token -> provider. Entries expire with the navigation TTL so a
    /// provider never outlives its own cached context by much.
    providers: Cache<String, Arc<SessionNavigation>>,
}

impl AppState {
    /// Connect to the database and build the state.
    pub async fn new(config: &Config) -> Result<Self> {
        let db = db::create_pool(config)
            .await
            .context("failed to create database pool")?;

        info!(
            max_connections = config.database_max_connections,
            "database pool created"
        );

        Ok(Self::from_parts(db, config.navigation_options()))
    }

    /// Build the state from an existing pool, resolving sessions in it.
    pub fn from_parts(db: PgPool, navigation: NavigationOptions) -> Self {
        let backends = Arc::new(PgSessionBackends::new(db.clone()));
        Self::with_backends(db, navigation, backends)
    }

    /// Build the state with a custom identity lookup.
    pub fn with_backends(
        db: PgPool,
        navigation: NavigationOptions,
        backends: Arc<dyn SessionBackends>,
    ) -> Self {
        let providers = Cache::builder()
            .max_capacity(MAX_PROVIDERS)
            .time_to_live(navigation.ttl.min(MAX_PROVIDER_TTL))
            .build();

        let registry = navigation.source.load();
        info!(configurations = registry.len(), "menu configurations loaded");
        let navigation = NavigationOptions {
            source: MenuSource::Loaded(registry),
            ..navigation
        };

        Self {
            inner: Arc::new(AppStateInner {
                db,
                backends,
                navigation,
                providers,
            }),
        }
    }

    /// Navigation provider for a session token, created on first use.
    pub async fn navigation_for(&self, token: &str) -> Arc<SessionNavigation> {
        let backend = self.inner.backends.for_token(token);
        let options = self.inner.navigation.clone();

        self.inner
            .providers
            .get_with(token.to_string(), async move {
                Arc::new(DynamicNavigationProvider::new(backend, options))
            })
            .await
    }

    /// Check PostgreSQL connectivity.
    pub async fn postgres_healthy(&self) -> bool {
        db::check_health(&self.inner.db).await
    }
}
