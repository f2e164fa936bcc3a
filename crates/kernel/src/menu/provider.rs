//! Dynamic navigation provider.
//!
//! Resolves the current user through an [`IdentityBackend`], then selects and
//! filters a menu configuration for them. The user context and the menu
//! configurations are cached for a bounded TTL.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use parking_lot::Mutex;
use tracing::{debug, error, warn};

use super::cache::{Clock, DEFAULT_TTL, NavigationCache, SystemClock};
use super::condition::ConditionalNavigationItem;
use super::filter::{self, FilterPolicy};
use super::registry::{MenuRegistry, MenuSource, ResolvedMenu};
use crate::identity::IdentityBackend;
use crate::models::{ContextExtras, UserContext};
use crate::permissions::PermissionService;

/// Provider settings.
#[derive(Debug, Clone)]
pub struct NavigationOptions {
    pub ttl: Duration,
    pub policy: FilterPolicy,
    pub source: MenuSource,
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            policy: FilterPolicy::default(),
            source: MenuSource::Builtin,
        }
    }
}

/// Produces permission-filtered navigation trees for the current user.
pub struct DynamicNavigationProvider<B> {
    backend: B,
    clock: Arc<dyn Clock>,
    policy: FilterPolicy,
    source: MenuSource,
    /// Never held across an `.await`.
    cache: Mutex<NavigationCache>,
}

impl<B: IdentityBackend> DynamicNavigationProvider<B> {
    pub fn new(backend: B, options: NavigationOptions) -> Self {
        Self::with_clock(backend, options, Arc::new(SystemClock))
    }

    pub fn with_clock(backend: B, options: NavigationOptions, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend,
            clock,
            policy: options.policy,
            source: options.source,
            cache: Mutex::new(NavigationCache::new(options.ttl)),
        }
    }

    /// The current user's context.
    ///
    /// Returns `None` when there is no session or the backend fails; failures
    /// are logged, never propagated.
    pub async fn get_user_context(&self) -> Option<UserContext> {
        let now = self.clock.now();
        {
            let cache = self.cache.lock();
            if let Some(context) = cache.user_context.get(now, cache.ttl) {
                return Some(context);
            }
        }

        match self.fetch_user_context().await {
            Ok(Some(context)) => {
                self.cache
                    .lock()
                    .user_context
                    .set(context.clone(), self.clock.now());
                Some(context)
            }
            Ok(None) => None,
            Err(e) => {
                error!(error = %e, "failed to load user context");
                None
            }
        }
    }

    async fn fetch_user_context(&self) -> Result<Option<UserContext>> {
        let Some(session) = self.backend.current_session().await? else {
            debug!("no active session");
            return Ok(None);
        };

        let context = match self.backend.find_user_profile(session.user_id).await? {
            Some(profile) => {
                let email = profile.email.as_deref().unwrap_or(&session.email);
                PermissionService::create_user_context(
                    session.user_id,
                    email,
                    &profile.roles,
                    profile.extras(),
                )
            }
            None => {
                warn!(user_id = %session.user_id, "session has no user profile");
                PermissionService::create_user_context(
                    session.user_id,
                    &session.email,
                    std::iter::empty::<&str>(),
                    ContextExtras::default(),
                )
            }
        };

        debug!(
            user_id = %context.id,
            roles = ?context.roles,
            "loaded user context"
        );

        Ok(Some(context))
    }

    /// Drop everything cached and eagerly reload the user context.
    pub async fn refresh_cache(&self) -> Option<UserContext> {
        self.cache.lock().invalidate();
        self.get_user_context().await
    }

    /// The menu configurations, loaded from the source on a cache miss.
    ///
    /// A [`MenuSource::File`] is read synchronously; servers should pass a
    /// [`MenuSource::Loaded`] registry instead.
    pub fn get_menu_configurations(&self) -> Arc<MenuRegistry> {
        let now = self.clock.now();
        let mut cache = self.cache.lock();
        if let Some(registry) = cache.menu_configurations.get(now, cache.ttl) {
            return registry;
        }

        let registry = self.source.load();
        cache.menu_configurations.set(Arc::clone(&registry), now);
        registry
    }

    /// Filtered navigation tree for a user.
    pub fn get_menu_for_user(&self, context: &UserContext) -> Vec<ConditionalNavigationItem> {
        self.resolve_menu(context).items
    }

    /// Like [`Self::get_menu_for_user`], keeping the selected configuration id.
    pub fn resolve_menu(&self, context: &UserContext) -> ResolvedMenu {
        self.get_menu_configurations().resolve(context, self.policy)
    }

    /// Whether a single item is visible to the user.
    pub fn can_user_access(&self, item: &ConditionalNavigationItem, context: &UserContext) -> bool {
        filter::can_user_access(item, context)
    }
}
