//! Portline test utilities.
//!
//! Helpers for integration testing: user context fixtures and an identity
//! backend that records how often it is called.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, bail};
use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use portline_kernel::identity::{IdentityBackend, SessionBackends};
use portline_kernel::models::{ContextExtras, Session, UserContext, UserProfile};
use portline_kernel::permissions::PermissionService;

/// Build a context from role names, the way the provider would.
pub fn context_with_roles(roles: &[&str]) -> UserContext {
    PermissionService::create_user_context(
        Uuid::nil(),
        "test@portline.test",
        roles.iter().copied(),
        ContextExtras::default(),
    )
}

/// Create a test profile with default values.
pub fn test_profile(user_id: Uuid, roles: &[&str]) -> UserProfile {
    UserProfile {
        id: user_id,
        email: Some("operator@portline.test".to_string()),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        department: None,
        organization: None,
        metadata: serde_json::json!({}),
    }
}

/// What the backend should answer.
#[derive(Debug, Clone)]
enum Behavior {
    Serve {
        session: Option<Session>,
        profile: Option<UserProfile>,
    },
    FailSession,
    FailProfile(Session),
}

/// In-memory [`IdentityBackend`] that counts its calls.
///
/// Clones share the same counters and behavior.
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    behavior: Arc<Mutex<Behavior>>,
    session_calls: Arc<AtomicUsize>,
    profile_calls: Arc<AtomicUsize>,
}

impl RecordingBackend {
    fn with(behavior: Behavior) -> Self {
        Self {
            behavior: Arc::new(Mutex::new(behavior)),
            session_calls: Arc::new(AtomicUsize::new(0)),
            profile_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A signed-in user with the given roles.
    pub fn signed_in(roles: &[&str]) -> Self {
        let user_id = Uuid::now_v7();
        Self::with(Behavior::Serve {
            session: Some(Session {
                user_id,
                email: "session@portline.test".to_string(),
            }),
            profile: Some(test_profile(user_id, roles)),
        })
    }

    /// A session whose user has no profile row.
    pub fn without_profile() -> Self {
        Self::with(Behavior::Serve {
            session: Some(Session {
                user_id: Uuid::now_v7(),
                email: "orphan@portline.test".to_string(),
            }),
            profile: None,
        })
    }

    /// No active session.
    pub fn signed_out() -> Self {
        Self::with(Behavior::Serve {
            session: None,
            profile: None,
        })
    }

    /// Session lookup fails.
    pub fn failing() -> Self {
        Self::with(Behavior::FailSession)
    }

    /// Session resolves, profile lookup fails.
    pub fn failing_profile() -> Self {
        Self::with(Behavior::FailProfile(Session {
            user_id: Uuid::now_v7(),
            email: "broken@portline.test".to_string(),
        }))
    }

    /// Replace the profile served from now on.
    pub fn set_profile(&self, profile: UserProfile) {
        if let Behavior::Serve { profile: current, .. } = &mut *self.behavior.lock() {
            *current = Some(profile);
        }
    }

    /// The user id of the served session, if any.
    pub fn user_id(&self) -> Option<Uuid> {
        match &*self.behavior.lock() {
            Behavior::Serve { session, .. } => session.as_ref().map(|s| s.user_id),
            Behavior::FailProfile(session) => Some(session.user_id),
            Behavior::FailSession => None,
        }
    }

    pub fn session_calls(&self) -> usize {
        self.session_calls.load(Ordering::SeqCst)
    }

    pub fn profile_calls(&self) -> usize {
        self.profile_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityBackend for RecordingBackend {
    async fn current_session(&self) -> Result<Option<Session>> {
        self.session_calls.fetch_add(1, Ordering::SeqCst);
        let behavior = self.behavior.lock().clone();
        match behavior {
            Behavior::Serve { session, .. } => Ok(session),
            Behavior::FailSession => bail!("session store unavailable"),
            Behavior::FailProfile(session) => Ok(Some(session)),
        }
    }

    async fn find_user_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        let behavior = self.behavior.lock().clone();
        match behavior {
            Behavior::Serve { profile, .. } => Ok(profile.filter(|p| p.id == user_id)),
            Behavior::FailSession | Behavior::FailProfile(_) => {
                bail!("profile lookup failed for {user_id}")
            }
        }
    }
}

/// Maps bearer tokens to [`RecordingBackend`]s. Unknown tokens have no session.
#[derive(Debug, Clone, Default)]
pub struct TokenBackends {
    tokens: HashMap<String, RecordingBackend>,
}

impl TokenBackends {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `backend` for `token`.
    pub fn with_token(mut self, token: &str, backend: RecordingBackend) -> Self {
        self.tokens.insert(token.to_string(), backend);
        self
    }
}

impl SessionBackends for TokenBackends {
    fn for_token(&self, token: &str) -> Arc<dyn IdentityBackend> {
        let backend = self
            .tokens
            .get(token)
            .cloned()
            .unwrap_or_else(RecordingBackend::signed_out);
        Arc::new(backend)
    }
}
