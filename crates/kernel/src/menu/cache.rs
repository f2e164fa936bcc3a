//! TTL-bounded cache slots for the navigation provider.
//!
//! Time comes from an injected [`Clock`] so expiry can be driven
//! deterministically in tests.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::registry::MenuRegistry;
use crate::models::UserContext;

/// Default time-to-live for cached navigation data (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += chrono::Duration::from_std(by).unwrap_or_else(|_| chrono::Duration::zero());
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock() = to;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// A single cached value and the time it was stored.
#[derive(Debug, Clone)]
pub struct CacheSlot<T> {
    entry: Option<(T, DateTime<Utc>)>,
}

impl<T: Clone> CacheSlot<T> {
    pub fn empty() -> Self {
        Self { entry: None }
    }

    /// The cached value, if it was stored less than `ttl` before `now`.
    pub fn get(&self, now: DateTime<Utc>, ttl: Duration) -> Option<T> {
        let (value, updated_at) = self.entry.as_ref()?;

        // A clock that went backwards still counts as fresh.
        let fresh = match (now - *updated_at).to_std() {
            Ok(elapsed) => elapsed < ttl,
            Err(_) => true,
        };

        fresh.then(|| value.clone())
    }

    pub fn set(&mut self, value: T, now: DateTime<Utc>) {
        self.entry = Some((value, now));
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.entry.as_ref().map(|(_, at)| *at)
    }
}

impl<T: Clone> Default for CacheSlot<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Cached navigation state: the user context and the menu configurations.
#[derive(Debug, Clone)]
pub struct NavigationCache {
    pub ttl: Duration,
    pub user_context: CacheSlot<UserContext>,
    pub menu_configurations: CacheSlot<Arc<MenuRegistry>>,
}

impl NavigationCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            user_context: CacheSlot::empty(),
            menu_configurations: CacheSlot::empty(),
        }
    }

    /// Empty both slots.
    pub fn invalidate(&mut self) {
        self.user_context.invalidate();
        self.menu_configurations.invalidate();
    }
}

impl Default for NavigationCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn slot_is_fresh_until_ttl() {
        let clock = ManualClock::default();
        let ttl = Duration::from_secs(300);
        let mut slot = CacheSlot::empty();
        slot.set("menu", clock.now());

        clock.advance(Duration::from_secs(299));
        assert_eq!(slot.get(clock.now(), ttl), Some("menu"));

        clock.advance(Duration::from_secs(1));
        assert_eq!(slot.get(clock.now(), ttl), None);
    }

    #[test]
    fn empty_slot_returns_none() {
        let slot: CacheSlot<u32> = CacheSlot::empty();
        assert!(slot.get(Utc::now(), DEFAULT_TTL).is_none());
        assert!(slot.updated_at().is_none());
    }

    #[test]
    fn clock_moving_backwards_keeps_entry() {
        let clock = ManualClock::default();
        let start = clock.now();
        let mut slot = CacheSlot::empty();
        slot.set(7, start);

        clock.set(start - chrono::Duration::seconds(30));
        assert_eq!(slot.get(clock.now(), DEFAULT_TTL), Some(7));
    }

    #[test]
    fn invalidate_clears_both_slots() {
        let now = Utc::now();
        let mut cache = NavigationCache::new(Duration::from_secs(60));
        cache
            .menu_configurations
            .set(Arc::new(MenuRegistry::builtin()), now);
        cache.invalidate();

        assert!(cache.menu_configurations.get(now, cache.ttl).is_none());
        assert!(cache.user_context.get(now, cache.ttl).is_none());
    }
}
