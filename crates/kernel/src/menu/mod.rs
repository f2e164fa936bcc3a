//! Role-based navigation.
//!
//! Menus are selected per user from a priority-ordered list of configurations
//! and then filtered item by item:
//! - Configuration selection by role tier (highest priority match wins)
//! - Recursive visibility conditions on items
//! - TTL-bounded caching of the user context and the configurations

pub mod builtin;
pub mod cache;
pub mod condition;
pub mod filter;
pub mod provider;
pub mod registry;

pub use cache::{CacheSlot, Clock, DEFAULT_TTL, ManualClock, NavigationCache, SystemClock};
pub use condition::{ConditionalNavigationItem, CustomCheck, MenuCondition, MenuConfiguration};
pub use filter::{FilterPolicy, can_user_access, filter_menu_items};
pub use provider::{DynamicNavigationProvider, NavigationOptions};
pub use registry::{MenuRegistry, MenuSource, ResolvedMenu};
