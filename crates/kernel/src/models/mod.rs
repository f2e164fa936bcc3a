//! Identity and access models.

pub mod role;
pub mod user;

pub use role::{Permission, Resource, Role, RoleDefinition, UnknownRole};
pub use user::{ContextExtras, Session, UserContext, UserProfile};
