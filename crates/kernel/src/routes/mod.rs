//! HTTP route handlers.

pub mod health;
pub mod helpers;
pub mod navigation;
