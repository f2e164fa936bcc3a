//! Portline Kernel Library
//!
//! Role-based permissions and dynamic navigation for the freight back
//! office. The `portline` binary serves the navigation API on top of it.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod menu;
pub mod models;
pub mod permissions;
pub mod routes;
pub mod state;

pub use config::Config;
pub use state::AppState;
