//! Menu registry - holds the menu configurations and picks one per user.
//!
//! Configurations come either from the built-in role tiers or from a YAML or
//! JSON file. They are kept sorted by descending priority; the first one whose
//! `applies` condition matches the user wins.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::{debug, warn};

use super::builtin;
use super::condition::{ConditionalNavigationItem, MenuConfiguration};
use super::filter::{FilterPolicy, filter_menu_items};
use crate::models::UserContext;

/// Maximum menu file size (1 MB).
const MAX_MENU_FILE_SIZE: u64 = 1024 * 1024;

/// Where menu configurations are loaded from.
#[derive(Debug, Clone, Default)]
pub enum MenuSource {
    #[default]
    Builtin,
    /// Read from disk on every load.
    File(PathBuf),
    /// Already loaded, shared between providers.
    Loaded(Arc<MenuRegistry>),
}

impl MenuSource {
    /// Load the registry, falling back to the built-in tiers if a file
    /// cannot be read.
    pub fn load(&self) -> Arc<MenuRegistry> {
        match self {
            MenuSource::Builtin => Arc::new(MenuRegistry::builtin()),
            MenuSource::File(path) => match MenuRegistry::from_file(path) {
                Ok(registry) => Arc::new(registry),
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "failed to load menu configurations, using built-in menus"
                    );
                    Arc::new(MenuRegistry::builtin())
                }
            },
            MenuSource::Loaded(registry) => Arc::clone(registry),
        }
    }
}

/// A filtered menu and the configuration it came from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedMenu {
    /// `None` when the fallback menu was used.
    pub configuration_id: Option<String>,
    pub items: Vec<ConditionalNavigationItem>,
}

/// Registry of menu configurations, ordered by descending priority.
#[derive(Debug, Clone)]
pub struct MenuRegistry {
    configurations: Vec<MenuConfiguration>,
}

impl MenuRegistry {
    /// Create a registry. Equal priorities keep their input order.
    pub fn new(mut configurations: Vec<MenuConfiguration>) -> Self {
        configurations.sort_by(|a, b| b.priority.cmp(&a.priority));
        debug!(configurations = configurations.len(), "built menu registry");
        Self { configurations }
    }

    /// The built-in role tiers.
    pub fn builtin() -> Self {
        Self::new(builtin::configurations())
    }

    /// Load configurations from a `.json`, `.yml` or `.yaml` file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let size = std::fs::metadata(path)
            .with_context(|| format!("failed to stat {}", path.display()))?
            .len();
        if size > MAX_MENU_FILE_SIZE {
            bail!(
                "menu file {} is {size} bytes (limit {MAX_MENU_FILE_SIZE})",
                path.display()
            );
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            Some("yml" | "yaml") => Self::from_yaml(&content),
            _ => bail!("unsupported menu file extension: {}", path.display()),
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let configurations: Vec<MenuConfiguration> =
            serde_yml::from_str(content).context("invalid menu configuration YAML")?;
        Self::validated(configurations)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let configurations: Vec<MenuConfiguration> =
            serde_json::from_str(content).context("invalid menu configuration JSON")?;
        Self::validated(configurations)
    }

    fn validated(configurations: Vec<MenuConfiguration>) -> Result<Self> {
        let mut seen = HashSet::new();
        for config in &configurations {
            if !seen.insert(config.id.as_str()) {
                bail!("duplicate menu configuration id: {}", config.id);
            }
        }

        if configurations.is_empty() {
            warn!("menu file defines no configurations; every user gets the fallback menu");
        }

        Ok(Self::new(configurations))
    }

    /// All configurations, highest priority first.
    pub fn configurations(&self) -> &[MenuConfiguration] {
        &self.configurations
    }

    /// Get a configuration by id.
    pub fn get(&self, id: &str) -> Option<&MenuConfiguration> {
        self.configurations.iter().find(|c| c.id == id)
    }

    /// The highest-priority configuration whose `applies` condition matches.
    pub fn find_applicable_configuration(&self, context: &UserContext) -> Option<&MenuConfiguration> {
        self.configurations
            .iter()
            .find(|config| config.applies.matches(context))
    }

    /// Select a configuration and filter its items for the user.
    pub fn resolve(&self, context: &UserContext, policy: FilterPolicy) -> ResolvedMenu {
        match self.find_applicable_configuration(context) {
            Some(config) => {
                debug!(
                    user_id = %context.id,
                    configuration = %config.id,
                    "selected menu configuration"
                );
                ResolvedMenu {
                    configuration_id: Some(config.id.clone()),
                    items: filter_menu_items(&config.items, context, policy),
                }
            }
            None => {
                debug!(user_id = %context.id, "no menu configuration applies, using fallback");
                ResolvedMenu {
                    configuration_id: None,
                    items: builtin::fallback(),
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.configurations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }
}

impl Default for MenuRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
