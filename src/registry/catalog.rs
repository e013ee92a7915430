use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

use super::PluginRegistry;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInfo {
    #[serde(default)]
    pub default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Snapshot of the plugins and check modules a dispatcher can run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub plugins: BTreeMap<String, PluginInfo>,
    #[serde(default)]
    pub modules: BTreeSet<String>,
}

impl Catalog {
    pub fn load(path: &Path) -> AppResult<Self> {
        let raw = fs::read_to_string(path).map_err(|err| {
            AppError::Registry(format!(
                "unable to read plugin catalog {}: {err}",
                path.display()
            ))
        })?;
        let catalog = serde_json::from_str(&raw)?;
        Ok(catalog)
    }

    pub fn with_plugin(mut self, key: impl Into<String>, default: bool) -> Self {
        self.plugins.insert(
            key.into(),
            PluginInfo {
                default,
                description: None,
            },
        );
        self
    }

    pub fn with_module(mut self, key: impl Into<String>) -> Self {
        self.modules.insert(key.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty() && self.modules.is_empty()
    }
}

impl PluginRegistry for Catalog {
    fn plugin_keys(&self) -> BTreeSet<String> {
        self.plugins.keys().cloned().collect()
    }

    fn module_keys(&self) -> BTreeSet<String> {
        self.modules.clone()
    }

    fn default_plugins(&self) -> BTreeSet<String> {
        self.plugins
            .iter()
            .filter(|(_, info)| info.default)
            .map(|(key, _)| key.clone())
            .collect()
    }

    fn contains_plugin(&self, key: &str) -> bool {
        self.plugins.contains_key(key)
    }

    fn contains_module(&self, key: &str) -> bool {
        self.modules.contains(key)
    }
}
