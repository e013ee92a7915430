use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::AppResult;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Acting user when `--owner` is not given.
    #[serde(default)]
    pub default_owner: Option<String>,
    /// Catalog file path or dispatcher URL.
    #[serde(default)]
    pub registry: Option<String>,
}

impl Settings {
    pub fn default_owner(&self) -> Option<&str> {
        self.default_owner
            .as_deref()
            .map(str::trim)
            .filter(|owner| !owner.is_empty())
    }

    pub fn registry(&self) -> Option<&str> {
        self.registry.as_deref()
    }
}

pub fn load(path: PathBuf) -> AppResult<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let raw = fs::read_to_string(path)?;
    let settings = serde_json::from_str(&raw)?;
    Ok(settings)
}

pub fn save(path: PathBuf, settings: &Settings) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let payload = serde_json::to_string_pretty(settings)?;
    fs::write(&path, payload)?;
    Ok(())
}
