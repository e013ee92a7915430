pub mod catalog;
pub mod client;

use std::collections::BTreeSet;
use std::path::PathBuf;

use url::Url;

use crate::error::AppResult;

pub use catalog::{Catalog, PluginInfo};
pub use client::DispatcherClient;

/// Read-only view of the installable plugins and check modules.
pub trait PluginRegistry {
    fn plugin_keys(&self) -> BTreeSet<String>;
    fn module_keys(&self) -> BTreeSet<String>;
    fn default_plugins(&self) -> BTreeSet<String>;

    fn contains_plugin(&self, key: &str) -> bool {
        self.plugin_keys().contains(key)
    }

    fn contains_module(&self, key: &str) -> bool {
        self.module_keys().contains(key)
    }
}

/// Where the catalog comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrySource {
    File(PathBuf),
    Dispatcher(Url),
    None,
}

impl RegistrySource {
    /// `http(s)://` values name a dispatcher, anything else a catalog file.
    pub fn parse(raw: Option<&str>) -> AppResult<Self> {
        let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Ok(Self::None);
        };

        if raw.starts_with("http://") || raw.starts_with("https://") {
            return Ok(Self::Dispatcher(Url::parse(raw)?));
        }

        Ok(Self::File(PathBuf::from(raw)))
    }

    pub async fn load(&self, client: &DispatcherClient) -> AppResult<Catalog> {
        match self {
            Self::File(path) => Catalog::load(path),
            Self::Dispatcher(url) => client.fetch_catalog(url).await,
            Self::None => {
                tracing::warn!(
                    "no plugin registry configured; plugin and module selections will be rejected"
                );
                Ok(Catalog::default())
            }
        }
    }
}
