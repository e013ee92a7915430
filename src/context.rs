use crate::config::{self, AppPaths, Settings};
use crate::error::AppResult;
use crate::output::Output;
use crate::registry::{Catalog, DispatcherClient, RegistrySource};
use crate::store::FileProfileStore;

#[derive(Debug)]
pub struct AppContext {
    pub owner: Option<String>,
    pub paths: AppPaths,
    pub settings: Settings,
    pub store: FileProfileStore,
    pub registry_source: RegistrySource,
    pub dispatcher: DispatcherClient,
    pub output: Output,
}

impl AppContext {
    pub fn bootstrap(
        owner: Option<String>,
        registry: Option<String>,
        json: bool,
    ) -> AppResult<Self> {
        let paths = AppPaths::discover()?;
        Self::with_paths(paths, owner, registry, json)
    }

    pub fn with_paths(
        paths: AppPaths,
        owner: Option<String>,
        registry: Option<String>,
        json: bool,
    ) -> AppResult<Self> {
        let settings = config::load_settings(&paths)?;
        let registry_source =
            RegistrySource::parse(registry.as_deref().or_else(|| settings.registry()))?;
        let store = FileProfileStore::new(paths.profiles_file());
        let output = Output::new(json);

        tracing::debug!(store = %store.path().display(), ?registry_source, "context ready");

        Ok(Self {
            owner,
            paths,
            settings,
            store,
            registry_source,
            dispatcher: DispatcherClient::new(),
            output,
        })
    }

    pub fn owner(&self) -> AppResult<String> {
        config::resolve_owner(self.owner.as_deref(), &self.settings)
    }

    pub async fn registry(&self) -> AppResult<Catalog> {
        self.registry_source.load(&self.dispatcher).await
    }
}
