// Application state module
// Immutable state shared by every connection

use crate::render::Templates;
use crate::store::PageStore;

use super::types::Config;

/// Application state
///
/// Built once at startup and handed to each connection behind an `Arc`.
/// Nothing in here is mutated after construction.
pub struct AppState {
    pub config: Config,
    pub store: PageStore,
    pub templates: Templates,
}

impl AppState {
    pub const fn new(config: Config, store: PageStore, templates: Templates) -> Self {
        Self {
            config,
            store,
            templates,
        }
    }

    /// Load templates and open the page store described by `config`
    ///
    /// Fails when templates cannot be parsed or the pages directory cannot be created.
    pub async fn from_config(config: Config) -> Result<Self, crate::error::WikiError> {
        let templates = Templates::load(&config.storage.templates_dir)?;
        let store = PageStore::new(&config.storage.pages_dir);
        store.ensure_dir().await?;
        Ok(Self::new(config, store, templates))
    }

    pub const fn access_log(&self) -> bool {
        self.config.logging.access_log
    }
}
