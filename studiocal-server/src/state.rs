use std::sync::Arc;

use anyhow::Result;
use studiocal_core::config::StudioCalConfig;
use studiocal_core::{EventStore, ImportOptions, JsonFileStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn EventStore>,
    import_options: ImportOptions,
}

impl AppState {
    pub fn new(config: &StudioCalConfig) -> Result<Self> {
        let store = JsonFileStore::new(config.data_path());
        tracing::info!(path = %store.path().display(), "Using event store");

        Ok(Self::with_store(Arc::new(store), config.import_options()?))
    }

    pub fn with_store(store: Arc<dyn EventStore>, import_options: ImportOptions) -> Self {
        AppState {
            store,
            import_options,
        }
    }

    pub fn store(&self) -> &dyn EventStore {
        self.store.as_ref()
    }

    pub fn import_options(&self) -> &ImportOptions {
        &self.import_options
    }
}
