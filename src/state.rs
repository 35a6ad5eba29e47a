use std::sync::Arc;

use crate::config::AppConfig;
use crate::datastore::{DataStore, PostgrestStore};
use crate::generate::llm::{DashScopeClient, LlmClient};
use crate::schema::cache::SchemaCache;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DataStore>,
    pub schema: Arc<SchemaCache>,
    pub llm: Arc<dyn LlmClient>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let store: Arc<dyn DataStore> = Arc::new(PostgrestStore::new(&config.data_api)?);
        let llm: Arc<dyn LlmClient> = Arc::new(DashScopeClient::new(&config.llm)?);
        Ok(Self::from_parts(store, llm, config))
    }

    /// Assemble a state from already-built collaborators; the schema cache
    /// always wraps the given store.
    pub fn from_parts(
        store: Arc<dyn DataStore>,
        llm: Arc<dyn LlmClient>,
        config: Arc<AppConfig>,
    ) -> Self {
        let schema = Arc::new(SchemaCache::new(store.clone()));
        Self {
            store,
            schema,
            llm,
            config,
        }
    }
}
