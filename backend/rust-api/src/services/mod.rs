use std::sync::Arc;

use crate::config::{Config, StorageBackend};
use crate::store::{InMemoryStore, MongoStore, SurveyStore};

pub mod question_service;
pub mod response_service;
pub mod scoring;
pub mod survey_service;

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn SurveyStore>,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store: Arc<dyn SurveyStore> = match config.storage_backend {
            StorageBackend::Mongo => {
                tracing::info!("Connecting to MongoDB...");

                let client = mongodb::Client::with_uri_str(&config.mongo_uri).await?;
                let store = MongoStore::new(client, &config.mongo_database);

                // Test connection
                tokio::time::timeout(std::time::Duration::from_secs(5), store.ping())
                    .await
                    .map_err(|_| anyhow::anyhow!("MongoDB ping timeout after 5s"))??;

                tracing::info!("MongoDB connected, database={}", config.mongo_database);
                Arc::new(store)
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory store, data will not survive a restart");
                Arc::new(InMemoryStore::new())
            }
        };

        Ok(Self { config, store })
    }

    pub fn with_store(config: Config, store: Arc<dyn SurveyStore>) -> Self {
        Self { config, store }
    }
}
