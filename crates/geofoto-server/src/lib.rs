pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod store;
pub mod telemetry;

use anyhow::Result;
use axum::Router;
use std::sync::Arc;

use crate::api::routes;
use crate::config::Config;
use crate::store::RecordStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub config: Config,
}

pub struct App {
    state: Arc<AppState>,
}

impl App {
    pub async fn new(config: Config) -> Result<Self> {
        let store = store::connect(&config).await?;
        Ok(Self::with_store(config, store))
    }

    /// Builds the app around an already constructed store.
    pub fn with_store(config: Config, store: Arc<dyn RecordStore>) -> Self {
        Self {
            state: Arc::new(AppState { store, config }),
        }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.state.store
    }

    pub fn router(&self) -> Router {
        routes::build(self.state.clone())
    }
}
