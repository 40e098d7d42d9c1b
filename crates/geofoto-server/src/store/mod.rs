mod memory;
mod postgres;
mod postgrest;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use postgrest::PostgrestStore;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{Backend, Config, KeyRole};
use crate::domain::Record;

pub const TABLE: &str = "usaha_foto";

/// Escapes `LIKE` metacharacters so `term` only ever matches itself.
pub(crate) fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("backend request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected backend response: {0}")]
    Decode(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("backend unavailable")]
    Unavailable,
}

/// Read access to the photo records held by the backend.
///
/// Every listing is ordered by capture time, newest first. `business_filter` is a
/// case-insensitive substring match on the business name.
#[async_trait]
pub trait RecordStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    async fn list_recent(&self) -> Result<Vec<Record>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Record>, StoreError>;

    async fn page(
        &self,
        business_filter: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Record>, StoreError>;

    async fn count(&self, business_filter: Option<&str>) -> Result<i64, StoreError>;

    async fn count_since(&self, since: DateTime<Utc>) -> Result<i64, StoreError>;

    async fn submitter_names(&self) -> Result<Vec<String>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

pub async fn connect(config: &Config) -> anyhow::Result<Arc<dyn RecordStore>> {
    let store: Arc<dyn RecordStore> = match &config.backend {
        Backend::Memory => {
            warn!("using in-memory store, records are not persisted");
            Arc::new(MemoryStore::new())
        }
        Backend::Postgres {
            database_url,
            max_connections,
        } => Arc::new(PgStore::connect(database_url, *max_connections).await?),
        Backend::Supabase {
            url,
            api_key,
            key_role,
        } => {
            if *key_role == KeyRole::Anon {
                warn!("SUPABASE_SERVICE_ROLE_KEY not set, falling back to the anon key; row level security applies");
            }
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(config.request_timeout_secs))
                .build()?;
            Arc::new(PostgrestStore::new(client, url, api_key.clone()))
        }
    };

    info!(backend = store.backend_tag(), "record store ready");
    Ok(store)
}
