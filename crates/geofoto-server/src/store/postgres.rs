use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use super::{escape_like, RecordStore, StoreError};
use crate::domain::Record;

/// Talks to the backend's Postgres database directly.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Builds an ILIKE pattern that matches `term` literally anywhere in the column.
fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like(term))
}

#[async_trait]
impl RecordStore for PgStore {
    fn backend_tag(&self) -> &'static str {
        "postgres"
    }

    async fn list_recent(&self) -> Result<Vec<Record>, StoreError> {
        let records: Vec<Record> = sqlx::query_as(r#"SELECT * FROM usaha_foto ORDER BY "timestamp" DESC"#)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Record>, StoreError> {
        let record: Option<Record> = sqlx::query_as("SELECT * FROM usaha_foto WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn page(
        &self,
        business_filter: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Record>, StoreError> {
        let records: Vec<Record> = sqlx::query_as(
            r#"
            SELECT * FROM usaha_foto
            WHERE ($1::text IS NULL OR nama_usaha ILIKE $1)
            ORDER BY "timestamp" DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(business_filter.map(contains_pattern))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn count(&self, business_filter: Option<&str>) -> Result<i64, StoreError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM usaha_foto WHERE ($1::text IS NULL OR nama_usaha ILIKE $1)",
        )
        .bind(business_filter.map(contains_pattern))
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    async fn count_since(&self, since: DateTime<Utc>) -> Result<i64, StoreError> {
        let total: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM usaha_foto WHERE "timestamp" >= $1"#)
                .bind(since)
                .fetch_one(&self.pool)
                .await?;
        Ok(total)
    }

    async fn submitter_names(&self) -> Result<Vec<String>, StoreError> {
        let names: Vec<String> = sqlx::query_scalar("SELECT nama_penginput FROM usaha_foto")
            .fetch_all(&self.pool)
            .await?;
        Ok(names)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
