use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RecordStore, StoreError};
use crate::domain::Record;

#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<Record>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records: RwLock::new(records),
            unavailable: AtomicBool::new(false),
        }
    }

    pub async fn insert(&self, record: Record) {
        self.records.write().await.push(record);
    }

    /// Makes every subsequent call fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }

    async fn filtered(&self, business_filter: Option<&str>) -> Vec<Record> {
        let needle = business_filter.map(str::to_lowercase);
        let mut rows: Vec<Record> = self
            .records
            .read()
            .await
            .iter()
            .filter(|r| match &needle {
                Some(n) => r.business_name.to_lowercase().contains(n),
                None => true,
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.captured_at.cmp(&a.captured_at));
        rows
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn list_recent(&self) -> Result<Vec<Record>, StoreError> {
        self.check()?;
        Ok(self.filtered(None).await)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Record>, StoreError> {
        self.check()?;
        Ok(self
            .records
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn page(
        &self,
        business_filter: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Record>, StoreError> {
        self.check()?;
        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(self
            .filtered(business_filter)
            .await
            .into_iter()
            .skip(skip)
            .take(take)
            .collect())
    }

    async fn count(&self, business_filter: Option<&str>) -> Result<i64, StoreError> {
        self.check()?;
        Ok(self.filtered(business_filter).await.len() as i64)
    }

    async fn count_since(&self, since: DateTime<Utc>) -> Result<i64, StoreError> {
        self.check()?;
        let records = self.records.read().await;
        Ok(records.iter().filter(|r| r.captured_at >= since).count() as i64)
    }

    async fn submitter_names(&self) -> Result<Vec<String>, StoreError> {
        self.check()?;
        let records = self.records.read().await;
        Ok(records.iter().map(|r| r.submitter_name.clone()).collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check()
    }
}
