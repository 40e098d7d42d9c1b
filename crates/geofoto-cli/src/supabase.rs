use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_RANGE;
use reqwest::{Client, RequestBuilder};
use uuid::Uuid;

use crate::capture::{CaptureError, PhotoBackend};
use crate::config::Backend;
use crate::model::{NewRecord, Record};

/// Storage and table access on the hosted backend, authenticated with the anon key.
pub struct SupabaseClient {
    client: Client,
    url: String,
    anon_key: String,
    bucket: String,
    table: String,
}

impl SupabaseClient {
    pub fn new(backend: &Backend<'_>) -> Self {
        Self {
            client: Client::new(),
            url: backend.url.to_string(),
            anon_key: backend.anon_key.to_string(),
            bucket: backend.bucket.to_string(),
            table: backend.table.to_string(),
        }
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.url, self.table)
    }

    fn object_url(&self, name: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.url, self.bucket, name)
    }

    pub fn public_object_url(&self, name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.url, self.bucket, name
        )
    }

    pub async fn upload_jpeg(&self, name: &str, bytes: Vec<u8>) -> Result<()> {
        let resp = self
            .authed(self.client.post(self.object_url(name)))
            .header("Content-Type", "image/jpeg")
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await
            .context("upload request failed")?;
        check(resp).await.map(|_| ())
    }

    pub async fn insert_record(&self, record: &NewRecord) -> Result<Record> {
        let resp = self
            .authed(self.client.post(self.table_url()))
            .header("Prefer", "return=representation")
            .json(&[record])
            .send()
            .await
            .context("insert request failed")?;
        let rows: Vec<Record> = check(resp)
            .await?
            .json()
            .await
            .context("failed to parse inserted row")?;
        rows.into_iter()
            .next()
            .context("backend returned no row for the insert")
    }

    /// Every record, newest first.
    pub async fn list_records(&self) -> Result<Vec<Record>> {
        let resp = self
            .authed(self.client.get(self.table_url()))
            .query(&[("select", "*"), ("order", "timestamp.desc")])
            .send()
            .await
            .context("list request failed")?;
        check(resp)
            .await?
            .json()
            .await
            .context("failed to parse records")
    }

    pub async fn find_record(&self, id: Uuid) -> Result<Option<Record>> {
        let resp = self
            .authed(self.client.get(self.table_url()))
            .query(&[("select", "*".to_string()), ("id", format!("eq.{id}"))])
            .send()
            .await
            .context("lookup request failed")?;
        let rows: Vec<Record> = check(resp)
            .await?
            .json()
            .await
            .context("failed to parse record")?;
        Ok(rows.into_iter().next())
    }

    /// Connection test: exact row count of the table without fetching rows.
    pub async fn count(&self) -> Result<i64> {
        let resp = self
            .authed(self.client.head(self.table_url()))
            .query(&[("select", "*")])
            .header("Prefer", "count=exact")
            .send()
            .await
            .context("count request failed")?;
        let resp = check(resp).await?;
        let range = resp
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .context("backend did not report a row count")?;
        range
            .rsplit_once('/')
            .and_then(|(_, total)| total.parse().ok())
            .with_context(|| format!("unusable Content-Range {range:?}"))
    }
}

async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.context("failed to read response")?;
    if let Ok(err) = serde_json::from_str::<serde_json::Value>(&body) {
        let message = err
            .get("message")
            .or_else(|| err.get("error"))
            .and_then(|m| m.as_str());
        if let Some(message) = message {
            bail!("{}: {}", status, message);
        }
    }
    bail!("request failed with status {}: {}", status, body);
}

#[async_trait]
impl PhotoBackend for SupabaseClient {
    async fn upload(&self, name: &str, bytes: Vec<u8>) -> Result<(), CaptureError> {
        self.upload_jpeg(name, bytes)
            .await
            .map_err(|e| CaptureError::UploadFailed(format!("{e:#}")))
    }

    fn public_url(&self, name: &str) -> String {
        self.public_object_url(name)
    }

    async fn insert(&self, record: &NewRecord) -> Result<Uuid, CaptureError> {
        self.insert_record(record)
            .await
            .map(|r| r.id)
            .map_err(|e| CaptureError::InsertFailed(format!("{e:#}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SupabaseClient {
        SupabaseClient::new(&Backend {
            url: "https://abc.supabase.co",
            anon_key: "anon",
            bucket: "fotos",
            table: "usaha_foto",
        })
    }

    #[test]
    fn builds_storage_urls() {
        let c = client();
        assert_eq!(
            c.object_url("foto_1.jpg"),
            "https://abc.supabase.co/storage/v1/object/fotos/foto_1.jpg"
        );
        assert_eq!(
            c.public_url("foto_1.jpg"),
            "https://abc.supabase.co/storage/v1/object/public/fotos/foto_1.jpg"
        );
        assert_eq!(c.table_url(), "https://abc.supabase.co/rest/v1/usaha_foto");
    }
}
