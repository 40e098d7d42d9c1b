use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::CONTENT_RANGE;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use uuid::Uuid;

use super::{escape_like, RecordStore, StoreError, TABLE};
use crate::domain::Record;

/// Supabase's REST interface (PostgREST) over the `usaha_foto` table.
pub struct PostgrestStore {
    client: Client,
    table_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct SubmitterRow {
    nama_penginput: String,
}

impl PostgrestStore {
    pub fn new(client: Client, base_url: &str, api_key: String) -> Self {
        Self {
            client,
            table_url: format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), TABLE),
            api_key,
        }
    }

    fn request(&self, method: Method) -> RequestBuilder {
        self.client
            .request(method, &self.table_url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn fetch<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<Vec<T>, StoreError> {
        let resp = check_status(req.send().await?).await?;
        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn exact_count(&self, req: RequestBuilder) -> Result<i64, StoreError> {
        let resp = check_status(req.header("Prefer", "count=exact").send().await?).await?;
        let range = resp
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| StoreError::Decode("missing Content-Range header".into()))?;
        parse_range_total(range)
    }
}

fn business_filter_param(term: &str) -> (&'static str, String) {
    // PostgREST turns every `*` into `%` with no escape, so a literal star
    // becomes the single-character wildcard.
    let pattern = escape_like(term).replace('*', "_");
    ("nama_usaha", format!("ilike.*{pattern}*"))
}

/// Total from a PostgREST `Content-Range` header such as `0-9/25` or `*/25`.
fn parse_range_total(value: &str) -> Result<i64, StoreError> {
    value
        .rsplit_once('/')
        .and_then(|(_, total)| total.trim().parse().ok())
        .ok_or_else(|| StoreError::Decode(format!("unusable Content-Range {value:?}")))
}

async fn check_status(resp: Response) -> Result<Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or(body);

    Err(StoreError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl RecordStore for PostgrestStore {
    fn backend_tag(&self) -> &'static str {
        "supabase"
    }

    async fn list_recent(&self) -> Result<Vec<Record>, StoreError> {
        let req = self
            .request(Method::GET)
            .query(&[("select", "*"), ("order", "timestamp.desc")]);
        self.fetch(req).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Record>, StoreError> {
        let req = self.request(Method::GET).query(&[
            ("select", "*".to_string()),
            ("id", format!("eq.{id}")),
            ("limit", "1".to_string()),
        ]);
        let rows: Vec<Record> = self.fetch(req).await?;
        Ok(rows.into_iter().next())
    }

    async fn page(
        &self,
        business_filter: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Record>, StoreError> {
        let mut req = self.request(Method::GET).query(&[
            ("select", "*".to_string()),
            ("order", "timestamp.desc".to_string()),
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
        ]);
        if let Some(term) = business_filter {
            req = req.query(&[business_filter_param(term)]);
        }
        self.fetch(req).await
    }

    async fn count(&self, business_filter: Option<&str>) -> Result<i64, StoreError> {
        let mut req = self.request(Method::HEAD).query(&[("select", "*")]);
        if let Some(term) = business_filter {
            req = req.query(&[business_filter_param(term)]);
        }
        self.exact_count(req).await
    }

    async fn count_since(&self, since: DateTime<Utc>) -> Result<i64, StoreError> {
        let req = self.request(Method::HEAD).query(&[
            ("select", "*".to_string()),
            (
                "timestamp",
                format!("gte.{}", since.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ),
        ]);
        self.exact_count(req).await
    }

    async fn submitter_names(&self) -> Result<Vec<String>, StoreError> {
        let req = self
            .request(Method::GET)
            .query(&[("select", "nama_penginput")]);
        let rows: Vec<SubmitterRow> = self.fetch(req).await?;
        Ok(rows.into_iter().map(|r| r.nama_penginput).collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.count(None).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_total_from_content_range() {
        assert_eq!(parse_range_total("0-9/25").unwrap(), 25);
        assert_eq!(parse_range_total("*/0").unwrap(), 0);
        assert!(parse_range_total("0-9/*").is_err());
        assert!(parse_range_total("garbage").is_err());
    }

    #[test]
    fn builds_table_url() {
        let store = PostgrestStore::new(
            Client::new(),
            "https://abc.supabase.co/",
            "key".into(),
        );
        assert_eq!(store.table_url, "https://abc.supabase.co/rest/v1/usaha_foto");
    }

    #[test]
    fn filter_uses_ilike_wildcards() {
        assert_eq!(
            business_filter_param("kopi"),
            ("nama_usaha", "ilike.*kopi*".to_string())
        );
    }

    #[test]
    fn filter_escapes_like_metacharacters() {
        assert_eq!(
            business_filter_param("100%_asli"),
            ("nama_usaha", r"ilike.*100\%\_asli*".to_string())
        );
        assert_eq!(
            business_filter_param(r"a\b*c"),
            ("nama_usaha", r"ilike.*a\\b_c*".to_string())
        );
    }
}
