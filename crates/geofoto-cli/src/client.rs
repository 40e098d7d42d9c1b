use anyhow::{anyhow, bail, Context, Result};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::config::Config;

/// Client for the geofoto read API server.
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: config.server.trim_end_matches('/').to_string(),
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_with_query(path, &[]).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url(path)?;
        self.send(url, query).await
    }

    /// Fetches one record. The id is sent as a single path segment even when it
    /// contains `/` or `?`, so the server gets to reject it.
    pub async fn get_record<T: DeserializeOwned>(&self, id: &str) -> Result<T> {
        let url = self.record_url(id)?;
        self.send(url, &[]).await
    }

    fn url(&self, path: &str) -> Result<Url> {
        Url::parse(&format!("{}{}", self.base_url, path))
            .with_context(|| format!("invalid server URL {}", self.base_url))
    }

    fn record_url(&self, id: &str) -> Result<Url> {
        let mut url = self.url("/api/data")?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("invalid server URL {}", self.base_url))?
            .push(id);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, url: Url, query: &[(&str, String)]) -> Result<T> {
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .context("request failed")?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        let body = resp.text().await.context("failed to read response")?;

        if !status.is_success() {
            if let Ok(err) = serde_json::from_str::<serde_json::Value>(&body) {
                if err.get("success").and_then(|s| s.as_bool()) == Some(false) {
                    let message = err
                        .get("error")
                        .and_then(|m| m.as_str())
                        .unwrap_or("unknown error");
                    bail!("{} ({})", message, status);
                }
            }
            bail!("request failed with status {}: {}", status, body);
        }

        serde_json::from_str(&body).context("failed to parse response")
    }
}
