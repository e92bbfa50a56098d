// src/core/service_client.rs
//! JSON HTTP client shared by every external service (dataset host, chat,
//! embeddings, vector store)

use anyhow::{Context, Result};
use reqwest::RequestBuilder;

use crate::app_log;

pub struct ServiceClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl ServiceClient {
    pub fn new(base_url: impl Into<String>, timeout_seconds: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: None,
        })
    }

    /// Send `Authorization: Bearer <key>` with every request
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, endpoint: &str) -> String {
        if endpoint.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}{}", self.base_url.trim_end_matches('/'), endpoint)
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    /// POST a JSON payload and decode the JSON reply
    pub async fn post_json<T, R>(&self, endpoint: &str, payload: &T) -> Result<R>
    where
        T: serde::Serialize,
        R: serde::de::DeserializeOwned,
    {
        let url = self.url(endpoint);
        app_log!(trace, "POST {}", url);

        let response = self
            .authorized(self.client.post(&url))
            .json(payload)
            .send()
            .await
            .with_context(|| format!("Failed to POST to {}", url))?;

        let status = response.status();
        if status.is_success() {
            response
                .json::<R>()
                .await
                .with_context(|| format!("Failed to parse JSON response from {}", url))
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            app_log!(error, "{} returned {}: {}", url, status, error_text);
            anyhow::bail!("HTTP {} error: {}", status, error_text)
        }
    }

    /// GET and decode the JSON reply
    pub async fn get<R>(&self, endpoint: &str) -> Result<R>
    where
        R: serde::de::DeserializeOwned,
    {
        let url = self.url(endpoint);
        app_log!(trace, "GET {}", url);

        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .with_context(|| format!("Failed to GET from {}", url))?;

        let status = response.status();
        if status.is_success() {
            response
                .json::<R>()
                .await
                .with_context(|| format!("Failed to parse JSON response from {}", url))
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            app_log!(error, "{} returned {}: {}", url, status, error_text);
            anyhow::bail!("HTTP {} error: {}", status, error_text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = ServiceClient::new("http://localhost:8000/", 5).unwrap();
        assert_eq!(
            client.url("/api/v1/collections"),
            "http://localhost:8000/api/v1/collections"
        );
    }

    #[test]
    fn test_empty_endpoint_uses_base_url_verbatim() {
        let client = ServiceClient::new("https://host/items?clean=true&format=json", 5).unwrap();
        assert_eq!(client.url(""), "https://host/items?clean=true&format=json");
        assert_eq!(client.base_url(), "https://host/items?clean=true&format=json");
    }
}
