// src/llm/embeddings.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;

use super::MissingApiKey;
use crate::app_log;
use crate::core::{ServiceClient, ServiceConfig};

pub trait Embedder {
    fn embed(&self, texts: &[String]) -> impl Future<Output = Result<Vec<Vec<f32>>>> + Send;
}

pub struct EmbeddingClient {
    client: ServiceClient,
    model: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

impl EmbeddingClient {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let api_key = config
            .openai_api_key
            .clone()
            .ok_or(MissingApiKey("OPENAI_API_KEY"))?;

        let client = ServiceClient::new(&config.openai_api_url, config.timeout_seconds)?
            .with_api_key(api_key);

        Ok(Self {
            client,
            model: config.embedding_model.clone(),
        })
    }
}

impl Embedder for EmbeddingClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        app_log!(debug, "Embedding {} texts with {}", texts.len(), self.model);

        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };
        let response: EmbeddingResponse = self
            .client
            .post_json("/embeddings", &request)
            .await
            .context("Embedding request failed")?;

        into_ordered_vectors(response, texts.len())
    }
}

fn into_ordered_vectors(response: EmbeddingResponse, expected: usize) -> Result<Vec<Vec<f32>>> {
    let mut data = response.data;
    if data.len() != expected {
        anyhow::bail!(
            "Embedding response has {} vectors for {} inputs",
            data.len(),
            expected
        );
    }

    data.sort_by_key(|item| item.index);
    Ok(data.into_iter().map(|item| item.embedding).collect())
}
