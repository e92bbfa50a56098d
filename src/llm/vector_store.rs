// src/llm/vector_store.rs
//! Chroma REST client for the job collection

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::app_log;
use crate::core::{ServiceClient, ServiceConfig};

pub struct VectorStoreClient {
    client: ServiceClient,
    collection_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
}

/// Documents written in one upsert; all vectors share an index
#[derive(Debug, Serialize)]
pub struct UpsertBatch {
    pub ids: Vec<String>,
    pub embeddings: Vec<Vec<f32>>,
    pub documents: Vec<String>,
    pub metadatas: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryMatch {
    pub job_id: String,
    pub distance: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    ids: Vec<Vec<String>>,
    #[serde(default)]
    distances: Option<Vec<Vec<f32>>>,
    #[serde(default)]
    metadatas: Option<Vec<Vec<Option<Value>>>>,
}

impl VectorStoreClient {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        Ok(Self {
            client: ServiceClient::new(&config.chroma_url, config.timeout_seconds)?,
            collection_name: config.chroma_collection.clone(),
        })
    }

    pub async fn get_or_create_collection(&self) -> Result<Collection> {
        let payload = json!({ "name": self.collection_name, "get_or_create": true });
        let collection: Collection = self
            .client
            .post_json("/api/v1/collections", &payload)
            .await
            .with_context(|| format!("Failed to open collection {}", self.collection_name))?;

        app_log!(debug, "Using collection {} ({})", collection.name, collection.id);
        Ok(collection)
    }

    pub async fn upsert(&self, collection: &Collection, batch: &UpsertBatch) -> Result<()> {
        let endpoint = format!("/api/v1/collections/{}/upsert", collection.id);
        let _: Value = self
            .client
            .post_json(&endpoint, batch)
            .await
            .with_context(|| format!("Failed to upsert {} documents", batch.ids.len()))?;
        Ok(())
    }

    pub async fn query(
        &self,
        collection: &Collection,
        embedding: &[f32],
        n_results: usize,
    ) -> Result<Vec<QueryMatch>> {
        let endpoint = format!("/api/v1/collections/{}/query", collection.id);
        let payload = json!({
            "query_embeddings": [embedding],
            "n_results": n_results,
            "include": ["metadatas", "distances"],
        });

        let response: Value = self
            .client
            .post_json(&endpoint, &payload)
            .await
            .context("Vector store query failed")?;

        parse_query_response(response)
    }

    pub async fn count(&self, collection: &Collection) -> Result<u64> {
        let endpoint = format!("/api/v1/collections/{}/count", collection.id);
        self.client
            .get(&endpoint)
            .await
            .context("Failed to count collection documents")
    }
}

/// Matches for the first query embedding. The `job_id` metadata wins over the
/// document id when both are present.
pub fn parse_query_response(response: Value) -> Result<Vec<QueryMatch>> {
    let response: QueryResponse =
        serde_json::from_value(response).context("Unexpected vector store query response")?;

    let ids = response.ids.into_iter().next().unwrap_or_default();
    let distances = response
        .distances
        .and_then(|d| d.into_iter().next())
        .unwrap_or_default();
    let metadatas = response
        .metadatas
        .and_then(|m| m.into_iter().next())
        .unwrap_or_default();

    Ok(ids
        .into_iter()
        .enumerate()
        .map(|(i, id)| {
            let job_id = metadatas
                .get(i)
                .and_then(|meta| meta.as_ref())
                .and_then(|meta| meta.get("job_id"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or(id);

            QueryMatch {
                job_id,
                distance: distances.get(i).copied(),
            }
        })
        .collect())
}
