// src/jobs/vectorizer.rs
//! Step 3 and similarity search over the job collection

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;

use super::record::StoredJob;
use crate::app_log;
use crate::core::Database;
use crate::llm::{Embedder, UpsertBatch, VectorStoreClient};

pub const EMBED_BATCH_SIZE: usize = 64;

#[derive(Debug, Clone, Serialize)]
pub struct VectorizeReport {
    pub embedded: usize,
    pub collection_count: u64,
}

pub struct JobVectorizer<'a, E> {
    embedder: &'a E,
    store: &'a VectorStoreClient,
}

impl<'a, E: Embedder> JobVectorizer<'a, E> {
    pub fn new(embedder: &'a E, store: &'a VectorStoreClient) -> Self {
        Self { embedder, store }
    }

    /// Embed the descriptions not yet in the store and upsert them keyed by job id
    pub async fn vectorize(&self, db: &Database) -> Result<VectorizeReport> {
        let jobs = db.jobs().pending_embedding().await?;
        app_log!(info, "Embedding {} new or changed jobs", jobs.len());

        let collection = self.store.get_or_create_collection().await?;
        let mut embedded = 0;

        for batch in jobs.chunks(EMBED_BATCH_SIZE) {
            let upsert = self.embed_batch(batch).await?;
            self.store.upsert(&collection, &upsert).await?;
            db.jobs().mark_embedded(&upsert.ids).await?;

            embedded += upsert.ids.len();
            app_log!(info, "Embedded {}/{} jobs", embedded, jobs.len());
        }

        let collection_count = self.store.count(&collection).await?;
        app_log!(
            info,
            "Vector store {} now holds {} documents",
            collection.name,
            collection_count
        );

        Ok(VectorizeReport {
            embedded,
            collection_count,
        })
    }

    async fn embed_batch(&self, batch: &[StoredJob]) -> Result<UpsertBatch> {
        let ids: Vec<String> = batch.iter().map(|job| job.record.job_id.clone()).collect();
        let documents: Vec<String> = batch
            .iter()
            .map(|job| job.record.job_description.clone())
            .collect();

        let embeddings = self
            .embedder
            .embed(&documents)
            .await
            .with_context(|| format!("Failed to embed batch starting at job {}", ids[0]))?;

        Ok(UpsertBatch {
            metadatas: ids.iter().map(|id| json!({ "job_id": id })).collect(),
            ids,
            embeddings,
            documents,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub job_id: String,
    pub distance: Option<f32>,
    #[serde(skip)]
    pub job: Option<StoredJob>,
}

pub struct JobSearch<'a, E> {
    embedder: &'a E,
    store: &'a VectorStoreClient,
}

impl<'a, E: Embedder> JobSearch<'a, E> {
    pub fn new(embedder: &'a E, store: &'a VectorStoreClient) -> Self {
        Self { embedder, store }
    }

    /// The `k` jobs closest to `text`, best first, hydrated from the database
    pub async fn similar(&self, db: &Database, text: &str, k: usize) -> Result<Vec<SearchHit>> {
        let query = vec![text.to_string()];
        let embedding = self
            .embedder
            .embed(&query)
            .await?
            .into_iter()
            .next()
            .context("No embedding returned for query")?;

        let collection = self.store.get_or_create_collection().await?;
        let matches = self.store.query(&collection, &embedding, k).await?;

        let mut hits = Vec::with_capacity(matches.len());
        for found in matches {
            let job = db.jobs().get(&found.job_id).await?;
            if job.is_none() {
                app_log!(warn, "Search hit {} is not in the database", found.job_id);
            }
            hits.push(SearchHit {
                job_id: found.job_id,
                distance: found.distance,
                job,
            });
        }

        app_log!(info, "Similarity search returned {} jobs", hits.len());
        Ok(hits)
    }
}
