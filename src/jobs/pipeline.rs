// src/jobs/pipeline.rs
//! The three ingestion steps and the session gate between them

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Instant;

use super::extractor::DetailsExtractor;
use super::fetcher::{extract_listings, DatasetFetcher};
use super::outputs::save_outputs;
use super::preprocess::preprocess;
use super::vectorizer::JobVectorizer;
use crate::app_log;
use crate::core::{ConfigManager, Database};
use crate::llm::{ChatClient, ChatCompletion, EmbeddingClient, VectorStoreClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStep {
    Fetch,
    Extract,
    Vectorize,
}

impl PipelineStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStep::Fetch => "fetch",
            PipelineStep::Extract => "extract",
            PipelineStep::Vectorize => "vectorize",
        }
    }

    /// The step that must have completed first, if any
    pub fn prerequisite(&self) -> Option<PipelineStep> {
        match self {
            PipelineStep::Extract => Some(PipelineStep::Fetch),
            PipelineStep::Fetch | PipelineStep::Vectorize => None,
        }
    }
}

/// Outcome of a step that ran to completion
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: PipelineStep,
    pub output: Vec<String>,
    pub duration_secs: f64,
}

impl StepReport {
    fn new(step: PipelineStep, started: Instant) -> Self {
        Self {
            step,
            output: Vec::new(),
            duration_secs: started.elapsed().as_secs_f64(),
        }
    }

    fn line(mut self, line: impl Into<String>) -> Self {
        let line = line.into();
        app_log!(info, "[{}] {}", self.step.as_str(), line);
        self.output.push(line);
        self
    }
}

/// A step was requested before its prerequisite completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepBlocked {
    pub step: PipelineStep,
    pub requires: PipelineStep,
}

impl std::fmt::Display for StepBlocked {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Step '{}' requires step '{}' to be completed first",
            self.step.as_str(),
            self.requires.as_str()
        )
    }
}

impl std::error::Error for StepBlocked {}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineFlags {
    pub fetch_completed: bool,
    pub extract_completed: bool,
    pub vectorize_completed: bool,
}

/// Which steps have completed during this server session
#[derive(Debug, Default)]
pub struct PipelineStatus {
    flags: Mutex<PipelineFlags>,
}

impl PipelineStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> PipelineFlags {
        *self.lock()
    }

    pub fn is_completed(&self, step: PipelineStep) -> bool {
        let flags = self.lock();
        match step {
            PipelineStep::Fetch => flags.fetch_completed,
            PipelineStep::Extract => flags.extract_completed,
            PipelineStep::Vectorize => flags.vectorize_completed,
        }
    }

    pub fn check_ready(&self, step: PipelineStep) -> std::result::Result<(), StepBlocked> {
        match step.prerequisite() {
            Some(requires) if !self.is_completed(requires) => Err(StepBlocked { step, requires }),
            _ => Ok(()),
        }
    }

    pub fn mark_completed(&self, step: PipelineStep) {
        let mut flags = self.lock();
        match step {
            PipelineStep::Fetch => flags.fetch_completed = true,
            PipelineStep::Extract => flags.extract_completed = true,
            PipelineStep::Vectorize => flags.vectorize_completed = true,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PipelineFlags> {
        self.flags
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub struct JobPipeline<'a> {
    config: &'a ConfigManager,
    db: &'a Database,
}

impl<'a> JobPipeline<'a> {
    pub fn new(config: &'a ConfigManager, db: &'a Database) -> Self {
        Self { config, db }
    }

    /// Step 1: fetch, flatten, clean, then export and store
    pub async fn fetch(&self) -> Result<StepReport> {
        let started = Instant::now();
        let fetcher = DatasetFetcher::new(
            &self.config.service.jobs_dataset_url,
            self.config.service.timeout_seconds,
        )?;

        let items = fetcher.fetch().await?;
        let extraction = extract_listings(&items);
        let unique_errors = extraction.unique_errors();
        let listing_count = extraction.listings.len();

        let records = preprocess(extraction.listings);
        let saved = save_outputs(&records, &self.config.environment.preprocessed_path).await?;
        let stored = self.db.jobs().upsert_many(&records).await?;

        let mut report = StepReport::new(PipelineStep::Fetch, started)
            .line(format!("Fetched {} items", items.len()))
            .line(format!(
                "Extracted {} listings ({} skipped, {} unique errors)",
                listing_count,
                extraction.errors.len(),
                unique_errors.len()
            ));
        for error in unique_errors {
            report = report.line(format!("  {}", error));
        }

        Ok(report
            .line(format!("Preprocessed {} job records", records.len()))
            .line(format!("Saved {}", saved.csv_path.display()))
            .line(format!("Saved {}", saved.jsonl_path.display()))
            .line(format!("Stored {} jobs in the database", stored)))
    }

    /// Step 2 with the configured chat model
    pub async fn extract(&self, limit: Option<i64>) -> Result<StepReport> {
        let extractor = DetailsExtractor::new(ChatClient::new(&self.config.service)?);
        self.extract_with(&extractor, limit).await
    }

    /// Step 2: failures on single rows are counted, not fatal
    pub async fn extract_with<C: ChatCompletion>(
        &self,
        extractor: &DetailsExtractor<C>,
        limit: Option<i64>,
    ) -> Result<StepReport> {
        let started = Instant::now();
        let pending = self.db.jobs().pending_extraction(limit).await?;
        app_log!(info, "Processing {} job descriptions", pending.len());

        let mut extracted = 0;
        let mut failed = 0;
        for job in &pending {
            let job_id = &job.record.job_id;
            match extractor.extract(&job.record.job_description).await {
                Ok(details) => {
                    self.db.jobs().set_extracted_details(job_id, &details).await?;
                    extracted += 1;
                }
                Err(e) => {
                    app_log!(error, "Error processing job {}: {:#}", job_id, e);
                    failed += 1;
                }
            }
        }

        Ok(StepReport::new(PipelineStep::Extract, started)
            .line(format!("Processed {} job descriptions", pending.len()))
            .line(format!("Extracted details for {} jobs", extracted))
            .line(format!("Failed on {} jobs", failed)))
    }

    /// Step 3 with the configured embedding model and vector store
    pub async fn vectorize(&self) -> Result<StepReport> {
        let started = Instant::now();
        let embedder = EmbeddingClient::new(&self.config.service)?;
        let store = VectorStoreClient::new(&self.config.service)?;

        let result = JobVectorizer::new(&embedder, &store)
            .vectorize(self.db)
            .await?;

        Ok(StepReport::new(PipelineStep::Vectorize, started)
            .line(format!("Embedded {} job descriptions", result.embedded))
            .line(format!(
                "Vector store holds {} documents",
                result.collection_count
            )))
    }

    /// Run one step, honouring and updating the session gate
    pub async fn run(
        &self,
        status: &PipelineStatus,
        step: PipelineStep,
        limit: Option<i64>,
    ) -> Result<StepReport> {
        status.check_ready(step)?;

        let report = match step {
            PipelineStep::Fetch => self.fetch().await?,
            PipelineStep::Extract => self.extract(limit).await?,
            PipelineStep::Vectorize => self.vectorize().await?,
        };

        status.mark_completed(step);
        Ok(report)
    }
}
