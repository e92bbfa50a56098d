// src/web/handlers/job_handlers.rs

use rocket::serde::json::Json;
use rocket::State;

use crate::app_log;
use crate::core::{ConfigManager, Database};
use crate::grid::{ControlSet, GridActionBridge, PendingNavigation};
use crate::jobs::{JobSearch, SearchHit, StoredJob};
use crate::llm::{ChatClient, EmbeddingClient, VectorStoreClient};
use crate::resume::{FitAssessment, FitAssessor};
use crate::web::types::{
    classify_error, database_error, job_not_found, ApiResult, DataResponse, JobPage, JobRow,
    ResumeTextRequest, SearchResult, StandardRequest, WithConversationId,
};

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 500;
pub const DEFAULT_SEARCH_K: usize = 5;

/// A stored job as a grid row with its Combined-set controls
pub fn job_row(job: &StoredJob) -> JobRow {
    let row = job.to_row_record();
    let controls = GridActionBridge::new(ControlSet::Combined, PendingNavigation::new()).render(&row);
    JobRow { row, controls }
}

pub async fn list_jobs_handler(
    limit: Option<i64>,
    offset: Option<i64>,
    db: &State<Database>,
) -> ApiResult<DataResponse<JobPage>> {
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = offset.unwrap_or(0).max(0);
    let repo = db.jobs();

    let total = repo.count().await.map_err(|e| database_error(&e, None))?;
    let jobs = repo
        .list(limit, offset)
        .await
        .map_err(|e| database_error(&e, None))?;

    let rows: Vec<JobRow> = jobs.iter().map(job_row).collect();
    Ok(Json(DataResponse::success(
        format!("{} of {} jobs", rows.len(), total),
        JobPage {
            total,
            limit,
            offset,
            rows,
        },
        None,
    )))
}

pub async fn get_job_handler(job_id: &str, db: &State<Database>) -> ApiResult<DataResponse<JobRow>> {
    match db.jobs().get(job_id).await {
        Ok(Some(job)) => Ok(Json(DataResponse::success(
            format!("Job {}", job_id),
            job_row(&job),
            None,
        ))),
        Ok(None) => Err(job_not_found(job_id, None)),
        Err(e) => Err(database_error(&e, None)),
    }
}

pub fn search_results(hits: Vec<SearchHit>) -> Vec<SearchResult> {
    hits.into_iter()
        .map(|hit| SearchResult {
            row: hit.job.as_ref().map(StoredJob::to_row_record),
            job_id: hit.job_id,
            distance: hit.distance,
        })
        .collect()
}

/// Vector search helper shared by job search and resume matching
pub async fn similar_jobs(
    config: &ConfigManager,
    db: &Database,
    text: &str,
    k: usize,
) -> anyhow::Result<Vec<SearchHit>> {
    let embedder = EmbeddingClient::new(&config.service)?;
    let store = VectorStoreClient::new(&config.service)?;
    JobSearch::new(&embedder, &store).similar(db, text, k).await
}

pub async fn search_jobs_handler(
    q: &str,
    k: Option<usize>,
    config: &State<ConfigManager>,
    db: &State<Database>,
) -> ApiResult<DataResponse<Vec<SearchResult>>> {
    let k = k.unwrap_or(DEFAULT_SEARCH_K).max(1);
    app_log!(info, "Searching jobs similar to {:?} (k={})", q, k);

    let hits = similar_jobs(config, db, q, k)
        .await
        .map_err(|e| classify_error(&e, "SEARCH_FAILED", None))?;

    let results = search_results(hits);
    Ok(Json(DataResponse::success(
        format!("{} similar jobs", results.len()),
        results,
        None,
    )))
}

pub async fn job_fit_handler(
    job_id: &str,
    request: Json<StandardRequest<ResumeTextRequest>>,
    config: &State<ConfigManager>,
    db: &State<Database>,
) -> ApiResult<DataResponse<FitAssessment>> {
    let conversation_id = request.conversation_id();

    let job = match db.jobs().get(job_id).await {
        Ok(Some(job)) => job,
        Ok(None) => return Err(job_not_found(job_id, conversation_id)),
        Err(e) => return Err(database_error(&e, conversation_id)),
    };

    let assessment = async {
        let assessor = FitAssessor::new(ChatClient::new(&config.service)?);
        assessor.assess(&request.data.text, &job).await
    }
    .await
    .map_err(|e| classify_error(&e, "FIT_ANALYSIS_FAILED", conversation_id.clone()))?;

    Ok(Json(DataResponse::success(
        format!("Fit analysis for {}", assessment.job_title),
        assessment,
        conversation_id,
    )))
}
