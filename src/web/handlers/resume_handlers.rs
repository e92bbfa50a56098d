// src/web/handlers/resume_handlers.rs

use chrono::Local;
use rocket::serde::json::Json;
use rocket::State;

use super::job_handlers::{search_results, similar_jobs, DEFAULT_SEARCH_K};
use crate::app_log;
use crate::core::{ConfigManager, Database};
use crate::llm::ChatClient;
use crate::resume::{
    download_filename, normalize_resume_text, save_resume, EmptyResume, FormattedResume,
    ResumeFormatter,
};
use crate::web::types::{
    classify_error, ApiError, ApiResult, DataResponse, ParsedResume, ResumeMatchRequest,
    ResumeTextRequest, SavedResume, SearchResult, StandardRequest, TextFileResponse,
    WithConversationId,
};

fn require_text(text: &str, conversation_id: Option<String>) -> Result<(), ApiError> {
    if text.trim().is_empty() {
        Err(classify_error(&anyhow::Error::new(EmptyResume), "NO_TEXT", conversation_id))
    } else {
        Ok(())
    }
}

pub async fn parse_resume_handler(
    request: Json<StandardRequest<ResumeTextRequest>>,
) -> ApiResult<DataResponse<ParsedResume>> {
    let conversation_id = request.conversation_id();
    let text = normalize_resume_text(&request.data.text);
    require_text(&text, conversation_id.clone())?;

    app_log!(info, "Parsed resume text ({} characters)", text.chars().count());
    Ok(Json(DataResponse::success(
        "Resume parsed".to_string(),
        ParsedResume {
            characters: text.chars().count(),
            text,
        },
        conversation_id,
    )))
}

pub async fn format_resume_handler(
    request: Json<StandardRequest<ResumeTextRequest>>,
    config: &State<ConfigManager>,
) -> ApiResult<DataResponse<FormattedResume>> {
    let conversation_id = request.conversation_id();
    require_text(&request.data.text, conversation_id.clone())?;

    let formatted = async {
        let formatter = ResumeFormatter::new(ChatClient::new(&config.service)?);
        formatter.format(&request.data.text).await
    }
    .await
    .map_err(|e| classify_error(&e, "FORMAT_FAILED", conversation_id.clone()))?;

    Ok(Json(DataResponse::success(
        format!(
            "Resume formatted successfully in {:.2} seconds",
            formatted.duration_secs
        ),
        formatted,
        conversation_id,
    )))
}

pub async fn save_resume_handler(
    request: Json<StandardRequest<ResumeTextRequest>>,
    config: &State<ConfigManager>,
) -> ApiResult<DataResponse<SavedResume>> {
    let conversation_id = request.conversation_id();

    let path = save_resume(
        &config.environment.resumes_path,
        &request.data.text,
        Local::now(),
    )
    .await
    .map_err(|e| classify_error(&e, "SAVE_FAILED", conversation_id.clone()))?;

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(Json(DataResponse::success(
        "Resume saved successfully!".to_string(),
        SavedResume {
            path: path.display().to_string(),
            filename,
        },
        conversation_id,
    )))
}

pub async fn download_resume_handler(
    request: Json<StandardRequest<ResumeTextRequest>>,
) -> Result<TextFileResponse, ApiError> {
    let conversation_id = request.conversation_id();
    require_text(&request.data.text, conversation_id)?;

    let filename = download_filename(Local::now());
    app_log!(
        info,
        "Preparing download '{}' ({} characters)",
        filename,
        request.data.text.len()
    );

    Ok(TextFileResponse {
        content: request.into_inner().data.text,
        filename,
    })
}

pub async fn match_resume_handler(
    request: Json<StandardRequest<ResumeMatchRequest>>,
    config: &State<ConfigManager>,
    db: &State<Database>,
) -> ApiResult<DataResponse<Vec<SearchResult>>> {
    let conversation_id = request.conversation_id();
    require_text(&request.data.text, conversation_id.clone())?;

    let k = request.data.k.unwrap_or(DEFAULT_SEARCH_K).max(1);
    let hits = similar_jobs(config, db, &request.data.text, k)
        .await
        .map_err(|e| classify_error(&e, "MATCH_FAILED", conversation_id.clone()))?;

    let results = search_results(hits);
    Ok(Json(DataResponse::success(
        format!("{} matching jobs", results.len()),
        results,
        conversation_id,
    )))
}
