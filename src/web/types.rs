// src/web/types.rs
//! Request bodies and the standard response envelopes

use rocket::http::{ContentType, Status};
use rocket::response::{self, status, Responder};
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::{Request, Response};

use crate::app_log;
use crate::grid::{ControlId, ControlSet, GridAction, HostSnapshot, RenderedControl, RowRecord};
use crate::jobs::{PipelineFlags, StepBlocked, StepReport};
use crate::llm::MissingApiKey;
use crate::resume::EmptyResume;

pub type ApiError = status::Custom<Json<StandardErrorResponse>>;
pub type ApiResult<T> = Result<Json<T>, ApiError>;

/// Plain-text attachment, used for resume downloads
pub struct TextFileResponse {
    pub content: String,
    pub filename: String,
}

impl<'r> Responder<'r, 'static> for TextFileResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        Response::build()
            .header(ContentType::Plain)
            .raw_header(
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", self.filename),
            )
            .sized_body(self.content.len(), std::io::Cursor::new(self.content))
            .ok()
    }
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Text,
    Data,
    Error,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TextResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DataResponse<T> {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardRequest<T> {
    #[serde(flatten)]
    pub data: T,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

pub trait WithConversationId {
    fn conversation_id(&self) -> Option<String>;
}

impl<T> WithConversationId for StandardRequest<T> {
    fn conversation_id(&self) -> Option<String> {
        self.conversation_id.clone()
    }
}

impl TextResponse {
    pub fn success(message: String, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Text,
            success: true,
            message,
            conversation_id,
        }
    }
}

impl<T> DataResponse<T> {
    pub fn success(message: String, data: T, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Data,
            success: true,
            message,
            data,
            conversation_id,
        }
    }
}

impl StandardErrorResponse {
    pub fn new(
        error: String,
        error_code: String,
        suggestions: Vec<String>,
        conversation_id: Option<String>,
    ) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code,
            suggestions,
            conversation_id,
        }
    }
}

/// Error envelope with its HTTP status
pub fn api_error(
    status: Status,
    error: impl Into<String>,
    error_code: &str,
    suggestions: &[&str],
    conversation_id: Option<String>,
) -> ApiError {
    status::Custom(
        status,
        Json(StandardErrorResponse::new(
            error.into(),
            error_code.to_string(),
            suggestions.iter().map(|s| s.to_string()).collect(),
            conversation_id,
        )),
    )
}

/// Map a failure to its envelope; unrecognised failures get `fallback_code`
pub fn classify_error(
    err: &anyhow::Error,
    fallback_code: &str,
    conversation_id: Option<String>,
) -> ApiError {
    if let Some(missing) = err.downcast_ref::<MissingApiKey>() {
        return api_error(
            Status::ServiceUnavailable,
            format!("API key not found. Please set the {} environment variable.", missing.0),
            "API_KEY_MISSING",
            &["Set the API key in the server environment and restart"],
            conversation_id,
        );
    }

    if err.downcast_ref::<EmptyResume>().is_some() {
        return api_error(
            Status::BadRequest,
            "No text available. Please parse a resume first.",
            "NO_TEXT",
            &["Upload and parse a resume before this step"],
            conversation_id,
        );
    }

    if let Some(blocked) = err.downcast_ref::<StepBlocked>() {
        return api_error(
            Status::Conflict,
            blocked.to_string(),
            "PIPELINE_STEP_BLOCKED",
            &["Run the earlier pipeline step first"],
            conversation_id,
        );
    }

    app_log!(error, "Request failed: {:#}", err);
    api_error(
        Status::InternalServerError,
        format!("{:#}", err),
        fallback_code,
        &["Try again in a few moments", "Check the server logs for details"],
        conversation_id,
    )
}

pub fn database_error(err: &anyhow::Error, conversation_id: Option<String>) -> ApiError {
    app_log!(error, "Database error: {:#}", err);
    api_error(
        Status::InternalServerError,
        "Database operation failed",
        "DATABASE_ERROR",
        &["Try again in a few moments"],
        conversation_id,
    )
}

pub fn job_not_found(job_id: &str, conversation_id: Option<String>) -> ApiError {
    api_error(
        Status::NotFound,
        format!("Job '{}' not found", job_id),
        "JOB_NOT_FOUND",
        &["Check the job id", "Run the fetch step to load jobs"],
        conversation_id,
    )
}

// Grid

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct JobRow {
    pub row: RowRecord,
    pub controls: Vec<RenderedControl>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct JobPage {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub rows: Vec<JobRow>,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct GridActionRequest {
    pub job_id: String,
    pub control: ControlId,
    #[serde(default)]
    pub control_set: ControlSet,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct GridActionResult {
    pub control: ControlId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigate_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emitted: Option<GridAction>,
    pub state: HostSnapshot,
}

// Search

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct SearchResult {
    pub job_id: String,
    pub distance: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<RowRecord>,
}

// Resume

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ResumeTextRequest {
    pub text: String,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ResumeMatchRequest {
    pub text: String,
    #[serde(default)]
    pub k: Option<usize>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ParsedResume {
    pub text: String,
    pub characters: usize,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct SavedResume {
    pub path: String,
    pub filename: String,
}

// Pipeline

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct PipelineStatusData {
    #[serde(flatten)]
    pub flags: PipelineFlags,
    pub job_count: i64,
}

#[derive(Deserialize, Default)]
#[serde(crate = "rocket::serde")]
pub struct PipelineRunRequest {
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct PipelineRunData {
    pub report: StepReport,
    pub status: PipelineFlags,
}
