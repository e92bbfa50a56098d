// src/web/handlers/pipeline_handlers.rs

use rocket::serde::json::Json;
use rocket::State;

use crate::core::{ConfigManager, Database};
use crate::jobs::{JobPipeline, PipelineStatus, PipelineStep};
use crate::web::types::{
    classify_error, database_error, ApiResult, DataResponse, PipelineRunData, PipelineRunRequest,
    PipelineStatusData,
};

pub async fn pipeline_status_handler(
    status: &State<PipelineStatus>,
    db: &State<Database>,
) -> ApiResult<DataResponse<PipelineStatusData>> {
    let job_count = db.jobs().count().await.map_err(|e| database_error(&e, None))?;

    Ok(Json(DataResponse::success(
        "Pipeline status".to_string(),
        PipelineStatusData {
            flags: status.snapshot(),
            job_count,
        },
        None,
    )))
}

pub async fn run_pipeline_step_handler(
    step: PipelineStep,
    request: Option<Json<PipelineRunRequest>>,
    config: &State<ConfigManager>,
    db: &State<Database>,
    status: &State<PipelineStatus>,
) -> ApiResult<DataResponse<PipelineRunData>> {
    let limit = request.and_then(|body| body.into_inner().limit);

    let report = JobPipeline::new(config, db)
        .run(status, step, limit)
        .await
        .map_err(|e| classify_error(&e, "PIPELINE_STEP_FAILED", None))?;

    Ok(Json(DataResponse::success(
        format!(
            "Step '{}' completed successfully in {:.2} seconds",
            step.as_str(),
            report.duration_secs
        ),
        PipelineRunData {
            report,
            status: status.snapshot(),
        },
        None,
    )))
}
