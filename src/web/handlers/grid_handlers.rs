// src/web/handlers/grid_handlers.rs

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use std::cell::RefCell;

use crate::app_log;
use crate::core::Database;
use crate::grid::{
    GridAction, GridActionBridge, HostSnapshot, JobGridHost, PendingNavigation, SystemClock,
};
use crate::web::types::{
    api_error, database_error, job_not_found, ApiResult, DataResponse, GridActionRequest,
    GridActionResult, StandardRequest, TextResponse, WithConversationId,
};

/// Run one cell control against the host page of the request's conversation
pub async fn grid_action_handler(
    request: Json<StandardRequest<GridActionRequest>>,
    db: &State<Database>,
    host: &State<JobGridHost>,
    clock: &State<SystemClock>,
) -> ApiResult<DataResponse<GridActionResult>> {
    let conversation_id = request.conversation_id();
    let action = &request.data;

    let job = match db.jobs().get(&action.job_id).await {
        Ok(Some(job)) => job,
        Ok(None) => return Err(job_not_found(&action.job_id, conversation_id)),
        Err(e) => return Err(database_error(&e, conversation_id)),
    };
    let row = job.to_row_record();

    let bridge = GridActionBridge::with_clock(
        action.control_set,
        PendingNavigation::new(),
        clock.inner(),
    );

    let page = conversation_id.as_deref();
    let observed: RefCell<Option<(GridAction, HostSnapshot)>> = RefCell::new(None);
    let sink = |payload: GridAction| {
        let observation = host.observe(page, payload.clone());
        *observed.borrow_mut() = Some((payload, observation.snapshot));
    };

    if !bridge.activate(action.control, &row, &sink) {
        return Err(api_error(
            Status::BadRequest,
            format!(
                "Control '{}' is not part of the {} control set",
                action.control.slug(),
                bridge.control_set().slug()
            ),
            "CONTROL_NOT_RENDERED",
            &["Use one of the controls returned with the row"],
            conversation_id.clone(),
        ));
    }

    let navigate_to = bridge.navigator().take();
    let (emitted, state) = match observed.into_inner() {
        Some((payload, snapshot)) => (Some(payload), snapshot),
        None => (None, host.snapshot(page)),
    };

    app_log!(
        info,
        "Grid control {:?} on job {} (navigate: {}, emitted: {})",
        action.control,
        action.job_id,
        navigate_to.is_some(),
        emitted.as_ref().map_or("none", |payload| payload.kind())
    );

    Ok(Json(DataResponse::success(
        "Grid action applied".to_string(),
        GridActionResult {
            control: action.control,
            navigate_to,
            emitted,
            state,
        },
        conversation_id,
    )))
}

pub async fn grid_state_handler(
    conversation_id: Option<&str>,
    host: &State<JobGridHost>,
) -> Json<DataResponse<HostSnapshot>> {
    Json(DataResponse::success(
        "Grid host state".to_string(),
        host.snapshot(conversation_id),
        conversation_id.map(str::to_string),
    ))
}

pub async fn clear_selection_handler(
    conversation_id: Option<&str>,
    host: &State<JobGridHost>,
) -> Json<TextResponse> {
    host.clear_selection(conversation_id);
    Json(TextResponse::success(
        "Selection cleared".to_string(),
        conversation_id.map(str::to_string),
    ))
}
