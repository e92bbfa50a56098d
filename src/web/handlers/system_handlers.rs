// src/web/handlers/system_handlers.rs

use rocket::serde::json::Json;
use rocket::State;

use crate::app_log;
use crate::core::Database;
use crate::web::types::{database_error, ApiResult, TextResponse};

pub async fn health_handler(db: &State<Database>) -> ApiResult<TextResponse> {
    db.health_check()
        .await
        .map_err(|e| database_error(&e, None))?;

    app_log!(debug, "Health check passed");
    Ok(Json(TextResponse::success("OK".to_string(), None)))
}
