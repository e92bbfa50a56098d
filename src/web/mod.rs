// src/web/mod.rs

pub mod handlers;
pub mod pages;
pub mod types;

pub use handlers::*;
pub use types::*;

use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::response::content::RawHtml;
use rocket::serde::json::Json;
use rocket::{catchers, delete, get, options, post, routes, Build, Request, Response, Rocket, State};

use crate::app_log;
use crate::core::{ConfigManager, Database};
use crate::grid::{HostSnapshot, JobGridHost, SystemClock};
use crate::jobs::{PipelineStatus, PipelineStep};
use crate::resume::{FitAssessment, FormattedResume};

pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, DELETE, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
    }
}

// Pages

#[get("/")]
pub async fn home() -> RawHtml<String> {
    pages::home_page_handler().await
}

#[get("/jobs")]
pub async fn jobs_grid(db: &State<Database>) -> RawHtml<String> {
    pages::jobs_page_handler(db).await
}

// Jobs

#[get("/jobs?<limit>&<offset>")]
pub async fn list_jobs(
    limit: Option<i64>,
    offset: Option<i64>,
    db: &State<Database>,
) -> ApiResult<DataResponse<JobPage>> {
    handlers::list_jobs_handler(limit, offset, db).await
}

#[get("/jobs/search?<q>&<k>")]
pub async fn search_jobs(
    q: &str,
    k: Option<usize>,
    config: &State<ConfigManager>,
    db: &State<Database>,
) -> ApiResult<DataResponse<Vec<SearchResult>>> {
    handlers::search_jobs_handler(q, k, config, db).await
}

#[get("/jobs/<job_id>")]
pub async fn get_job(job_id: &str, db: &State<Database>) -> ApiResult<DataResponse<JobRow>> {
    handlers::get_job_handler(job_id, db).await
}

#[post("/jobs/<job_id>/fit", data = "<request>")]
pub async fn job_fit(
    job_id: &str,
    request: Json<StandardRequest<ResumeTextRequest>>,
    config: &State<ConfigManager>,
    db: &State<Database>,
) -> ApiResult<DataResponse<FitAssessment>> {
    handlers::job_fit_handler(job_id, request, config, db).await
}

// Grid

#[post("/grid/actions", data = "<request>")]
pub async fn grid_action(
    request: Json<StandardRequest<GridActionRequest>>,
    db: &State<Database>,
    host: &State<JobGridHost>,
    clock: &State<SystemClock>,
) -> ApiResult<DataResponse<GridActionResult>> {
    handlers::grid_action_handler(request, db, host, clock).await
}

#[get("/grid/state?<conversation_id>")]
pub async fn grid_state(
    conversation_id: Option<&str>,
    host: &State<JobGridHost>,
) -> Json<DataResponse<HostSnapshot>> {
    handlers::grid_state_handler(conversation_id, host).await
}

#[delete("/grid/selection?<conversation_id>")]
pub async fn clear_selection(
    conversation_id: Option<&str>,
    host: &State<JobGridHost>,
) -> Json<TextResponse> {
    handlers::clear_selection_handler(conversation_id, host).await
}

// Resume

#[post("/resume/parse", data = "<request>")]
pub async fn parse_resume(
    request: Json<StandardRequest<ResumeTextRequest>>,
) -> ApiResult<DataResponse<ParsedResume>> {
    handlers::parse_resume_handler(request).await
}

#[post("/resume/format", data = "<request>")]
pub async fn format_resume(
    request: Json<StandardRequest<ResumeTextRequest>>,
    config: &State<ConfigManager>,
) -> ApiResult<DataResponse<FormattedResume>> {
    handlers::format_resume_handler(request, config).await
}

#[post("/resume/save", data = "<request>")]
pub async fn save_resume(
    request: Json<StandardRequest<ResumeTextRequest>>,
    config: &State<ConfigManager>,
) -> ApiResult<DataResponse<SavedResume>> {
    handlers::save_resume_handler(request, config).await
}

#[post("/resume/download", data = "<request>")]
pub async fn download_resume(
    request: Json<StandardRequest<ResumeTextRequest>>,
) -> Result<TextFileResponse, ApiError> {
    handlers::download_resume_handler(request).await
}

#[post("/resume/match", data = "<request>")]
pub async fn match_resume(
    request: Json<StandardRequest<ResumeMatchRequest>>,
    config: &State<ConfigManager>,
    db: &State<Database>,
) -> ApiResult<DataResponse<Vec<SearchResult>>> {
    handlers::match_resume_handler(request, config, db).await
}

// Pipeline

#[get("/pipeline/status")]
pub async fn pipeline_status(
    status: &State<PipelineStatus>,
    db: &State<Database>,
) -> ApiResult<DataResponse<PipelineStatusData>> {
    handlers::pipeline_status_handler(status, db).await
}

#[post("/pipeline/fetch")]
pub async fn pipeline_fetch(
    config: &State<ConfigManager>,
    db: &State<Database>,
    status: &State<PipelineStatus>,
) -> ApiResult<DataResponse<PipelineRunData>> {
    handlers::run_pipeline_step_handler(PipelineStep::Fetch, None, config, db, status).await
}

#[post("/pipeline/extract", data = "<request>")]
pub async fn pipeline_extract(
    request: Option<Json<PipelineRunRequest>>,
    config: &State<ConfigManager>,
    db: &State<Database>,
    status: &State<PipelineStatus>,
) -> ApiResult<DataResponse<PipelineRunData>> {
    handlers::run_pipeline_step_handler(PipelineStep::Extract, request, config, db, status).await
}

#[post("/pipeline/vectorize")]
pub async fn pipeline_vectorize(
    config: &State<ConfigManager>,
    db: &State<Database>,
    status: &State<PipelineStatus>,
) -> ApiResult<DataResponse<PipelineRunData>> {
    handlers::run_pipeline_step_handler(PipelineStep::Vectorize, None, config, db, status).await
}

// System

#[get("/health")]
pub async fn health(db: &State<Database>) -> ApiResult<TextResponse> {
    handlers::health_handler(db).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
        None,
    ))
}

#[rocket::catch(404)]
pub fn not_found(request: &Request) -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        format!("No route for {}", request.uri()),
        "NOT_FOUND".to_string(),
        vec!["Check the endpoint path".to_string()],
        None,
    ))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Request body does not match the expected shape".to_string(),
        "BAD_REQUEST".to_string(),
        vec!["Verify field names and value types".to_string()],
        None,
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Check the server logs for details".to_string(),
        ],
        None,
    ))
}

/// Assemble the server with its shared state; no I/O happens here
pub fn build_rocket(rocket: Rocket<Build>, config: ConfigManager, db: Database) -> Rocket<Build> {
    rocket
        .attach(Cors)
        .manage(config)
        .manage(db)
        .manage(JobGridHost::new())
        .manage(PipelineStatus::new())
        .manage(SystemClock::new())
        .register(
            "/",
            catchers![bad_request, not_found, unprocessable, internal_error],
        )
        .mount("/", routes![home, jobs_grid])
        .mount(
            "/api",
            routes![
                list_jobs,
                search_jobs,
                get_job,
                job_fit,
                grid_action,
                grid_state,
                clear_selection,
                parse_resume,
                format_resume,
                save_resume,
                download_resume,
                match_resume,
                pipeline_status,
                pipeline_fetch,
                pipeline_extract,
                pipeline_vectorize,
                health,
                options,
            ],
        )
}

pub async fn start_web_server(config: ConfigManager) -> Result<()> {
    let db = Database::new(&config.environment.database_path).await?;

    app_log!(info, "Starting Seeklyzer server on port {}", config.port);
    app_log!(info, "Database: {}", config.environment.database_path.display());

    let figment = rocket::Config::figment().merge(("port", config.port));
    let _rocket = build_rocket(rocket::custom(figment), config, db)
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Rocket failed: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EnvironmentConfig, ServiceConfig};
    use crate::jobs::record::sample_record;
    use rocket::http::ContentType;
    use rocket::local::asynchronous::Client;
    use serde_json::{json, Value};

    async fn client_with_jobs(resumes_dir: &std::path::Path) -> Client {
        let environment = EnvironmentConfig {
            resumes_path: resumes_dir.to_path_buf(),
            ..EnvironmentConfig::default()
        };
        let config =
            ConfigManager::from_parts(environment, ServiceConfig::from_lookup(|_| None).unwrap());

        let db = Database::in_memory().await.unwrap();
        db.jobs()
            .upsert_many(&[sample_record("12345", "Engineer"), sample_record("999", "Analyst")])
            .await
            .unwrap();

        Client::tracked(build_rocket(rocket::build(), config, db))
            .await
            .unwrap()
    }

    async fn post_json(client: &Client, uri: &str, body: Value) -> (Status, Value) {
        let response = client
            .post(uri.to_string())
            .header(ContentType::JSON)
            .body(body.to_string())
            .dispatch()
            .await;
        let status = response.status();
        (status, response.into_json::<Value>().await.unwrap())
    }

    #[rocket::async_test]
    async fn test_health_and_job_listing() {
        let dir = tempfile::tempdir().unwrap();
        let client = client_with_jobs(dir.path()).await;

        let health = client.get("/api/health").dispatch().await;
        assert_eq!(health.status(), Status::Ok);

        let response = client.get("/api/jobs?limit=1").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["type"], "data");
        assert_eq!(body["data"]["total"], 2);
        assert_eq!(body["data"]["rows"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"]["rows"][0]["controls"][0]["id"], "show-details");
        assert_eq!(body["data"]["rows"][0]["controls"][1]["id"], "open-listing");
    }

    #[rocket::async_test]
    async fn test_unknown_job_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let client = client_with_jobs(dir.path()).await;

        let response = client.get("/api/jobs/nope").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["error_code"], "JOB_NOT_FOUND");
        assert_eq!(body["success"], false);
    }

    #[rocket::async_test]
    async fn test_details_control_updates_host_state() {
        let dir = tempfile::tempdir().unwrap();
        let client = client_with_jobs(dir.path()).await;

        let (status, body) = post_json(
            &client,
            "/api/grid/actions",
            json!({ "job_id": "999", "control": "show-details" }),
        )
        .await;

        assert_eq!(status, Status::Ok);
        let data = &body["data"];
        assert!(data.get("navigate_to").is_none());
        assert_eq!(data["emitted"]["colId"], "details");
        assert_eq!(data["emitted"]["data"]["Job Id"], "999");
        assert!(data["emitted"]["timestamp"].is_i64());
        assert_eq!(data["state"]["selected_row"]["row"]["Job Title"], "Analyst");

        let state: Value = client
            .get("/api/grid/state")
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert_eq!(state["data"]["events_observed"], 1);
    }

    #[rocket::async_test]
    async fn test_conversations_do_not_share_page_state() {
        let dir = tempfile::tempdir().unwrap();
        let client = client_with_jobs(dir.path()).await;

        post_json(
            &client,
            "/api/grid/actions",
            json!({ "job_id": "999", "control": "show-details", "conversation_id": "tab-a" }),
        )
        .await;
        let (status, body) = post_json(
            &client,
            "/api/grid/actions",
            json!({
                "job_id": "12345",
                "control": "view-listing",
                "control_set": "navigate-only",
                "conversation_id": "tab-b"
            }),
        )
        .await;

        assert_eq!(status, Status::Ok);
        assert_eq!(body["conversation_id"], "tab-b");
        assert!(body["data"]["state"]["selected_row"].is_null());
        assert_eq!(body["data"]["state"]["last_viewed"]["job_id"], "12345");

        let cleared = client
            .delete("/api/grid/selection?conversation_id=tab-b")
            .dispatch()
            .await;
        assert_eq!(cleared.status(), Status::Ok);

        let tab_a: Value = client
            .get("/api/grid/state?conversation_id=tab-a")
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert_eq!(tab_a["data"]["selected_row"]["row"]["Job Id"], "999");
        assert!(tab_a["data"]["last_viewed"].is_null());

        let anonymous: Value = client
            .get("/api/grid/state")
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert_eq!(anonymous["data"]["events_observed"], 0);
    }

    #[rocket::async_test]
    async fn test_combined_open_listing_navigates_without_emitting() {
        let dir = tempfile::tempdir().unwrap();
        let client = client_with_jobs(dir.path()).await;

        let (status, body) = post_json(
            &client,
            "/api/grid/actions",
            json!({ "job_id": "12345", "control": "open-listing", "control_set": "combined" }),
        )
        .await;

        assert_eq!(status, Status::Ok);
        assert_eq!(body["data"]["navigate_to"], "https://www.seek.com.au/job/12345");
        assert!(body["data"].get("emitted").is_none());
        assert!(body["data"]["state"]["last_viewed"].is_null());
    }

    #[rocket::async_test]
    async fn test_navigate_only_reports_viewed_listing() {
        let dir = tempfile::tempdir().unwrap();
        let client = client_with_jobs(dir.path()).await;

        let (_, first) = post_json(
            &client,
            "/api/grid/actions",
            json!({ "job_id": "12345", "control": "view-listing", "control_set": "navigate-only" }),
        )
        .await;
        let (_, second) = post_json(
            &client,
            "/api/grid/actions",
            json!({ "job_id": "12345", "control": "view-listing", "control_set": "navigate-only" }),
        )
        .await;

        assert_eq!(first["data"]["navigate_to"], "https://www.seek.com.au/job/12345");
        assert_eq!(first["data"]["emitted"]["jobId"], "12345");
        assert_eq!(second["data"]["state"]["last_viewed"]["job_id"], "12345");

        let t1 = first["data"]["emitted"]["timestamp"].as_i64().unwrap();
        let t2 = second["data"]["emitted"]["timestamp"].as_i64().unwrap();
        assert!(t2 >= t1);
    }

    #[rocket::async_test]
    async fn test_control_outside_set_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let client = client_with_jobs(dir.path()).await;

        let (status, body) = post_json(
            &client,
            "/api/grid/actions",
            json!({ "job_id": "12345", "control": "view-listing", "control_set": "details-only" }),
        )
        .await;

        assert_eq!(status, Status::BadRequest);
        assert_eq!(body["error_code"], "CONTROL_NOT_RENDERED");
    }

    #[rocket::async_test]
    async fn test_resume_endpoints() {
        let dir = tempfile::tempdir().unwrap();
        let client = client_with_jobs(dir.path()).await;

        let (status, body) =
            post_json(&client, "/api/resume/parse", json!({ "text": "  Jane \n Doe " })).await;
        assert_eq!(status, Status::Ok);
        assert_eq!(body["data"]["text"], "Jane Doe");

        let (status, body) = post_json(&client, "/api/resume/parse", json!({ "text": "  " })).await;
        assert_eq!(status, Status::BadRequest);
        assert_eq!(body["error_code"], "NO_TEXT");

        let (status, body) =
            post_json(&client, "/api/resume/format", json!({ "text": "Jane Doe" })).await;
        assert_eq!(status, Status::ServiceUnavailable);
        assert_eq!(body["error_code"], "API_KEY_MISSING");

        let (status, body) =
            post_json(&client, "/api/resume/save", json!({ "text": "JANE DOE" })).await;
        assert_eq!(status, Status::Ok);
        let saved = body["data"]["path"].as_str().unwrap();
        assert_eq!(std::fs::read_to_string(saved).unwrap(), "JANE DOE");

        let response = client
            .post("/api/resume/download")
            .header(ContentType::JSON)
            .body(json!({ "text": "JANE DOE" }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let disposition = response.headers().get_one("Content-Disposition").unwrap();
        assert!(disposition.starts_with("attachment; filename=\"resume_"));
        assert_eq!(response.into_string().await.unwrap(), "JANE DOE");
    }

    #[rocket::async_test]
    async fn test_extract_requires_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let client = client_with_jobs(dir.path()).await;

        let response = client.post("/api/pipeline/extract").dispatch().await;
        assert_eq!(response.status(), Status::Conflict);
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["error_code"], "PIPELINE_STEP_BLOCKED");

        let status: Value = client
            .get("/api/pipeline/status")
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert_eq!(status["data"]["fetch_completed"], false);
        assert_eq!(status["data"]["job_count"], 2);
    }

    #[rocket::async_test]
    async fn test_pages_and_json_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let client = client_with_jobs(dir.path()).await;

        let page = client.get("/jobs").dispatch().await;
        assert_eq!(page.status(), Status::Ok);
        let html = page.into_string().await.unwrap();
        assert!(html.contains("Showing 2 of 2 jobs"));

        let missing = client.get("/api/nothing-here").dispatch().await;
        assert_eq!(missing.status(), Status::NotFound);
        let body: Value = missing.into_json().await.unwrap();
        assert_eq!(body["error_code"], "NOT_FOUND");
    }
}
