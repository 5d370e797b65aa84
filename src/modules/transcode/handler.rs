use super::dto::{JobStatusQuery, TranscodeAccepted, TranscodeRequest};
use super::model::TranscodeJob;
use super::service::TranscodeService;
use crate::common::response::{ApiResponse, ApiSuccess};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

/// Submit a transcode job
///
/// Returns immediately; the renditions are produced in the background.
#[utoipa::path(
    post,
    path = "/api/v1/transcode",
    request_body = TranscodeRequest,
    responses(
        (status = 202, description = "Job accepted", body = ApiResponse<TranscodeAccepted>),
        (status = 400, description = "Unsupported resolution or missing filename")
    ),
    tag = "Transcode"
)]
pub async fn submit_transcode(
    State(state): State<AppState>,
    Json(req): Json<TranscodeRequest>,
) -> impl IntoResponse {
    match TranscodeService::submit(state, req).await {
        Ok(res) => ApiSuccess::accepted(res, "Transcode job accepted").into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get transcode job status
#[utoipa::path(
    get,
    path = "/api/v1/transcode/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID"),
        JobStatusQuery
    ),
    responses(
        (status = 200, description = "Job snapshot", body = ApiResponse<TranscodeJob>),
        (status = 404, description = "Job not found")
    ),
    tag = "Transcode"
)]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<JobStatusQuery>,
) -> impl IntoResponse {
    match TranscodeService::status(state, id, query).await {
        Ok(job) => ApiSuccess::ok(job, "Job retrieved successfully").into_response(),
        Err(e) => e.into_response(),
    }
}

/// List transcode jobs
#[utoipa::path(
    get,
    path = "/api/v1/transcode",
    responses(
        (status = 200, description = "Jobs known to this process, newest first", body = ApiResponse<Vec<TranscodeJob>>)
    ),
    tag = "Transcode"
)]
pub async fn list_jobs(State(state): State<AppState>) -> impl IntoResponse {
    let jobs = TranscodeService::list(state).await;
    ApiSuccess::ok(jobs, "Jobs retrieved successfully")
}
