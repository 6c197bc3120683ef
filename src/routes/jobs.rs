use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::{
    dto::job_dto::{CreateJobPayload, JobSearchQuery, JobView},
    error::Result,
    middleware::auth::Authenticated,
    routes::extract::{ApiJson, ApiPath, ApiQuery},
    models::job::Job,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/v1/jobs",
    request_body = CreateJobPayload,
    responses(
        (status = 201, description = "Job created successfully", body = Json<Job>),
        (status = 400, description = "Missing or invalid field"),
        (status = 401, description = "Not authenticated")
    )
)]
#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiJson(body): ApiJson<JsonValue>,
) -> Result<impl IntoResponse> {
    let payload: CreateJobPayload = serde_json::from_value(body)?;
    let job = state.job_service.create(&principal, payload).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

#[utoipa::path(
    get,
    path = "/api/v1/jobs",
    responses(
        (status = 200, description = "All jobs, newest first", body = [JobView])
    )
)]
#[axum::debug_handler]
pub async fn list_jobs(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let jobs = state.job_query_service.list_all().await?;
    Ok(Json(jobs))
}

#[utoipa::path(
    get,
    path = "/api/v1/jobs/search",
    params(
        ("tags" = Option<String>, Query, description = "Comma-separated tags"),
        ("location" = Option<String>, Query, description = "Location substring"),
        ("title" = Option<String>, Query, description = "Title substring")
    ),
    responses(
        (status = 200, description = "Matching jobs", body = [JobView])
    )
)]
#[axum::debug_handler]
pub async fn search_jobs(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<JobSearchQuery>,
) -> Result<impl IntoResponse> {
    let jobs = state.job_query_service.search(query).await?;
    Ok(Json(jobs))
}

#[utoipa::path(
    get,
    path = "/api/v1/jobs/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Jobs created by the user", body = [JobView]),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn list_jobs_by_user(
    State(state): State<AppState>,
    Authenticated(_principal): Authenticated,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    let jobs = state.job_query_service.list_by_user(id).await?;
    Ok(Json(jobs))
}

#[utoipa::path(
    get,
    path = "/api/v1/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job found", body = Json<JobView>),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn get_job(
    State(state): State<AppState>,
    Authenticated(_principal): Authenticated,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state.job_query_service.get_by_id(id).await?;
    Ok(Json(job))
}

#[utoipa::path(
    put,
    path = "/api/v1/jobs/{id}/apply",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Application recorded", body = Json<Job>),
        (status = 400, description = "Already applied for this job"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Job or user not found")
    )
)]
#[axum::debug_handler]
pub async fn apply_job(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state.job_service.apply(&principal, id).await?;
    Ok(Json(job))
}

#[utoipa::path(
    put,
    path = "/api/v1/jobs/{id}/like",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Like toggled", body = Json<Job>),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Job or user not found")
    )
)]
#[axum::debug_handler]
pub async fn like_job(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state.job_service.like(&principal, id).await?;
    Ok(Json(job))
}

#[utoipa::path(
    delete,
    path = "/api/v1/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 204, description = "Job deleted successfully"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Caller does not own the job (ownership enforcement only)"),
        (status = 404, description = "Job or user not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_job(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse> {
    state.job_service.delete(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
