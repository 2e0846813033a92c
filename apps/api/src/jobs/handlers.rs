use axum::{extract::State, http::StatusCode, Json};
use serde_json::json;
use tracing::{debug, info};

use crate::actions::record_action;
use crate::analysis::JdAnalysis;
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::{IdPath, QueryParams};
use crate::jobs::store::{delete_job, fetch_owned_job, insert_job, list_jobs, store_spans, update_job};
use crate::jobs::{
    spans_for_stored_jd, AnalyzeJdRequest, CreateJobRequest, JobListQuery, UpdateJobRequest,
};
use crate::models::job::{JobRow, JobSummary};
use crate::models::spans::char_len;
use crate::models::vocab::{ActionType, JobStatus};
use crate::state::AppState;
use crate::validation::ValidatedJson;

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(req): ValidatedJson<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobRow>), AppError> {
    let job = insert_job(&state.db, user_id, &req).await?;
    info!(user_id = %user_id, job_id = %job.id, "Job created");

    record_action(
        &state.db,
        user_id,
        Some(job.id),
        ActionType::JobAdded,
        json!({ "title": job.title, "company": job.company }),
    )
    .await;

    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/v1/jobs?status=
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    QueryParams(params): QueryParams<JobListQuery>,
) -> Result<Json<Vec<JobSummary>>, AppError> {
    let status = params
        .status
        .as_deref()
        .map(str::parse::<JobStatus>)
        .transpose()?;
    let jobs = list_jobs(&state.db, user_id, status).await?;
    Ok(Json(jobs))
}

/// GET /api/v1/jobs/:job_id
pub async fn handle_get_job(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    IdPath(job_id): IdPath,
) -> Result<Json<JobRow>, AppError> {
    Ok(Json(fetch_owned_job(&state.db, user_id, job_id).await?))
}

/// PATCH /api/v1/jobs/:job_id
pub async fn handle_update_job(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    IdPath(job_id): IdPath,
    ValidatedJson(req): ValidatedJson<UpdateJobRequest>,
) -> Result<Json<JobRow>, AppError> {
    if req.is_empty() {
        return Ok(Json(fetch_owned_job(&state.db, user_id, job_id).await?));
    }

    let update = update_job(&state.db, user_id, job_id, &req).await?;

    if update.became_applied() {
        record_action(&state.db, user_id, Some(job_id), ActionType::Applied, json!({})).await;
    }
    if update.became_connected() {
        record_action(&state.db, user_id, Some(job_id), ActionType::Connected, json!({})).await;
    }

    Ok(Json(update.job))
}

/// DELETE /api/v1/jobs/:job_id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    IdPath(job_id): IdPath,
) -> Result<StatusCode, AppError> {
    delete_job(&state.db, user_id, job_id).await?;
    info!(user_id = %user_id, job_id = %job_id, "Job deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/jobs/analyze-jd
pub async fn handle_analyze_jd(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(req): ValidatedJson<AnalyzeJdRequest>,
) -> Result<Json<JdAnalysis>, AppError> {
    // Resolve ownership before spending any analysis work.
    let job = match req.job_id {
        Some(job_id) => Some(fetch_owned_job(&state.db, user_id, job_id).await?),
        None => None,
    };

    let analysis = state.analyzer.analyze(&req.jd_text).await?;

    if let Some(job) = &job {
        match spans_for_stored_jd(&job.jd_raw, &req.jd_text, &analysis.spans) {
            Some(spans) => store_spans(&state.db, user_id, job.id, &spans).await?,
            None => debug!(job_id = %job.id, "Analyzed text differs from the stored JD; spans not stored"),
        }
    }

    record_action(
        &state.db,
        user_id,
        req.job_id,
        ActionType::JdProcessed,
        json!({ "jd_length": char_len(&req.jd_text) }),
    )
    .await;

    info!(
        user_id = %user_id,
        skills = analysis.skills.len(),
        "JD analyzed"
    );
    Ok(Json(analysis))
}
