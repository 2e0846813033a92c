//! Axum route handlers for the resume API.

use axum::{extract::State, Json};
use serde_json::json;
use tracing::info;

use crate::actions::record_action;
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::IdPath;
use crate::jobs::store::{fetch_owned_job, store_spans};
use crate::models::resume::{ResumeVariantRow, VariantDiff};
use crate::models::spans::char_len;
use crate::models::vocab::ActionType;
use crate::render::enqueue_compile;
use crate::resume::latex::{parse_latex_resume, rebuild_latex};
use crate::resume::store::{fetch_master, fetch_variant, upsert_master, upsert_variant};
use crate::resume::tailoring::{tailor_coursework, tailor_skills};
use crate::resume::{
    MasterResponse, MasterUploadResponse, TailorVariantRequest, UpdateResumeVariantRequest,
    UploadResumeRequest, VariantResponse,
};
use crate::state::AppState;
use crate::storage::signed_url;
use crate::validation::ValidatedJson;

/// POST /api/v1/resume/master
///
/// Creates the caller's master resume, or replaces it on re-upload.
pub async fn handle_upload_master(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(req): ValidatedJson<UploadResumeRequest>,
) -> Result<Json<MasterUploadResponse>, AppError> {
    let parsed = parse_latex_resume(&req.latex);
    let (master, created) = upsert_master(&state.db, user_id, &req.latex, &parsed).await?;

    info!(
        user_id = %user_id,
        created,
        skills = parsed.technical_skills.len(),
        coursework = parsed.relevant_coursework.len(),
        "Master resume stored"
    );

    Ok(Json(MasterUploadResponse {
        id: master.id,
        parsed,
        created,
    }))
}

/// GET /api/v1/resume/master
pub async fn handle_get_master(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MasterResponse>, AppError> {
    let master = fetch_master(&state.db, user_id).await?;
    Ok(Json(MasterResponse {
        id: master.id,
        latex: master.latex_blob,
        parsed: master.parsed_json.0,
    }))
}

/// POST /api/v1/resume/variant
///
/// Rebuilds the master with an explicit skill/coursework selection for one job
/// and queues the result for compilation.
pub async fn handle_update_variant(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(req): ValidatedJson<UpdateResumeVariantRequest>,
) -> Result<Json<VariantResponse>, AppError> {
    let master = fetch_master(&state.db, user_id).await?;
    fetch_owned_job(&state.db, user_id, req.job_id).await?;

    let latex = rebuild_latex(&master.latex_blob, &req.skills, &req.coursework);
    let diff = VariantDiff {
        skills: req.skills,
        coursework: req.coursework,
    };
    let variant = upsert_variant(&state.db, user_id, req.job_id, &latex, &diff).await?;
    enqueue_compile(&state.redis, variant.id).await;

    info!(user_id = %user_id, job_id = %req.job_id, variant_id = %variant.id, "Resume variant stored");
    Ok(Json(variant_response(&state, variant).await))
}

/// GET /api/v1/resume/variant/:job_id
pub async fn handle_get_variant(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    IdPath(job_id): IdPath,
) -> Result<Json<VariantResponse>, AppError> {
    let variant = fetch_variant(&state.db, user_id, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Resume variant not found".to_string()))?;

    record_action(
        &state.db,
        user_id,
        Some(job_id),
        ActionType::ResumeViewed,
        json!({ "variant_id": variant.id }),
    )
    .await;

    Ok(Json(variant_response(&state, variant).await))
}

/// POST /api/v1/resume/variant/:job_id/tailor
///
/// Re-ranks the caller's own skills and coursework against the job's
/// description. Starts from the current variant when one exists, otherwise
/// from the master.
pub async fn handle_tailor_variant(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    IdPath(job_id): IdPath,
    ValidatedJson(req): ValidatedJson<TailorVariantRequest>,
) -> Result<Json<VariantResponse>, AppError> {
    let master = fetch_master(&state.db, user_id).await?;
    let job = fetch_owned_job(&state.db, user_id, job_id).await?;

    let base = match fetch_variant(&state.db, user_id, job_id).await? {
        Some(ResumeVariantRow {
            diff_json: Some(diff),
            ..
        }) => diff.0,
        _ => VariantDiff {
            skills: master.parsed_json.0.technical_skills.clone(),
            coursework: master.parsed_json.0.relevant_coursework.clone(),
        },
    };

    let analysis = state.analyzer.analyze(&job.jd_raw).await?;
    store_spans(&state.db, user_id, job_id, &analysis.spans).await?;
    record_action(
        &state.db,
        user_id,
        Some(job_id),
        ActionType::JdProcessed,
        json!({ "jd_length": char_len(&job.jd_raw) }),
    )
    .await;

    let diff = VariantDiff {
        skills: tailor_skills(&base.skills, &analysis.skills, req.limit),
        coursework: tailor_coursework(&base.coursework, &job.jd_raw),
    };
    let latex = rebuild_latex(&master.latex_blob, &diff.skills, &diff.coursework);
    let variant = upsert_variant(&state.db, user_id, job_id, &latex, &diff).await?;
    enqueue_compile(&state.redis, variant.id).await;

    info!(
        user_id = %user_id,
        job_id = %job_id,
        skills = diff.skills.len(),
        jd_skills = analysis.skills.len(),
        "Resume variant tailored"
    );
    Ok(Json(variant_response(&state, variant).await))
}

async fn variant_response(state: &AppState, variant: ResumeVariantRow) -> VariantResponse {
    let pdf_url = match variant.pdf_path.as_deref() {
        Some(path) => {
            signed_url(
                &state.s3,
                &state.config.s3_bucket,
                path,
                state.config.signed_url_ttl_secs,
            )
            .await
        }
        None => None,
    };

    VariantResponse {
        id: variant.id,
        job_id: variant.job_id,
        latex: variant.latex_blob,
        pdf_url,
        diff: variant.diff_json.map(|d| d.0),
    }
}
