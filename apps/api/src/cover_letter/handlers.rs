use axum::{extract::State, Json};
use serde_json::json;
use tracing::info;

use crate::actions::record_action;
use crate::auth::AuthUser;
use crate::cover_letter::store::{fetch_cover_letter, update_cover_letter_text, upsert_cover_letter};
use crate::cover_letter::{
    generate_cover_letter, CoverLetterResponse, GenerateCoverLetterRequest,
    UpdateCoverLetterRequest,
};
use crate::errors::AppError;
use crate::extract::IdPath;
use crate::jobs::store::fetch_owned_job;
use crate::models::cover_letter::CoverLetterRow;
use crate::models::vocab::ActionType;
use crate::state::AppState;
use crate::storage::signed_url;
use crate::validation::ValidatedJson;

/// POST /api/v1/cover-letter/generate
///
/// Nothing is stored when the language model fails.
pub async fn handle_generate_cover_letter(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(req): ValidatedJson<GenerateCoverLetterRequest>,
) -> Result<Json<CoverLetterResponse>, AppError> {
    let job = fetch_owned_job(&state.db, user_id, req.job_id).await?;
    let text = generate_cover_letter(&state.llm, &job).await?;
    let letter = upsert_cover_letter(&state.db, job.id, &text).await?;

    record_action(
        &state.db,
        user_id,
        Some(job.id),
        ActionType::CoverLetterGenerated,
        json!({ "cover_letter_id": letter.id }),
    )
    .await;

    info!(user_id = %user_id, job_id = %job.id, "Cover letter generated");
    Ok(Json(cover_letter_response(&state, letter).await))
}

/// GET /api/v1/cover-letter/:job_id
pub async fn handle_get_cover_letter(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    IdPath(job_id): IdPath,
) -> Result<Json<CoverLetterResponse>, AppError> {
    fetch_owned_job(&state.db, user_id, job_id).await?;
    let letter = fetch_cover_letter(&state.db, job_id).await?;
    Ok(Json(cover_letter_response(&state, letter).await))
}

/// PATCH /api/v1/cover-letter/:job_id
pub async fn handle_update_cover_letter(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    IdPath(job_id): IdPath,
    ValidatedJson(req): ValidatedJson<UpdateCoverLetterRequest>,
) -> Result<Json<CoverLetterResponse>, AppError> {
    fetch_owned_job(&state.db, user_id, job_id).await?;
    let letter = update_cover_letter_text(&state.db, job_id, &req.text).await?;
    Ok(Json(cover_letter_response(&state, letter).await))
}

async fn cover_letter_response(state: &AppState, letter: CoverLetterRow) -> CoverLetterResponse {
    let pdf_url = match letter.pdf_path.as_deref() {
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

    CoverLetterResponse {
        id: letter.id,
        job_id: letter.job_id,
        text: letter.text,
        pdf_url,
    }
}
