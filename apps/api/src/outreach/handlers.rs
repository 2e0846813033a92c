use axum::{extract::State, http::StatusCode, Json};
use serde_json::json;
use tracing::info;

use crate::actions::record_action;
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::{IdPath, QueryParams};
use crate::jobs::store::fetch_owned_job;
use crate::models::outreach::OutreachContactRow;
use crate::models::vocab::{ActionType, ContactStatus};
use crate::outreach::store::{fetch_owned_contact, insert_contact, list_contacts, update_contact};
use crate::outreach::{
    generate_dm, recipient_name, recipient_role, ContactListQuery, CreateContactRequest,
    DmResponse, GenerateDmRequest, UpdateContactRequest,
};
use crate::state::AppState;
use crate::validation::ValidatedJson;

/// POST /api/v1/outreach/contacts
pub async fn handle_create_contact(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(req): ValidatedJson<CreateContactRequest>,
) -> Result<(StatusCode, Json<OutreachContactRow>), AppError> {
    if let Some(job_id) = req.job_id {
        fetch_owned_job(&state.db, user_id, job_id).await?;
    }
    let contact = insert_contact(&state.db, user_id, &req).await?;
    info!(user_id = %user_id, contact_id = %contact.id, "Contact created");
    Ok((StatusCode::CREATED, Json(contact)))
}

/// GET /api/v1/outreach/contacts?job_id=
pub async fn handle_list_contacts(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    QueryParams(params): QueryParams<ContactListQuery>,
) -> Result<Json<Vec<OutreachContactRow>>, AppError> {
    Ok(Json(list_contacts(&state.db, user_id, params.job_id).await?))
}

/// GET /api/v1/outreach/contacts/:contact_id
pub async fn handle_get_contact(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    IdPath(contact_id): IdPath,
) -> Result<Json<OutreachContactRow>, AppError> {
    Ok(Json(fetch_owned_contact(&state.db, user_id, contact_id).await?))
}

/// PATCH /api/v1/outreach/contacts/:contact_id
pub async fn handle_update_contact(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    IdPath(contact_id): IdPath,
    ValidatedJson(req): ValidatedJson<UpdateContactRequest>,
) -> Result<Json<OutreachContactRow>, AppError> {
    let before = fetch_owned_contact(&state.db, user_id, contact_id).await?;
    if req.is_empty() {
        return Ok(Json(before));
    }

    let reached_out = before.status != ContactStatus::ReachedOut
        && req.status == Some(ContactStatus::ReachedOut);
    let after = update_contact(&state.db, user_id, contact_id, &req, reached_out).await?;

    if reached_out {
        record_action(
            &state.db,
            user_id,
            after.job_id,
            ActionType::Messaged,
            json!({ "contact_id": contact_id }),
        )
        .await;
    }
    if before.status != ContactStatus::Connected && after.status == ContactStatus::Connected {
        record_action(
            &state.db,
            user_id,
            after.job_id,
            ActionType::Connected,
            json!({ "contact_id": contact_id }),
        )
        .await;
    }

    Ok(Json(after))
}

/// POST /api/v1/outreach/generate-dm
///
/// The message is returned, never stored.
pub async fn handle_generate_dm(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(req): ValidatedJson<GenerateDmRequest>,
) -> Result<Json<DmResponse>, AppError> {
    let job = match req.job_id {
        Some(job_id) => Some(fetch_owned_job(&state.db, user_id, job_id).await?),
        None => None,
    };
    let contact = match req.contact_id {
        Some(contact_id) => Some(fetch_owned_contact(&state.db, user_id, contact_id).await?),
        None => None,
    };

    let name = recipient_name(req.name.as_deref(), contact.as_ref());
    let role = recipient_role(req.role.as_deref(), contact.as_ref());
    let dm_text = generate_dm(&state.llm, name, role, job.as_ref()).await?;

    record_action(
        &state.db,
        user_id,
        req.job_id,
        ActionType::OutreachDmGenerated,
        json!({ "contact_id": req.contact_id }),
    )
    .await;

    info!(user_id = %user_id, chars = dm_text.chars().count(), "Outreach DM generated");
    Ok(Json(DmResponse { dm_text }))
}
