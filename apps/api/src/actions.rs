//! Append-only analytics events. Nothing in the application reads these rows
//! back; recording failures are logged and never fail the calling workflow.

use serde_json::{json, Value};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::models::vocab::ActionType;

/// Normalizes event metadata to a JSON object.
pub fn normalize_meta(meta: Value) -> Value {
    match meta {
        Value::Object(_) => meta,
        Value::Null => json!({}),
        other => json!({ "value": other }),
    }
}

/// Inserts an action row. Never updates or deletes.
pub async fn record_action(
    pool: &PgPool,
    user_id: Uuid,
    job_id: Option<Uuid>,
    action: ActionType,
    meta: Value,
) {
    let result = sqlx::query("INSERT INTO actions (user_id, job_id, type, meta) VALUES ($1, $2, $3, $4)")
        .bind(user_id)
        .bind(job_id)
        .bind(action.as_str())
        .bind(normalize_meta(meta))
        .execute(pool)
        .await;

    if let Err(e) = result {
        warn!(user_id = %user_id, action = %action, "Failed to record action: {e}");
    }
}
