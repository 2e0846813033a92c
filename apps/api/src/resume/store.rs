use sqlx::{types::Json, FromRow, PgPool, Row};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{ParsedResume, ResumeMasterRow, ResumeVariantRow, VariantDiff};

pub fn master_not_found() -> AppError {
    AppError::NotFound("Master resume not found".to_string())
}

/// Creates or replaces the caller's master resume. The flag is true on insert.
pub async fn upsert_master(
    pool: &PgPool,
    user_id: Uuid,
    latex: &str,
    parsed: &ParsedResume,
) -> Result<(ResumeMasterRow, bool), AppError> {
    let row = sqlx::query(
        r#"
        INSERT INTO resume_master (user_id, latex_blob, parsed_json)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id) DO UPDATE
            SET latex_blob = EXCLUDED.latex_blob,
                parsed_json = EXCLUDED.parsed_json,
                updated_at = now()
        RETURNING *, (xmax = 0) AS inserted
        "#,
    )
    .bind(user_id)
    .bind(latex)
    .bind(Json(parsed))
    .fetch_one(pool)
    .await?;

    let inserted: bool = row.try_get("inserted")?;
    Ok((ResumeMasterRow::from_row(&row)?, inserted))
}

pub async fn fetch_master(pool: &PgPool, user_id: Uuid) -> Result<ResumeMasterRow, AppError> {
    sqlx::query_as::<_, ResumeMasterRow>("SELECT * FROM resume_master WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(master_not_found)
}

pub async fn fetch_variant(
    pool: &PgPool,
    user_id: Uuid,
    job_id: Uuid,
) -> Result<Option<ResumeVariantRow>, AppError> {
    let row = sqlx::query_as::<_, ResumeVariantRow>(
        "SELECT * FROM resume_variant WHERE user_id = $1 AND job_id = $2",
    )
    .bind(user_id)
    .bind(job_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// One variant per (user, job). A rewrite keeps the previous `pdf_path`; the
/// recompiled PDF lands under the same key.
pub async fn upsert_variant(
    pool: &PgPool,
    user_id: Uuid,
    job_id: Uuid,
    latex: &str,
    diff: &VariantDiff,
) -> Result<ResumeVariantRow, AppError> {
    let row = sqlx::query_as::<_, ResumeVariantRow>(
        r#"
        INSERT INTO resume_variant (user_id, job_id, latex_blob, diff_json)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_id, job_id) DO UPDATE
            SET latex_blob = EXCLUDED.latex_blob,
                diff_json = EXCLUDED.diff_json,
                updated_at = now()
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(job_id)
    .bind(latex)
    .bind(Json(diff))
    .fetch_one(pool)
    .await?;
    Ok(row)
}
