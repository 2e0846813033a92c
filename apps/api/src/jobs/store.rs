use sqlx::{types::Json, FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::{CreateJobRequest, UpdateJobRequest};
use crate::models::job::{JobRow, JobSummary};
use crate::models::spans::JdSpans;
use crate::models::vocab::{ConnectionStatus, JobStatus};

fn job_not_found() -> AppError {
    AppError::NotFound("Job not found".to_string())
}

/// Loads a job owned by `user_id`. Missing and foreign jobs are indistinguishable.
pub async fn fetch_owned_job(pool: &PgPool, user_id: Uuid, job_id: Uuid) -> Result<JobRow, AppError> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1 AND user_id = $2")
        .bind(job_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(job_not_found)
}

pub async fn insert_job(pool: &PgPool, user_id: Uuid, req: &CreateJobRequest) -> Result<JobRow, AppError> {
    let row = sqlx::query_as::<_, JobRow>(
        r#"
        INSERT INTO jobs (user_id, title, company, location, jd_raw, source_url, deadline_at, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(req.title.trim())
    .bind(req.company.trim())
    .bind(req.location.as_deref())
    .bind(&req.jd_raw)
    .bind(req.source_url.as_deref().map(str::trim))
    .bind(req.deadline_at)
    .bind(req.notes.as_deref())
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Newest first, optionally filtered by status.
pub async fn list_jobs(
    pool: &PgPool,
    user_id: Uuid,
    status: Option<JobStatus>,
) -> Result<Vec<JobSummary>, AppError> {
    let rows = sqlx::query_as::<_, JobSummary>(
        r#"
        SELECT id, title, company, location, status, application_status,
               connection_status, deadline_at, created_at
        FROM jobs
        WHERE user_id = $1 AND ($2::text IS NULL OR status = $2)
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .bind(status.map(|s| s.as_str()))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// A patched job with the statuses it held immediately before the write.
#[derive(Debug, FromRow)]
pub struct JobUpdate {
    #[sqlx(flatten)]
    pub job: JobRow,
    #[sqlx(try_from = "String")]
    pub previous_status: JobStatus,
    #[sqlx(try_from = "String")]
    pub previous_connection_status: ConnectionStatus,
}

impl JobUpdate {
    pub fn became_applied(&self) -> bool {
        self.previous_status != JobStatus::Applied && self.job.status == JobStatus::Applied
    }

    pub fn became_connected(&self) -> bool {
        self.previous_connection_status != ConnectionStatus::Connected
            && self.job.connection_status == ConnectionStatus::Connected
    }
}

/// Applies the fields present in `req` and bumps `updated_at`.
///
/// The previous statuses are read under the row lock taken by the same
/// statement, so concurrent patches each observe a distinct transition.
pub async fn update_job(
    pool: &PgPool,
    user_id: Uuid,
    job_id: Uuid,
    req: &UpdateJobRequest,
) -> Result<JobUpdate, AppError> {
    let mut qb = QueryBuilder::<Postgres>::new(
        "WITH previous AS (SELECT id, status, connection_status FROM jobs WHERE id = ",
    );
    qb.push_bind(job_id)
        .push(" AND user_id = ")
        .push_bind(user_id)
        .push(" FOR UPDATE) UPDATE jobs SET updated_at = now()");

    if let Some(title) = &req.title {
        qb.push(", title = ").push_bind(title.trim().to_string());
    }
    if let Some(company) = &req.company {
        qb.push(", company = ").push_bind(company.trim().to_string());
    }
    if let Some(location) = &req.location {
        qb.push(", location = ").push_bind(location.clone());
    }
    if let Some(jd_raw) = &req.jd_raw {
        // Stored spans describe the old text.
        qb.push(", jd_raw = ").push_bind(jd_raw.clone());
        qb.push(", jd_spans_json = NULL");
    }
    if let Some(status) = req.status {
        qb.push(", status = ").push_bind(status.as_str());
    }
    if let Some(status) = req.application_status {
        qb.push(", application_status = ").push_bind(status.as_str());
    }
    if let Some(status) = req.connection_status {
        qb.push(", connection_status = ").push_bind(status.as_str());
    }
    if let Some(source_url) = &req.source_url {
        qb.push(", source_url = ")
            .push_bind(source_url.as_deref().map(|s| s.trim().to_string()));
    }
    if let Some(deadline_at) = req.deadline_at {
        qb.push(", deadline_at = ").push_bind(deadline_at);
    }
    if let Some(notes) = &req.notes {
        qb.push(", notes = ").push_bind(notes.clone());
    }

    qb.push(
        " FROM previous WHERE jobs.id = previous.id \
         RETURNING jobs.*, previous.status AS previous_status, \
         previous.connection_status AS previous_connection_status",
    );

    qb.build_query_as::<JobUpdate>()
        .fetch_optional(pool)
        .await?
        .ok_or_else(job_not_found)
}

pub async fn delete_job(pool: &PgPool, user_id: Uuid, job_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM jobs WHERE id = $1 AND user_id = $2")
        .bind(job_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(job_not_found());
    }
    Ok(())
}

pub async fn store_spans(
    pool: &PgPool,
    user_id: Uuid,
    job_id: Uuid,
    spans: &JdSpans,
) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE jobs SET jd_spans_json = $1, updated_at = now() WHERE id = $2 AND user_id = $3",
    )
    .bind(Json(spans))
    .bind(job_id)
    .bind(user_id)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(job_not_found());
    }
    Ok(())
}
