use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::spans::JdSpans;
use crate::models::vocab::{ApplicationStatus, ConnectionStatus, JobStatus};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub jd_raw: String,
    pub jd_spans_json: Option<Json<JdSpans>>,
    #[sqlx(try_from = "String")]
    pub status: JobStatus,
    #[sqlx(try_from = "String")]
    pub application_status: ApplicationStatus,
    #[sqlx(try_from = "String")]
    pub connection_status: ConnectionStatus,
    pub source_url: Option<String>,
    pub deadline_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// List projection of a job; omits the raw JD text and spans.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobSummary {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: JobStatus,
    #[sqlx(try_from = "String")]
    pub application_status: ApplicationStatus,
    #[sqlx(try_from = "String")]
    pub connection_status: ConnectionStatus,
    pub deadline_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
