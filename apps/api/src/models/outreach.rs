use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::vocab::ContactStatus;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OutreachContactRow {
    pub id: Uuid,
    pub job_id: Option<Uuid>,
    pub user_id: Uuid,
    pub name: String,
    pub linkedin_url: Option<String>,
    pub role: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: ContactStatus,
    pub last_contacted_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
