//! Tracked job postings: CRUD, status transitions, and JD analysis.

pub mod handlers;
pub mod store;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::models::spans::{char_len, JdSpans};
use crate::models::vocab::{ApplicationStatus, ConnectionStatus, JobStatus};
use crate::validation::{http_url, not_blank, nullable, nullable_with};

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateJobRequest {
    #[validate(custom = "not_blank")]
    pub title: String,
    #[validate(custom = "not_blank")]
    pub company: String,
    pub location: Option<String>,
    #[validate(custom = "not_blank")]
    pub jd_raw: String,
    #[validate(custom = "http_url")]
    pub source_url: Option<String>,
    pub deadline_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Partial update. Absent fields are untouched; an explicit `null` clears a
/// nullable column.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub company: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub location: Option<Option<String>>,
    pub jd_raw: Option<String>,
    pub status: Option<JobStatus>,
    pub application_status: Option<ApplicationStatus>,
    pub connection_status: Option<ConnectionStatus>,
    #[serde(default, deserialize_with = "nullable")]
    pub source_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub deadline_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "nullable")]
    pub notes: Option<Option<String>>,
}

impl UpdateJobRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.company.is_none()
            && self.location.is_none()
            && self.jd_raw.is_none()
            && self.status.is_none()
            && self.application_status.is_none()
            && self.connection_status.is_none()
            && self.source_url.is_none()
            && self.deadline_at.is_none()
            && self.notes.is_none()
    }
}

impl Validate for UpdateJobRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for (field, value) in [
            ("title", &self.title),
            ("company", &self.company),
            ("jd_raw", &self.jd_raw),
        ] {
            if let Some(Err(e)) = value.as_deref().map(not_blank) {
                errors.add(field, e);
            }
        }
        if let Err(e) = nullable_with(&self.source_url, http_url) {
            errors.add("source_url", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AnalyzeJdRequest {
    #[validate(custom = "not_blank")]
    pub jd_text: String,
    pub job_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct JobListQuery {
    pub status: Option<String>,
}

/// Spans that may be stored on a job whose text is `jd_raw`.
///
/// Offsets are only meaningful for the text they were computed on, so an
/// analysis of any other text yields `None`.
pub fn spans_for_stored_jd(jd_raw: &str, analyzed: &str, spans: &JdSpans) -> Option<JdSpans> {
    (jd_raw == analyzed).then(|| spans.clone().sanitized(char_len(jd_raw)))
}
