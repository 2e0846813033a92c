//! Master resume upload, per-job variants, and the tailoring pass.

pub mod handlers;
pub mod latex;
pub mod store;
pub mod tailoring;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::resume::{CourseworkItem, ParsedResume, Skill, VariantDiff};
use crate::validation::not_blank;

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UploadResumeRequest {
    #[validate(custom = "not_blank")]
    pub latex: String,
}

/// Full replacement set for one job's variant.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateResumeVariantRequest {
    pub job_id: Uuid,
    #[validate]
    pub skills: Vec<Skill>,
    #[validate]
    pub coursework: Vec<CourseworkItem>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct TailorVariantRequest {
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct MasterUploadResponse {
    pub id: Uuid,
    pub parsed: ParsedResume,
    /// False when an existing master was replaced.
    pub created: bool,
}

#[derive(Debug, Serialize)]
pub struct MasterResponse {
    pub id: Uuid,
    pub latex: String,
    pub parsed: ParsedResume,
}

#[derive(Debug, Serialize)]
pub struct VariantResponse {
    pub id: Uuid,
    pub job_id: Uuid,
    pub latex: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
    pub diff: Option<VariantDiff>,
}
