//! One cover letter per job, drafted by the language model from a fixed template.

pub mod handlers;
pub mod prompts;
pub mod store;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::llm_client::{prompts::NO_FABRICATION_INSTRUCTION, CallOptions, LlmClient};
use crate::models::job::JobRow;
use crate::validation::not_blank;

use prompts::{COVER_LETTER_PROMPT_TEMPLATE, COVER_LETTER_SYSTEM, COVER_LETTER_TEMPLATE};

/// Characters of the JD included in the prompt.
pub const JD_EXCERPT_CHARS: usize = 2000;
const MAX_TOKENS: u32 = 500;

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct GenerateCoverLetterRequest {
    pub job_id: Uuid,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateCoverLetterRequest {
    #[validate(custom = "not_blank")]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct CoverLetterResponse {
    pub id: Uuid,
    pub job_id: Uuid,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
}

pub fn build_prompt(title: &str, company: &str, jd_raw: &str) -> String {
    let excerpt: String = jd_raw.chars().take(JD_EXCERPT_CHARS).collect();
    COVER_LETTER_PROMPT_TEMPLATE
        .replace("{rules}", NO_FABRICATION_INSTRUCTION)
        .replace("{template}", COVER_LETTER_TEMPLATE)
        .replace("{company}", company.trim())
        .replace("{role}", title.trim())
        .replace("{jd_excerpt}", &excerpt)
}

pub async fn generate_cover_letter(llm: &LlmClient, job: &JobRow) -> Result<String, AppError> {
    let prompt = build_prompt(&job.title, &job.company, &job.jd_raw);
    llm.call_text(&prompt, COVER_LETTER_SYSTEM, CallOptions::creative(MAX_TOKENS))
        .await
        .map_err(|e| AppError::Llm(format!("Cover letter generation failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_fills_job_fields_and_keeps_template() {
        let prompt = build_prompt(" Backend Engineer ", "Acme", "Requires Python and SQL.");
        assert!(prompt.contains("{Company} with: Acme"));
        assert!(prompt.contains("{Role} with: Backend Engineer"));
        assert!(prompt.contains("Dear Hiring Manager,"));
        assert!(prompt.contains("Requires Python and SQL."));
        assert!(prompt.contains(NO_FABRICATION_INSTRUCTION));
        assert!(!prompt.contains("{jd_excerpt}"));
    }

    #[test]
    fn test_prompt_truncates_jd_by_characters() {
        let jd = "é".repeat(JD_EXCERPT_CHARS + 50);
        let prompt = build_prompt("SWE", "Acme", &jd);
        assert!(prompt.contains(&"é".repeat(JD_EXCERPT_CHARS)));
        assert!(!prompt.contains(&"é".repeat(JD_EXCERPT_CHARS + 1)));
    }

    #[test]
    fn test_update_requires_text() {
        let req: UpdateCoverLetterRequest = serde_json::from_str(r#"{"text": ""}"#).unwrap();
        assert!(req.validate().is_err());
        assert!(serde_json::from_str::<GenerateCoverLetterRequest>(r#"{"job_id": "nope"}"#).is_err());
    }
}
