//! Networking contacts and LinkedIn DM drafting.

pub mod handlers;
pub mod prompts;
pub mod store;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::errors::AppError;
use crate::llm_client::{prompts::NO_FABRICATION_INSTRUCTION, CallOptions, LlmClient};
use crate::models::job::JobRow;
use crate::models::outreach::OutreachContactRow;
use crate::models::vocab::ContactStatus;
use crate::validation::{http_url, not_blank, nullable, nullable_with};

use prompts::{DM_PROMPT_TEMPLATE, DM_SYSTEM};

/// DMs are strictly shorter than this many characters.
pub const MAX_DM_CHARS: usize = 300;
const DM_JD_EXCERPT_CHARS: usize = 500;
const DM_MAX_TOKENS: u32 = 150;
const DEFAULT_RECIPIENT: &str = "there";

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateContactRequest {
    pub job_id: Option<Uuid>,
    #[validate(custom = "not_blank")]
    pub name: String,
    #[validate(custom = "http_url")]
    pub linkedin_url: Option<String>,
    pub role: Option<String>,
    pub notes: Option<String>,
}

/// Partial update. An explicit `null` clears a nullable column.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateContactRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub linkedin_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub role: Option<Option<String>>,
    pub status: Option<ContactStatus>,
    #[serde(default, deserialize_with = "nullable")]
    pub notes: Option<Option<String>>,
}

impl UpdateContactRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.linkedin_url.is_none()
            && self.role.is_none()
            && self.status.is_none()
            && self.notes.is_none()
    }
}

impl Validate for UpdateContactRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(Err(e)) = self.name.as_deref().map(not_blank) {
            errors.add("name", e);
        }
        if let Err(e) = nullable_with(&self.linkedin_url, http_url) {
            errors.add("linkedin_url", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ContactListQuery {
    pub job_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct GenerateDmRequest {
    pub contact_id: Option<Uuid>,
    pub job_id: Option<Uuid>,
    pub role: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DmResponse {
    pub dm_text: String,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Request name, then the contact's name, then a generic greeting.
pub fn recipient_name<'a>(requested: Option<&'a str>, contact: Option<&'a OutreachContactRow>) -> &'a str {
    non_blank(requested)
        .or_else(|| non_blank(contact.map(|c| c.name.as_str())))
        .unwrap_or(DEFAULT_RECIPIENT)
}

pub fn recipient_role<'a>(
    requested: Option<&'a str>,
    contact: Option<&'a OutreachContactRow>,
) -> Option<&'a str> {
    non_blank(requested).or_else(|| non_blank(contact.and_then(|c| c.role.as_deref())))
}

pub fn build_dm_prompt(name: &str, role: Option<&str>, job: Option<&JobRow>) -> String {
    let mut context = Vec::new();
    if let Some(role) = role {
        context.push(format!("Contact's role: {role}"));
    }
    if let Some(job) = job {
        context.push(format!("Job: {} at {}", job.title.trim(), job.company.trim()));
        let excerpt: String = job.jd_raw.chars().take(DM_JD_EXCERPT_CHARS).collect();
        context.push(format!("Job description: {excerpt}"));
    }
    let context = if context.is_empty() {
        String::new()
    } else {
        format!("Context: {}", context.join(" | "))
    };

    DM_PROMPT_TEMPLATE
        .replace("{rules}", NO_FABRICATION_INSTRUCTION)
        .replace("{name}", name)
        .replace("{context}", &context)
}

/// Trims `text` to fewer than [`MAX_DM_CHARS`] characters, cutting at a word
/// boundary when one exists.
pub fn fit_dm(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() < MAX_DM_CHARS {
        return text.to_string();
    }

    let cut: String = text.chars().take(MAX_DM_CHARS - 1).collect();
    let cut = match cut.rfind(char::is_whitespace) {
        Some(i) if i > 0 => &cut[..i],
        _ => cut.as_str(),
    };
    cut.trim_end().to_string()
}

pub async fn generate_dm(
    llm: &LlmClient,
    name: &str,
    role: Option<&str>,
    job: Option<&JobRow>,
) -> Result<String, AppError> {
    let prompt = build_dm_prompt(name, role, job);
    let text = llm
        .call_text(&prompt, DM_SYSTEM, CallOptions::creative(DM_MAX_TOKENS))
        .await
        .map_err(|e| AppError::Llm(format!("DM generation failed: {e}")))?;
    Ok(fit_dm(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn contact(name: &str, role: Option<&str>) -> OutreachContactRow {
        OutreachContactRow {
            id: Uuid::new_v4(),
            job_id: None,
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            linkedin_url: None,
            role: role.map(String::from),
            status: ContactStatus::NotContacted,
            last_contacted_at: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_recipient_name_fallbacks() {
        let dana = contact("Dana", Some("Recruiter"));
        assert_eq!(recipient_name(Some("Sam"), Some(&dana)), "Sam");
        assert_eq!(recipient_name(Some("  "), Some(&dana)), "Dana");
        assert_eq!(recipient_name(None, Some(&dana)), "Dana");
        assert_eq!(recipient_name(None, None), "there");
    }

    #[test]
    fn test_recipient_role_prefers_request() {
        let dana = contact("Dana", Some("Recruiter"));
        assert_eq!(recipient_role(Some("EM"), Some(&dana)), Some("EM"));
        assert_eq!(recipient_role(None, Some(&dana)), Some("Recruiter"));
        assert_eq!(recipient_role(None, None), None);
    }

    #[test]
    fn test_prompt_without_context() {
        let prompt = build_dm_prompt("there", None, None);
        assert!(prompt.contains("Recipient: there"));
        assert!(!prompt.contains("Context:"));
        assert!(!prompt.contains("{context}"));
    }

    #[test]
    fn test_fit_dm_keeps_short_messages() {
        assert_eq!(fit_dm("  Hi Dana, loved your talk.  "), "Hi Dana, loved your talk.");
    }

    #[test]
    fn test_fit_dm_cuts_below_limit_at_word_boundary() {
        let long = "word ".repeat(100);
        let fitted = fit_dm(&long);
        assert!(fitted.chars().count() < MAX_DM_CHARS);
        assert!(fitted.ends_with("word"));

        let unbroken = "é".repeat(400);
        assert_eq!(fit_dm(&unbroken).chars().count(), MAX_DM_CHARS - 1);
    }

    #[test]
    fn test_update_contact_request() {
        let req: UpdateContactRequest =
            serde_json::from_str(r#"{"status": "Reached Out", "role": null}"#).unwrap();
        assert_eq!(req.status, Some(ContactStatus::ReachedOut));
        assert_eq!(req.role, Some(None));
        assert!(req.validate().is_ok());

        assert!(serde_json::from_str::<UpdateContactRequest>(r#"{"status": "Ghosted"}"#).is_err());
        let bad: UpdateContactRequest =
            serde_json::from_str(r#"{"linkedin_url": "linkedin"}"#).unwrap();
        assert!(bad.validate().is_err());
    }
}
