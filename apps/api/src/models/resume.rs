use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::vocab::SkillSource;
use crate::validation::not_blank;

/// A skill on a resume or extracted from a JD.
/// `locked` skills are never moved or dropped by a tailoring pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Skill {
    #[validate(custom = "not_blank")]
    pub name: String,
    pub source: SkillSource,
    pub locked: bool,
    #[serde(default)]
    pub score: Option<f64>,
}

impl Skill {
    pub fn new(name: impl Into<String>, source: SkillSource) -> Self {
        Self {
            name: name.into(),
            source,
            locked: false,
            score: None,
        }
    }

    /// Case-insensitive identity used for de-duplication and matching.
    pub fn key(&self) -> String {
        self.name.trim().to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CourseworkItem {
    #[validate(custom = "not_blank")]
    pub name: String,
    #[serde(default)]
    pub score: Option<f64>,
}

impl CourseworkItem {
    pub fn new(name: impl Into<String>, score: Option<f64>) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// Structured derivation of a master resume's LaTeX source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedResume {
    pub sections: BTreeMap<String, String>,
    #[serde(rename = "technicalSkills")]
    pub technical_skills: Vec<Skill>,
    #[serde(rename = "relevantCoursework")]
    pub relevant_coursework: Vec<CourseworkItem>,
}

/// The full skill/coursework selection a variant was built from (`diff_json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantDiff {
    pub skills: Vec<Skill>,
    pub coursework: Vec<CourseworkItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeMasterRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub latex_blob: String,
    pub parsed_json: Json<ParsedResume>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeVariantRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub latex_blob: String,
    pub pdf_path: Option<String>,
    pub diff_json: Option<Json<VariantDiff>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_resume_uses_camel_case_keys() {
        let parsed = ParsedResume {
            sections: BTreeMap::from([("Education".to_string(), "MIT".to_string())]),
            technical_skills: vec![Skill::new("Rust", SkillSource::Static)],
            relevant_coursework: vec![CourseworkItem::new("Operating Systems", Some(0.0))],
        };
        let value = serde_json::to_value(&parsed).unwrap();
        assert!(value.get("technicalSkills").is_some());
        assert!(value.get("relevantCoursework").is_some());
        assert_eq!(value["technicalSkills"][0]["source"], "static");
        assert_eq!(value["technicalSkills"][0]["locked"], false);
    }

    #[test]
    fn test_skill_score_is_optional_on_the_wire() {
        let skill: Skill =
            serde_json::from_str(r#"{"name": "Go", "source": "nice_to_have", "locked": true}"#)
                .unwrap();
        assert!(skill.locked);
        assert_eq!(skill.score, None);
        assert_eq!(skill.source, SkillSource::NiceToHave);
    }

    #[test]
    fn test_skill_with_unknown_source_fails() {
        let result: Result<Skill, _> =
            serde_json::from_str(r#"{"name": "Go", "source": "hobby", "locked": false}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_skill_name_fails_validation() {
        let skill = Skill::new("   ", SkillSource::Static);
        assert!(skill.validate().is_err());
        assert!(Skill::new("SQL", SkillSource::Static).validate().is_ok());
    }

    #[test]
    fn test_skill_key_is_case_insensitive() {
        assert_eq!(Skill::new(" PostgreSQL ", SkillSource::Static).key(), "postgresql");
    }
}
