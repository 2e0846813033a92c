//! Closed status vocabularies. Every value is stored as TEXT and guarded by a
//! CHECK constraint in the schema; the enums below are the only way values
//! enter or leave the application.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A value outside one of the closed vocabularies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{value}' is not a valid {kind}")]
pub struct InvalidEnumValue {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    #[default]
    #[serde(rename = "Not Applied")]
    NotApplied,
    Applied,
    Interview,
    Offer,
    Rejected,
}

impl JobStatus {
    pub const ALL: [JobStatus; 5] = [
        JobStatus::NotApplied,
        JobStatus::Applied,
        JobStatus::Interview,
        JobStatus::Offer,
        JobStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::NotApplied => "Not Applied",
            JobStatus::Applied => "Applied",
            JobStatus::Interview => "Interview",
            JobStatus::Offer => "Offer",
            JobStatus::Rejected => "Rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[default]
    #[serde(rename = "Not Sent")]
    NotSent,
    Sent,
    Waiting,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 3] = [
        ApplicationStatus::NotSent,
        ApplicationStatus::Sent,
        ApplicationStatus::Waiting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::NotSent => "Not Sent",
            ApplicationStatus::Sent => "Sent",
            ApplicationStatus::Waiting => "Waiting",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionStatus {
    #[default]
    #[serde(rename = "No Connection")]
    NoConnection,
    #[serde(rename = "Reached Out")]
    ReachedOut,
    Connected,
}

impl ConnectionStatus {
    pub const ALL: [ConnectionStatus; 3] = [
        ConnectionStatus::NoConnection,
        ConnectionStatus::ReachedOut,
        ConnectionStatus::Connected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::NoConnection => "No Connection",
            ConnectionStatus::ReachedOut => "Reached Out",
            ConnectionStatus::Connected => "Connected",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactStatus {
    #[default]
    #[serde(rename = "Not Contacted")]
    NotContacted,
    #[serde(rename = "Reached Out")]
    ReachedOut,
    Connected,
    #[serde(rename = "Not Interested")]
    NotInterested,
}

impl ContactStatus {
    pub const ALL: [ContactStatus; 4] = [
        ContactStatus::NotContacted,
        ContactStatus::ReachedOut,
        ContactStatus::Connected,
        ContactStatus::NotInterested,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::NotContacted => "Not Contacted",
            ContactStatus::ReachedOut => "Reached Out",
            ContactStatus::Connected => "Connected",
            ContactStatus::NotInterested => "Not Interested",
        }
    }
}

/// Where a skill came from. `Static` skills come from the master resume itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillSource {
    Requirement,
    Responsibility,
    NiceToHave,
    Static,
}

impl SkillSource {
    pub const ALL: [SkillSource; 4] = [
        SkillSource::Requirement,
        SkillSource::Responsibility,
        SkillSource::NiceToHave,
        SkillSource::Static,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillSource::Requirement => "requirement",
            SkillSource::Responsibility => "responsibility",
            SkillSource::NiceToHave => "nice_to_have",
            SkillSource::Static => "static",
        }
    }

    /// Base relevance weight used when scoring extracted skills.
    pub fn base_score(&self) -> f64 {
        match self {
            SkillSource::Requirement => 3.0,
            SkillSource::Responsibility => 2.0,
            SkillSource::NiceToHave => 1.0,
            SkillSource::Static => 0.0,
        }
    }
}

/// Analytics event kinds. Rows of this type are append-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    JdProcessed,
    ResumeCompiled,
    CoverLetterGenerated,
    JobAdded,
    OutreachDmGenerated,
    ResumeViewed,
    Applied,
    Connected,
    Messaged,
}

impl ActionType {
    pub const ALL: [ActionType; 9] = [
        ActionType::JdProcessed,
        ActionType::ResumeCompiled,
        ActionType::CoverLetterGenerated,
        ActionType::JobAdded,
        ActionType::OutreachDmGenerated,
        ActionType::ResumeViewed,
        ActionType::Applied,
        ActionType::Connected,
        ActionType::Messaged,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::JdProcessed => "jd_processed",
            ActionType::ResumeCompiled => "resume_compiled",
            ActionType::CoverLetterGenerated => "cover_letter_generated",
            ActionType::JobAdded => "job_added",
            ActionType::OutreachDmGenerated => "outreach_dm_generated",
            ActionType::ResumeViewed => "resume_viewed",
            ActionType::Applied => "applied",
            ActionType::Connected => "connected",
            ActionType::Messaged => "messaged",
        }
    }
}

// Shared string conversions for every vocabulary above.
macro_rules! text_vocabulary {
    ($ty:ty, $kind:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = InvalidEnumValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| InvalidEnumValue {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }

        impl TryFrom<String> for $ty {
            type Error = InvalidEnumValue;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                s.parse()
            }
        }
    };
}

text_vocabulary!(JobStatus, "status");
text_vocabulary!(ApplicationStatus, "application_status");
text_vocabulary!(ConnectionStatus, "connection_status");
text_vocabulary!(ContactStatus, "contact status");
text_vocabulary!(SkillSource, "skill source");
text_vocabulary!(ActionType, "action type");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_status_serde_uses_display_strings() {
        let json = serde_json::to_string(&JobStatus::NotApplied).unwrap();
        assert_eq!(json, r#""Not Applied""#);
        let parsed: JobStatus = serde_json::from_str(r#""Interview""#).unwrap();
        assert_eq!(parsed, JobStatus::Interview);
    }

    #[test]
    fn test_serde_and_as_str_agree_for_every_variant() {
        for v in JobStatus::ALL {
            assert_eq!(serde_json::to_value(v).unwrap(), v.as_str());
        }
        for v in ApplicationStatus::ALL {
            assert_eq!(serde_json::to_value(v).unwrap(), v.as_str());
        }
        for v in ConnectionStatus::ALL {
            assert_eq!(serde_json::to_value(v).unwrap(), v.as_str());
        }
        for v in ContactStatus::ALL {
            assert_eq!(serde_json::to_value(v).unwrap(), v.as_str());
        }
        for v in SkillSource::ALL {
            assert_eq!(serde_json::to_value(v).unwrap(), v.as_str());
        }
        for v in ActionType::ALL {
            assert_eq!(serde_json::to_value(v).unwrap(), v.as_str());
        }
    }

    #[test]
    fn test_from_str_round_trips_every_variant() {
        for v in ContactStatus::ALL {
            assert_eq!(v.as_str().parse::<ContactStatus>().unwrap(), v);
        }
        for v in ActionType::ALL {
            assert_eq!(v.as_str().parse::<ActionType>().unwrap(), v);
        }
    }

    #[test]
    fn test_values_outside_the_set_are_rejected() {
        let err = "Ghosted".parse::<JobStatus>().unwrap_err();
        assert_eq!(err.kind, "status");
        assert_eq!(err.value, "Ghosted");

        // case matters: the stored vocabulary is exact
        assert!("applied".parse::<JobStatus>().is_err());
        assert!("Pending".parse::<ApplicationStatus>().is_err());
        assert!(serde_json::from_str::<ConnectionStatus>(r#""Blocked""#).is_err());
        assert!(serde_json::from_str::<SkillSource>(r#""Requirement""#).is_err());
    }

    #[test]
    fn test_defaults_match_schema_defaults() {
        assert_eq!(JobStatus::default().as_str(), "Not Applied");
        assert_eq!(ApplicationStatus::default().as_str(), "Not Sent");
        assert_eq!(ConnectionStatus::default().as_str(), "No Connection");
        assert_eq!(ContactStatus::default().as_str(), "Not Contacted");
    }

    #[test]
    fn test_skill_source_priority_order() {
        assert!(SkillSource::Requirement.base_score() > SkillSource::Responsibility.base_score());
        assert!(SkillSource::Responsibility.base_score() > SkillSource::NiceToHave.base_score());
        assert!(SkillSource::NiceToHave.base_score() > SkillSource::Static.base_score());
    }
}
