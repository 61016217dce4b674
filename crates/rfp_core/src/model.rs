use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifier stamped on every effect and echoed back by the engine.
pub type RequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Queued,
    Processing,
    Complete,
    Error,
    /// Any status string the server sends that is not one of the above.
    Unknown,
}

impl JobStatus {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("queued") {
            JobStatus::Queued
        } else if raw.eq_ignore_ascii_case("processing") {
            JobStatus::Processing
        } else if raw.eq_ignore_ascii_case("complete") || raw.eq_ignore_ascii_case("ready") {
            JobStatus::Complete
        } else if raw.eq_ignore_ascii_case("error") {
            JobStatus::Error
        } else {
            JobStatus::Unknown
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "Queued",
            JobStatus::Processing => "Processing",
            JobStatus::Complete => "Complete",
            JobStatus::Error => "Error",
            JobStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for JobStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JobStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(JobStatus::parse(&raw))
    }
}

/// A tracked upload, RFP or artifact. The name is the identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub name: String,
    #[serde(default)]
    pub status: JobStatus,
}

impl JobRecord {
    pub fn new(name: impl Into<String>, status: JobStatus) -> Self {
        Self {
            name: name.into(),
            status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Reviewer judgement on an extracted requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementFlag {
    Yes,
    No,
    #[default]
    #[serde(other)]
    Unset,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Requirement {
    #[serde(default, deserialize_with = "text_or_null")]
    pub section_name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub section_number: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub page_number: String,
    #[serde(default, deserialize_with = "text_or_null")]
    pub content: String,
    #[serde(default, deserialize_with = "flag_or_null")]
    pub is_requirement: RequirementFlag,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Section {
    pub section_id: String,
    #[serde(default, deserialize_with = "text_or_null")]
    pub content: String,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    #[serde(default)]
    pub reviewed: bool,
}

/// Body of `POST /update-requirements`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionSubmission {
    pub rfp_name: String,
    pub section_id: String,
    pub requirements: RequirementJudgements,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequirementJudgements {
    pub analysis: String,
    pub output: Vec<Requirement>,
}

/// Server-side progress, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Progress {
    pub extraction: f32,
    pub review: f32,
}

impl Progress {
    pub fn new(extraction: f32, review: f32) -> Self {
        Self {
            extraction: clamp_percent(extraction),
            review: clamp_percent(review),
        }
    }

    pub fn extraction_done(&self) -> bool {
        self.extraction >= 100.0
    }
}

fn clamp_percent(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// Stored records may carry `null` where a string is expected.
fn text_or_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn flag_or_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RequirementFlag, D::Error> {
    Ok(Option::<RequirementFlag>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
        Missing,
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Int(value) => value.to_string(),
        Raw::Float(value) => value.to_string(),
        Raw::Missing => String::new(),
    })
}
