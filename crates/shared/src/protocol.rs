use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{GenerationKind, ParsedResume, ResumeId};

/// The backend writes `created_at` as a naive Python isoformat string
/// with no UTC offset (e.g. `2025-06-01T12:00:00.123456`); those
/// timestamps are UTC by convention. Accept both that shape and proper
/// RFC 3339.
pub mod utc_timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if let Ok(value) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(value.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}

/// Body of a successful `POST /api/resume/upload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResumeResponse {
    #[serde(default)]
    pub message: String,
    pub resume_id: ResumeId,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub parsed_data: ParsedResume,
}

/// Body of `POST /api/resume/improve`. Empty job fields are sent as
/// `null`, never as empty strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImproveResumeRequest {
    pub resume_id: ResumeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImproveResumeResponse {
    #[serde(default)]
    pub response_id: String,
    pub resume_id: ResumeId,
    pub improved_resume: String,
}

/// Body of `POST /api/cover-letter/generate`. All fields are required by
/// the backend; the client substitutes a placeholder description when the
/// user left it blank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverLetterRequest {
    pub resume_id: ResumeId,
    pub job_title: String,
    pub job_description: String,
    pub company_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverLetterResponse {
    #[serde(default)]
    pub response_id: String,
    pub resume_id: ResumeId,
    pub cover_letter: String,
}

/// Body of `GET /api/resume/{resume_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeRecordResponse {
    pub resume_id: ResumeId,
    pub filename: String,
    #[serde(default)]
    pub parsed_data: ParsedResume,
    #[serde(with = "utc_timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: GenerationKind,
    pub content: String,
    #[serde(with = "utc_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Body of `GET /api/ai-responses/{resume_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationHistoryResponse {
    pub resume_id: ResumeId,
    #[serde(default)]
    pub responses: Vec<GenerationRecord>,
}
