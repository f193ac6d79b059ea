//! Request/response types for the cookai teaching-assistant backend.
//!
//! These mirror the JSON bodies of the backend's HTTP endpoints. The AI
//! `result` envelope is kept as raw JSON here; turning it into something
//! renderable is the job of [`cookai_core::classify`].

use serde::{Deserialize, Serialize};

pub use cookai_core::{ContentId, DisplayType, ResponsePayload, UserId};

// ─── Paths ───────────────────────────────────────────────────────────────────

pub const HEALTH_PATH: &str = "/";
pub const GENERATE_PATH: &str = "/api/generate_exam";
pub const INGEST_PATH: &str = "/api/ingest";

// ─── Generation ──────────────────────────────────────────────────────────────

/// Body of `POST /api/generate_exam`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    pub unique_content_id: ContentId,
    pub user_id: UserId,
}

/// Successful response of `POST /api/generate_exam`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub job_id: Option<i64>,
    /// The AI response envelope, unclassified.
    #[serde(default)]
    pub result: serde_json::Value,
}

impl GenerateResponse {
    /// The envelope, or `None` when the backend sent no result at all.
    pub fn envelope(&self) -> Option<&serde_json::Value> {
        if self.result.is_null() {
            None
        } else {
            Some(&self.result)
        }
    }
}

// ─── Ingestion ───────────────────────────────────────────────────────────────

/// Form fields sent alongside the file in `POST /api/ingest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestForm {
    pub course_id: i64,
    pub uploader_id: UserId,
}

impl Default for IngestForm {
    fn default() -> Self {
        Self {
            course_id: 1,
            uploader_id: 1,
        }
    }
}

/// Successful response of `POST /api/ingest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestResponse {
    pub unique_content_id: ContentId,
    #[serde(default)]
    pub message: String,
}

// ─── Misc ────────────────────────────────────────────────────────────────────

/// Response of `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub message: String,
}

/// Body of a non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}
