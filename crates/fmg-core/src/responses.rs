//! JSON response bodies returned by `fmg-server`.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{MeetingProvider, Role};

/// Response from `POST /api/projects/submit`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SubmissionResponse {
    pub project_id: String,
    pub total_amount: u64,
    pub milestones: u32,
    pub payment_rows: u32,
    pub reference_links: u32,
}

/// Response from `POST /api/owner/bootstrap`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct BootstrapResponse {
    pub user_id: String,
    pub role: Role,
}

/// JSON body of `POST /api/meetings/{provider}`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct MeetingRequest {
    pub project_id: String,
    pub topic: String,
    pub starts_at: DateTime<Utc>,
    pub duration_minutes: u32,
}

/// Response from `POST /api/meetings/{provider}`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct MeetingCreatedResponse {
    pub meeting_id: String,
    pub join_url: String,
    pub provider: MeetingProvider,
}

/// Response from `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Error body for every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}
