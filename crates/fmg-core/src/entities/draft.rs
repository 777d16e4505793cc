use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::DraftStatus;

/// An uploaded work-in-progress mix or master.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Draft {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub file_url: String,
    pub version: u32,
    pub status: DraftStatus,
    pub uploaded_by: String,
    pub created_at: DateTime<Utc>,
}

/// A client's change request against a draft.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Revision {
    pub id: String,
    pub draft_id: String,
    pub requested_by: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}
