use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::MeetingProvider;

/// A scheduled call with a join link from a third-party provider.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Meeting {
    pub id: String,
    pub project_id: String,
    pub provider: MeetingProvider,
    pub topic: String,
    pub starts_at: DateTime<Utc>,
    pub duration_minutes: u32,
    pub join_url: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}
