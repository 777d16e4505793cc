use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One message in a project's discussion thread.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DiscussionMessage {
    pub id: String,
    pub project_id: String,
    pub author_id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}
