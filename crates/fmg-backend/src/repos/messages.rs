use chrono::{DateTime, SecondsFormat, Utc};
use fmg_core::entities::DiscussionMessage;
use serde_json::json;

use super::tables::MESSAGES;
use crate::client::BackendClient;
use crate::error::BackendError;
use crate::query::Query;

impl BackendClient {
    /// A project's discussion thread, oldest first.
    pub async fn list_messages(&self, project_id: &str) -> Result<Vec<DiscussionMessage>, BackendError> {
        let query = Query::new()
            .eq("project_id", project_id)
            .order("created_at", true);
        self.select(MESSAGES, &query).await
    }

    /// Messages posted after `since`, for the polling fallback.
    pub async fn messages_since(
        &self,
        project_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<DiscussionMessage>, BackendError> {
        let mut query = Query::new().eq("project_id", project_id);
        if let Some(since) = since {
            query = query.gt("created_at", since.to_rfc3339_opts(SecondsFormat::Micros, true));
        }
        self.select(MESSAGES, &query.order("created_at", true)).await
    }

    pub async fn post_message(
        &self,
        project_id: &str,
        author_id: &str,
        body: &str,
    ) -> Result<DiscussionMessage, BackendError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(BackendError::Validation("message body is empty".into()));
        }
        let row = json!({ "project_id": project_id, "author_id": author_id, "body": body });
        self.insert_one(MESSAGES, &row).await
    }
}
