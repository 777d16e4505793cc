use chrono::{DateTime, Utc};
use fmg_core::entities::Meeting;
use fmg_core::enums::MeetingProvider;
use serde::Serialize;

use super::tables::MEETINGS;
use crate::client::BackendClient;
use crate::error::BackendError;
use crate::query::Query;

/// A meeting created on a provider, ready to be recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewMeeting {
    pub project_id: String,
    pub provider: MeetingProvider,
    pub topic: String,
    pub starts_at: DateTime<Utc>,
    pub duration_minutes: u32,
    pub join_url: String,
    pub created_by: String,
}

impl BackendClient {
    /// Meetings of a project, soonest first.
    pub async fn list_meetings(&self, project_id: &str) -> Result<Vec<Meeting>, BackendError> {
        let query = Query::new()
            .eq("project_id", project_id)
            .order("starts_at", true);
        self.select(MEETINGS, &query).await
    }

    pub async fn record_meeting(&self, meeting: &NewMeeting) -> Result<Meeting, BackendError> {
        self.insert_one(MEETINGS, meeting).await
    }
}
