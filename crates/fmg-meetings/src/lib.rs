//! # fmg-meetings
//!
//! Creates video meetings for projects: Google Calendar events with Meet
//! links (refresh-token grant) and Zoom webinars (server-to-server
//! account-credentials grant). Provider access tokens are cached until a
//! minute before expiry.

use std::future::Future;

use fmg_core::enums::MeetingProvider;
use fmg_core::responses::MeetingRequest;

pub mod error;
pub mod google;
mod token;
pub mod zoom;

pub use error::MeetingError;
pub use google::GoogleMeetClient;
pub use zoom::ZoomClient;

/// Longest meeting the hub will schedule.
pub const MAX_DURATION_MINUTES: u32 = 24 * 60;

/// A meeting created on a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledMeeting {
    pub provider: MeetingProvider,
    /// Provider-side event or webinar id.
    pub external_id: String,
    pub join_url: String,
}

/// A video-meeting provider.
pub trait MeetingScheduler: Send + Sync {
    fn provider(&self) -> MeetingProvider;

    fn create_meeting(
        &self,
        request: &MeetingRequest,
    ) -> impl Future<Output = Result<ScheduledMeeting, MeetingError>> + Send;
}

/// Reject requests no provider would accept.
///
/// # Errors
///
/// Returns `MeetingError::InvalidRequest` for a blank topic or project id, or a
/// duration outside `1..=1440` minutes.
pub fn validate_request(request: &MeetingRequest) -> Result<(), MeetingError> {
    if request.project_id.trim().is_empty() {
        return Err(MeetingError::InvalidRequest("project_id is required".into()));
    }
    if request.topic.trim().is_empty() {
        return Err(MeetingError::InvalidRequest("topic is required".into()));
    }
    if !(1..=MAX_DURATION_MINUTES).contains(&request.duration_minutes) {
        return Err(MeetingError::InvalidRequest(format!(
            "duration must be between 1 and {MAX_DURATION_MINUTES} minutes"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn request(topic: &str, duration_minutes: u32) -> MeetingRequest {
        MeetingRequest {
            project_id: "prj-1".into(),
            topic: topic.into(),
            starts_at: Utc::now(),
            duration_minutes,
        }
    }

    #[test]
    fn accepts_reasonable_request() {
        assert!(validate_request(&request("Kickoff", 30)).is_ok());
    }

    #[test]
    fn rejects_blank_topic_and_bad_duration() {
        assert!(validate_request(&request("  ", 30)).is_err());
        assert!(validate_request(&request("Kickoff", 0)).is_err());
        assert!(validate_request(&request("Kickoff", MAX_DURATION_MINUTES + 1)).is_err());
    }
}
