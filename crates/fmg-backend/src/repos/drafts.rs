//! Draft uploads, reviews and revision requests.

use fmg_core::entities::{Draft, Revision};
use fmg_core::enums::DraftStatus;
use serde::Serialize;
use serde_json::json;

use super::tables::{DRAFTS, REVISIONS};
use crate::client::BackendClient;
use crate::error::BackendError;
use crate::query::Query;

/// A draft about to be uploaded. The version is assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDraft {
    pub project_id: String,
    pub title: String,
    pub file_url: String,
    pub uploaded_by: String,
}

#[derive(Serialize)]
struct DraftInsert<'a> {
    project_id: &'a str,
    title: &'a str,
    file_url: &'a str,
    uploaded_by: &'a str,
    version: u32,
    status: DraftStatus,
}

impl BackendClient {
    /// Drafts of a project, newest version first.
    pub async fn list_drafts(&self, project_id: &str) -> Result<Vec<Draft>, BackendError> {
        let query = Query::new()
            .eq("project_id", project_id)
            .order("version", false);
        self.select(DRAFTS, &query).await
    }

    /// Insert the next version of a project's draft, pending review.
    pub async fn upload_draft(&self, draft: &NewDraft) -> Result<Draft, BackendError> {
        if draft.title.trim().is_empty() || draft.file_url.trim().is_empty() {
            return Err(BackendError::Validation("draft title and file are required".into()));
        }
        let latest: Option<Draft> = self
            .select_one(
                DRAFTS,
                &Query::new()
                    .eq("project_id", &draft.project_id)
                    .order("version", false),
            )
            .await?;
        let version = latest.map_or(1, |d| d.version + 1);
        let row = DraftInsert {
            project_id: &draft.project_id,
            title: &draft.title,
            file_url: &draft.file_url,
            uploaded_by: &draft.uploaded_by,
            version,
            status: DraftStatus::PendingReview,
        };
        let inserted: Draft = self.insert_one(DRAFTS, &row).await?;
        tracing::info!(project_id = %draft.project_id, version, "draft uploaded");
        Ok(inserted)
    }

    pub async fn get_draft(&self, id: &str) -> Result<Draft, BackendError> {
        self.select_one(DRAFTS, &Query::new().eq("id", id))
            .await?
            .ok_or_else(|| BackendError::NotFound {
                table: DRAFTS.into(),
                id: id.into(),
            })
    }

    /// Approve a draft or send it back.
    pub async fn review_draft(&self, id: &str, next: DraftStatus) -> Result<Draft, BackendError> {
        let current = self.get_draft(id).await?;
        if !current.status.can_transition_to(next) {
            return Err(BackendError::InvalidTransition {
                entity: "draft",
                from: current.status.to_string(),
                to: next.to_string(),
            });
        }
        let query = Query::new().eq("id", id).eq("status", current.status);
        let updated: Vec<Draft> = self.update(DRAFTS, &query, &json!({ "status": next })).await?;
        updated.into_iter().next().ok_or_else(|| BackendError::NotFound {
            table: DRAFTS.into(),
            id: id.into(),
        })
    }

    /// Mark a draft `revision_requested` and record the reviewer's notes.
    pub async fn request_revision(
        &self,
        draft_id: &str,
        requested_by: &str,
        notes: &str,
    ) -> Result<Revision, BackendError> {
        if notes.trim().is_empty() {
            return Err(BackendError::Validation("revision notes are required".into()));
        }
        self.review_draft(draft_id, DraftStatus::RevisionRequested).await?;
        let row = json!({
            "draft_id": draft_id,
            "requested_by": requested_by,
            "notes": notes.trim(),
        });
        self.insert_one(REVISIONS, &row).await
    }

    pub async fn list_revisions(&self, draft_id: &str) -> Result<Vec<Revision>, BackendError> {
        let query = Query::new()
            .eq("draft_id", draft_id)
            .order("created_at", true);
        self.select(REVISIONS, &query).await
    }
}
