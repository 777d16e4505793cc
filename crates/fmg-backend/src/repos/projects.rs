//! Project list, detail and stage management.

use chrono::Utc;
use fmg_core::entities::Project;
use fmg_core::enums::{ProjectStage, ProjectTab};
use serde_json::json;

use super::tables::PROJECTS;
use crate::client::BackendClient;
use crate::error::BackendError;
use crate::query::Query;

pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Filters behind a project list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFilter {
    pub tab: ProjectTab,
    /// Case-insensitive title search.
    pub search: Option<String>,
    /// Restrict to one client (the client-side portal).
    pub client_id: Option<String>,
    /// Restrict to one person in charge.
    pub pic_id: Option<String>,
    /// Zero-based.
    pub page: u64,
    pub page_size: u64,
}

impl Default for ProjectFilter {
    fn default() -> Self {
        Self {
            tab: ProjectTab::Active,
            search: None,
            client_id: None,
            pic_id: None,
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ProjectFilter {
    /// Filters without paging or ordering.
    #[must_use]
    pub fn to_filter_query(&self) -> Query {
        let mut query = Query::new().in_list("stage", self.tab.stages());
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query = query.contains_text("title", search);
        }
        if let Some(client_id) = &self.client_id {
            query = query.eq("client_id", client_id);
        }
        if let Some(pic_id) = &self.pic_id {
            query = query.eq("pic_id", pic_id);
        }
        query
    }

    /// Newest first, one page.
    #[must_use]
    pub fn to_query(&self) -> Query {
        self.to_filter_query()
            .order("created_at", false)
            .page(self.page, self.page_size)
    }
}

impl BackendClient {
    pub async fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>, BackendError> {
        self.select(PROJECTS, &filter.to_query()).await
    }

    /// Total rows for `filter` across all pages.
    pub async fn count_projects(&self, filter: &ProjectFilter) -> Result<u64, BackendError> {
        self.count(PROJECTS, &filter.to_filter_query()).await
    }

    pub async fn get_project(&self, id: &str) -> Result<Project, BackendError> {
        self.select_one(PROJECTS, &Query::new().eq("id", id))
            .await?
            .ok_or_else(|| BackendError::NotFound {
                table: PROJECTS.into(),
                id: id.into(),
            })
    }

    /// Move a project to `next` if its current stage allows it.
    ///
    /// The update is conditional on the stage read, so a concurrent move
    /// surfaces as `NotFound` instead of being overwritten.
    pub async fn update_project_stage(&self, id: &str, next: ProjectStage) -> Result<Project, BackendError> {
        let current = self.get_project(id).await?;
        if !current.stage.can_transition_to(next) {
            return Err(BackendError::InvalidTransition {
                entity: "project",
                from: current.stage.to_string(),
                to: next.to_string(),
            });
        }
        let query = Query::new().eq("id", id).eq("stage", current.stage);
        let patch = json!({ "stage": next, "updated_at": Utc::now() });
        let updated: Vec<Project> = self.update(PROJECTS, &query, &patch).await?;
        tracing::info!(project_id = id, from = %current.stage, to = %next, "project stage changed");
        updated.into_iter().next().ok_or_else(|| BackendError::NotFound {
            table: PROJECTS.into(),
            id: id.into(),
        })
    }

    /// Set or clear the person in charge.
    pub async fn assign_pic(&self, id: &str, pic_id: Option<&str>) -> Result<Project, BackendError> {
        let patch = json!({ "pic_id": pic_id, "updated_at": Utc::now() });
        let updated: Vec<Project> = self.update(PROJECTS, &Query::new().eq("id", id), &patch).await?;
        updated.into_iter().next().ok_or_else(|| BackendError::NotFound {
            table: PROJECTS.into(),
            id: id.into(),
        })
    }
}
