use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{PaymentPlan, PaymentStatus, ProjectStage};

/// A production request and its progress through the studio.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Project {
    pub id: String,
    pub client_id: String,
    pub title: String,
    pub description: Option<String>,
    pub stage: ProjectStage,
    /// Person in charge (staff profile id).
    pub pic_id: Option<String>,
    #[serde(default)]
    pub service_keys: Vec<String>,
    pub bundle_id: Option<String>,
    pub total_amount: u64,
    pub payment_plan: PaymentPlan,
    pub start_date: NaiveDate,
    pub deadline: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Milestone {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub due_date: NaiveDate,
    pub position: u32,
    #[serde(default)]
    pub completed: bool,
}

/// One scheduled payment generated from the project's payment plan.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct PaymentScheduleRow {
    pub id: String,
    pub project_id: String,
    pub label: String,
    pub amount: u64,
    pub due_date: NaiveDate,
    pub status: PaymentStatus,
}

/// A reference track or moodboard link attached at submission.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ReferenceLink {
    pub id: String,
    pub project_id: String,
    pub url: String,
    pub note: Option<String>,
}
