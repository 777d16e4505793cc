use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::InvoiceStatus;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Invoice {
    pub id: String,
    pub project_id: String,
    /// Human-facing number, `INV-YYYYMM-####`.
    pub number: String,
    pub amount: u64,
    pub status: InvoiceStatus,
    pub issued_at: DateTime<Utc>,
    pub due_date: NaiveDate,
    pub paid_at: Option<DateTime<Utc>>,
}
