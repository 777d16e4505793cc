//! Invoices with monthly sequential numbering.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use fmg_core::entities::Invoice;
use fmg_core::enums::InvoiceStatus;
use serde_json::json;

use super::tables::INVOICES;
use crate::client::BackendClient;
use crate::error::BackendError;
use crate::query::Query;

/// `INV-YYYYMM-####` for the `sequence`-th invoice issued in `issued_at`'s month.
#[must_use]
pub fn invoice_number(issued_at: DateTime<Utc>, sequence: u64) -> String {
    format!(
        "INV-{:04}{:02}-{sequence:04}",
        issued_at.year(),
        issued_at.month()
    )
}

fn month_prefix(issued_at: DateTime<Utc>) -> String {
    format!("INV-{:04}{:02}-", issued_at.year(), issued_at.month())
}

impl BackendClient {
    pub async fn list_invoices(&self, project_id: &str) -> Result<Vec<Invoice>, BackendError> {
        let query = Query::new()
            .eq("project_id", project_id)
            .order("issued_at", false);
        self.select(INVOICES, &query).await
    }

    /// Issue a `draft` invoice numbered after this month's existing ones.
    pub async fn create_invoice(
        &self,
        project_id: &str,
        amount: u64,
        due_date: NaiveDate,
    ) -> Result<Invoice, BackendError> {
        if amount == 0 {
            return Err(BackendError::Validation("invoice amount must be positive".into()));
        }
        let now = Utc::now();
        let issued_this_month = self
            .count(
                INVOICES,
                &Query::new().ilike("number", &format!("{}*", month_prefix(now))),
            )
            .await?;
        let number = invoice_number(now, issued_this_month + 1);
        let row = json!({
            "project_id": project_id,
            "number": number,
            "amount": amount,
            "status": InvoiceStatus::Draft,
            "issued_at": now,
            "due_date": due_date,
        });
        let invoice: Invoice = self.insert_one(INVOICES, &row).await?;
        tracing::info!(project_id, number = %invoice.number, amount, "invoice created");
        Ok(invoice)
    }

    /// Move an invoice to `next`; `paid` also stamps `paid_at`.
    pub async fn mark_invoice(&self, id: &str, next: InvoiceStatus) -> Result<Invoice, BackendError> {
        let current: Invoice = self
            .select_one(INVOICES, &Query::new().eq("id", id))
            .await?
            .ok_or_else(|| BackendError::NotFound {
                table: INVOICES.into(),
                id: id.into(),
            })?;
        if !current.status.can_transition_to(next) {
            return Err(BackendError::InvalidTransition {
                entity: "invoice",
                from: current.status.to_string(),
                to: next.to_string(),
            });
        }
        let mut patch = json!({ "status": next });
        if next == InvoiceStatus::Paid {
            patch["paid_at"] = json!(Utc::now());
        }
        let query = Query::new().eq("id", id).eq("status", current.status);
        let updated: Vec<Invoice> = self.update(INVOICES, &query, &patch).await?;
        updated.into_iter().next().ok_or_else(|| BackendError::NotFound {
            table: INVOICES.into(),
            id: id.into(),
        })
    }
}
