//! Server-side project submission: re-validate, then fan out inserts.
//!
//! Order: project → milestones → payment schedule → reference links. Each
//! later step is a single bulk insert. There is no transaction across tables,
//! so a failure after the project row exists is reported as
//! [`SubmissionError::Partial`] with the project id for manual cleanup.

use fmg_core::enums::{PaymentStatus, ProjectStage};
use fmg_core::responses::SubmissionResponse;
use fmg_core::submission::ProjectSubmission;
use serde::Serialize;
use serde_json::{Value, json};

use crate::client::BackendClient;
use crate::error::{FanOutStage, SubmissionError};
use crate::repos::tables::{MILESTONES, PAYMENT_SCHEDULES, PROJECTS, REFERENCE_LINKS};

#[derive(Debug, serde::Deserialize)]
struct Inserted {
    id: String,
}

fn count(rows: usize) -> u32 {
    u32::try_from(rows).unwrap_or(u32::MAX)
}

impl BackendClient {
    /// Create a project for `client_id` from a wizard submission.
    ///
    /// # Errors
    ///
    /// - [`SubmissionError::Invalid`]: the payload or its total failed
    ///   re-validation against the live catalog.
    /// - [`SubmissionError::Backend`]: the catalog could not be loaded or the
    ///   project insert failed.
    /// - [`SubmissionError::Partial`]: a child insert failed after the project
    ///   row was created.
    pub async fn submit_project(
        &self,
        client_id: &str,
        submission: &ProjectSubmission,
    ) -> Result<SubmissionResponse, SubmissionError> {
        let (services, bundles) = tokio::try_join!(self.active_services(), self.active_bundles())?;
        let validated = submission.validate(&services, &bundles)?;

        let project = json!({
            "client_id": client_id,
            "title": submission.title.trim(),
            "description": submission.description,
            "stage": ProjectStage::Submitted,
            "service_keys": submission.service_keys,
            "bundle_id": submission.bundle_id,
            "total_amount": validated.quote.total,
            "payment_plan": submission.payment_plan,
            "start_date": submission.start_date,
            "deadline": submission.deadline,
        });
        let created: Inserted = self.insert_one(PROJECTS, &project).await?;
        let project_id = created.id;
        tracing::info!(%project_id, client_id, total = validated.quote.total, "project inserted");

        let milestones: Vec<Value> = submission
            .milestones
            .iter()
            .enumerate()
            .map(|(position, m)| {
                json!({
                    "project_id": project_id,
                    "title": m.title.trim(),
                    "due_date": m.due_date,
                    "position": position,
                    "completed": false,
                })
            })
            .collect();
        self.fan_out(&project_id, FanOutStage::Milestones, MILESTONES, &milestones)
            .await?;

        let payments: Vec<Value> = validated
            .payments
            .iter()
            .map(|p| {
                json!({
                    "project_id": project_id,
                    "label": p.label,
                    "amount": p.amount,
                    "due_date": p.due_date,
                    "status": PaymentStatus::Pending,
                })
            })
            .collect();
        self.fan_out(&project_id, FanOutStage::PaymentSchedule, PAYMENT_SCHEDULES, &payments)
            .await?;

        let links: Vec<Value> = submission
            .reference_links
            .iter()
            .map(|l| json!({ "project_id": project_id, "url": l.url.trim(), "note": l.note }))
            .collect();
        self.fan_out(&project_id, FanOutStage::ReferenceLinks, REFERENCE_LINKS, &links)
            .await?;

        Ok(SubmissionResponse {
            project_id,
            total_amount: validated.quote.total,
            milestones: count(milestones.len()),
            payment_rows: count(payments.len()),
            reference_links: count(links.len()),
        })
    }

    async fn fan_out<B: Serialize>(
        &self,
        project_id: &str,
        stage: FanOutStage,
        table: &str,
        rows: &[B],
    ) -> Result<(), SubmissionError> {
        if rows.is_empty() {
            return Ok(());
        }
        match self.insert::<Inserted, _>(table, rows).await {
            Ok(_) => Ok(()),
            Err(source) => {
                tracing::error!(project_id, %stage, error = %source, "submission fan-out failed; project left partial");
                Err(SubmissionError::Partial {
                    project_id: project_id.to_string(),
                    stage,
                    source,
                })
            }
        }
    }
}

