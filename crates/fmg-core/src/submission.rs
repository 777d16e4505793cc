//! Project submission payload.
//!
//! Built by [`crate::wizard::OrderWizard::submission`] on the client side and
//! re-validated by the server before the fan-out inserts run. The server never
//! trusts the submitted total: it recomputes it against the live catalog.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Bundle, CatalogService};
use crate::enums::PaymentPlan;
use crate::errors::WizardError;
use crate::pricing::{Quote, quote};
use crate::schedule::{ScheduledPayment, payment_schedule};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MilestoneInput {
    pub title: String,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReferenceInput {
    pub url: String,
    #[serde(default)]
    pub note: Option<String>,
}

/// JSON body of `POST /api/projects/submit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProjectSubmission {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub service_keys: BTreeSet<String>,
    #[serde(default)]
    pub bundle_id: Option<String>,
    #[serde(default)]
    pub custom_prices: BTreeMap<String, u64>,
    pub start_date: NaiveDate,
    pub deadline: NaiveDate,
    #[serde(default)]
    pub milestones: Vec<MilestoneInput>,
    #[serde(default)]
    pub reference_links: Vec<ReferenceInput>,
    pub payment_plan: PaymentPlan,
    /// Total shown to the client when they confirmed the order.
    pub total_amount: u64,
}

/// A submission that passed [`ProjectSubmission::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSubmission {
    pub quote: Quote,
    pub payments: Vec<ScheduledPayment>,
}

impl ProjectSubmission {
    /// Re-run every wizard check against the given catalog.
    ///
    /// # Errors
    ///
    /// Returns the first [`WizardError`] found, including
    /// [`WizardError::TotalMismatch`] when `total_amount` disagrees with the
    /// recomputed quote.
    pub fn validate(
        &self,
        catalog: &[CatalogService],
        bundles: &[Bundle],
    ) -> Result<ValidatedSubmission, WizardError> {
        if self.service_keys.is_empty() {
            return Err(WizardError::NoServices);
        }
        let bundle = match &self.bundle_id {
            Some(id) => Some(
                bundles
                    .iter()
                    .find(|b| &b.id == id)
                    .ok_or_else(|| WizardError::UnknownBundle(id.clone()))?,
            ),
            None => None,
        };
        validate_details(
            &self.title,
            Some(self.start_date),
            Some(self.deadline),
            &self.milestones,
            &self.reference_links,
        )?;

        let quote = quote(catalog, &self.service_keys, bundle, &self.custom_prices)?;
        if quote.total != self.total_amount {
            return Err(WizardError::TotalMismatch {
                submitted: self.total_amount,
                computed: quote.total,
            });
        }
        let payments =
            payment_schedule(self.payment_plan, quote.total, self.start_date, self.deadline)?;
        Ok(ValidatedSubmission { quote, payments })
    }
}

/// Checks shared by the wizard's schedule step and the server.
///
/// # Errors
///
/// Returns the first failing [`WizardError`].
pub fn validate_details(
    title: &str,
    start: Option<NaiveDate>,
    deadline: Option<NaiveDate>,
    milestones: &[MilestoneInput],
    links: &[ReferenceInput],
) -> Result<(), WizardError> {
    if title.trim().is_empty() {
        return Err(WizardError::MissingTitle);
    }
    let (Some(start), Some(deadline)) = (start, deadline) else {
        return Err(WizardError::MissingDates);
    };
    if deadline < start {
        return Err(WizardError::DeadlineBeforeStart {
            start: start.to_string(),
            deadline: deadline.to_string(),
        });
    }
    for milestone in milestones {
        if milestone.title.trim().is_empty() {
            return Err(WizardError::MissingMilestoneTitle);
        }
        if milestone.due_date < start || milestone.due_date > deadline {
            return Err(WizardError::MilestoneOutOfRange {
                title: milestone.title.clone(),
            });
        }
    }
    if let Some(bad) = links.iter().find(|l| !is_http_url(&l.url)) {
        return Err(WizardError::InvalidLink(bad.url.clone()));
    }
    Ok(())
}

fn is_http_url(raw: &str) -> bool {
    url::Url::parse(raw).is_ok_and(|url| {
        matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty())
    })
}
