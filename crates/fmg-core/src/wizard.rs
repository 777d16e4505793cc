//! Three-step order wizard.
//!
//! ```text
//! services → schedule → payment → submission()
//!     ↑__________|_________|        (back)
//! ```
//!
//! The wizard accumulates selections in memory and keeps a running total.
//! Every operation that fails validation leaves the wizard unchanged.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entities::{Bundle, CatalogService};
use crate::enums::PaymentPlan;
use crate::errors::{PricingError, WizardError};
use crate::pricing::{Quote, quote};
use crate::schedule::{ScheduledPayment, payment_schedule};
use crate::submission::{MilestoneInput, ProjectSubmission, ReferenceInput, validate_details};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Services,
    Schedule,
    Payment,
}

impl WizardStep {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Services => "services",
            Self::Schedule => "schedule",
            Self::Payment => "payment",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct OrderWizard {
    catalog: Vec<CatalogService>,
    bundles: Vec<Bundle>,
    step: WizardStep,
    selected: BTreeSet<String>,
    bundle_id: Option<String>,
    custom_prices: BTreeMap<String, u64>,
    title: String,
    description: Option<String>,
    start_date: Option<NaiveDate>,
    deadline: Option<NaiveDate>,
    milestones: Vec<MilestoneInput>,
    reference_links: Vec<ReferenceInput>,
    payment_plan: Option<PaymentPlan>,
}

impl OrderWizard {
    /// Start a wizard over the active catalog entries.
    #[must_use]
    pub fn new(catalog: Vec<CatalogService>, bundles: Vec<Bundle>) -> Self {
        Self {
            catalog: catalog.into_iter().filter(|s| s.active).collect(),
            bundles: bundles.into_iter().filter(|b| b.active).collect(),
            step: WizardStep::Services,
            selected: BTreeSet::new(),
            bundle_id: None,
            custom_prices: BTreeMap::new(),
            title: String::new(),
            description: None,
            start_date: None,
            deadline: None,
            milestones: Vec::new(),
            reference_links: Vec::new(),
            payment_plan: None,
        }
    }

    #[must_use]
    pub const fn step(&self) -> WizardStep {
        self.step
    }

    #[must_use]
    pub const fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    #[must_use]
    pub fn bundle(&self) -> Option<&Bundle> {
        let id = self.bundle_id.as_ref()?;
        self.bundles.iter().find(|b| &b.id == id)
    }

    // -- services step ------------------------------------------------------

    /// Select or deselect a service. Deselecting a key covered by the chosen
    /// bundle drops the bundle.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::UnknownService`] if `key` is not in the catalog.
    pub fn toggle_service(&mut self, key: &str) -> Result<bool, WizardError> {
        self.ensure_known(key)?;
        if self.selected.remove(key) {
            if self.bundle().is_some_and(|b| b.includes(key)) {
                self.bundle_id = None;
            }
            Ok(false)
        } else {
            self.selected.insert(key.to_string());
            Ok(true)
        }
    }

    /// Choose a bundle; its services become selected.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::UnknownBundle`] for an inactive or unknown id, or
    /// a pricing error if the bundle names a key missing from the catalog.
    pub fn select_bundle(&mut self, bundle_id: &str) -> Result<(), WizardError> {
        let bundle = self
            .bundles
            .iter()
            .find(|b| b.id == bundle_id)
            .ok_or_else(|| WizardError::UnknownBundle(bundle_id.to_string()))?;
        for key in &bundle.service_keys {
            self.ensure_known(key)?;
        }
        self.selected.extend(bundle.service_keys.iter().cloned());
        self.bundle_id = Some(bundle.id.clone());
        Ok(())
    }

    /// Drop the bundle but keep its services selected at individual prices.
    pub fn clear_bundle(&mut self) {
        self.bundle_id = None;
    }

    /// Set or clear a custom price. Values below the catalog default are
    /// accepted and clamped when priced.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::UnknownService`] if `key` is not in the catalog.
    pub fn set_custom_price(&mut self, key: &str, price: Option<u64>) -> Result<(), WizardError> {
        self.ensure_known(key)?;
        match price {
            Some(price) => {
                self.custom_prices.insert(key.to_string(), price);
            }
            None => {
                self.custom_prices.remove(key);
            }
        }
        Ok(())
    }

    /// Itemized price of the current selection.
    ///
    /// # Errors
    ///
    /// Only fails if the catalog itself is inconsistent.
    pub fn quote(&self) -> Result<Quote, WizardError> {
        Ok(quote(
            &self.catalog,
            &self.selected,
            self.bundle(),
            &self.custom_prices,
        )?)
    }

    #[must_use]
    pub fn running_total(&self) -> u64 {
        self.quote().map_or(0, |q| q.total)
    }

    // -- schedule step ------------------------------------------------------

    pub fn set_details(
        &mut self,
        title: impl Into<String>,
        description: Option<String>,
        start_date: NaiveDate,
        deadline: NaiveDate,
    ) {
        self.title = title.into();
        self.description = description.filter(|d| !d.trim().is_empty());
        self.start_date = Some(start_date);
        self.deadline = Some(deadline);
    }

    pub fn add_milestone(&mut self, title: impl Into<String>, due_date: NaiveDate) {
        self.milestones.push(MilestoneInput {
            title: title.into(),
            due_date,
        });
    }

    pub fn remove_milestone(&mut self, index: usize) -> Option<MilestoneInput> {
        (index < self.milestones.len()).then(|| self.milestones.remove(index))
    }

    pub fn add_reference_link(&mut self, url: impl Into<String>, note: Option<String>) {
        self.reference_links.push(ReferenceInput {
            url: url.into(),
            note,
        });
    }

    // -- payment step -------------------------------------------------------

    /// # Errors
    ///
    /// Returns [`WizardError::InvalidInstallments`] for a month count outside `2..=12`.
    pub fn set_payment_plan(&mut self, plan: PaymentPlan) -> Result<(), WizardError> {
        if let PaymentPlan::Installments { months } = plan {
            if !(PaymentPlan::MIN_INSTALLMENTS..=PaymentPlan::MAX_INSTALLMENTS).contains(&months) {
                return Err(WizardError::InvalidInstallments(months));
            }
        }
        self.payment_plan = Some(plan);
        Ok(())
    }

    /// Payment rows the chosen plan would generate for the running total.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::MissingPaymentPlan`] or [`WizardError::MissingDates`]
    /// when those have not been provided yet.
    pub fn preview_schedule(&self) -> Result<Vec<ScheduledPayment>, WizardError> {
        let plan = self.payment_plan.ok_or(WizardError::MissingPaymentPlan)?;
        let (Some(start), Some(deadline)) = (self.start_date, self.deadline) else {
            return Err(WizardError::MissingDates);
        };
        payment_schedule(plan, self.running_total(), start, deadline)
    }

    // -- navigation ---------------------------------------------------------

    /// Validate the current step and advance.
    ///
    /// # Errors
    ///
    /// Returns the step's validation error, or [`WizardError::WrongStep`] from
    /// the last step.
    pub fn next(&mut self) -> Result<WizardStep, WizardError> {
        let next = match self.step {
            WizardStep::Services => {
                self.validate_services()?;
                WizardStep::Schedule
            }
            WizardStep::Schedule => {
                self.validate_schedule()?;
                WizardStep::Payment
            }
            WizardStep::Payment => {
                return Err(WizardError::WrongStep {
                    action: "advance".into(),
                    step: self.step.to_string(),
                });
            }
        };
        self.step = next;
        Ok(next)
    }

    /// Go back one step, keeping every selection.
    pub fn back(&mut self) -> WizardStep {
        self.step = match self.step {
            WizardStep::Services | WizardStep::Schedule => WizardStep::Services,
            WizardStep::Payment => WizardStep::Schedule,
        };
        self.step
    }

    /// Build the submission payload.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::WrongStep`] unless the wizard is on the payment
    /// step, or the first validation error of any step.
    pub fn submission(&self) -> Result<ProjectSubmission, WizardError> {
        if self.step != WizardStep::Payment {
            return Err(WizardError::WrongStep {
                action: "submit".into(),
                step: self.step.to_string(),
            });
        }
        self.validate_services()?;
        self.validate_schedule()?;
        let payment_plan = self.payment_plan.ok_or(WizardError::MissingPaymentPlan)?;
        let (Some(start_date), Some(deadline)) = (self.start_date, self.deadline) else {
            return Err(WizardError::MissingDates);
        };
        let quote = self.quote()?;

        Ok(ProjectSubmission {
            title: self.title.trim().to_string(),
            description: self.description.clone(),
            service_keys: self.selected.clone(),
            bundle_id: self.bundle_id.clone(),
            custom_prices: self
                .custom_prices
                .iter()
                .filter(|(k, _)| self.selected.contains(*k))
                .map(|(k, v)| (k.clone(), *v))
                .collect(),
            start_date,
            deadline,
            milestones: self.milestones.clone(),
            reference_links: self.reference_links.clone(),
            payment_plan,
            total_amount: quote.total,
        })
    }

    fn validate_services(&self) -> Result<(), WizardError> {
        if self.selected.is_empty() {
            return Err(WizardError::NoServices);
        }
        self.quote().map(|_| ())
    }

    fn validate_schedule(&self) -> Result<(), WizardError> {
        validate_details(
            &self.title,
            self.start_date,
            self.deadline,
            &self.milestones,
            &self.reference_links,
        )
    }

    fn ensure_known(&self, key: &str) -> Result<(), WizardError> {
        if self.catalog.iter().any(|s| s.key == key) {
            Ok(())
        } else {
            Err(PricingError::UnknownService(key.to_string()).into())
        }
    }
}
