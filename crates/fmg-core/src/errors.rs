//! Pricing and order-wizard errors.
//!
//! I/O errors live in their own crates (`BackendError`, `AuthError`) and
//! converge into `ApiError` in `fmg-server`.

use thiserror::Error;

/// Errors from the order pricing reduction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    /// A selected key is not present in the catalog.
    #[error("unknown service: {0}")]
    UnknownService(String),

    /// The bundle references a key that is not present in the catalog.
    #[error("bundle {bundle} references unknown service {key}")]
    UnknownBundleService { bundle: String, key: String },
}

/// Validation failures raised by the order wizard.
///
/// A wizard that returns one of these has not changed state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("select at least one service")]
    NoServices,

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("unknown bundle: {0}")]
    UnknownBundle(String),

    #[error("project title is required")]
    MissingTitle,

    #[error("start date and deadline are required")]
    MissingDates,

    #[error("deadline {deadline} is before start date {start}")]
    DeadlineBeforeStart { start: String, deadline: String },

    #[error("milestone '{title}' is due outside the project window")]
    MilestoneOutOfRange { title: String },

    #[error("milestone title is required")]
    MissingMilestoneTitle,

    #[error("invalid reference link: {0}")]
    InvalidLink(String),

    #[error("installment plans need between 2 and 12 months, got {0}")]
    InvalidInstallments(u8),

    #[error("a payment plan must be chosen")]
    MissingPaymentPlan,

    #[error("submitted total {submitted} does not match the computed total {computed}")]
    TotalMismatch { submitted: u64, computed: u64 },

    #[error("cannot {action} from the {step} step")]
    WrongStep { action: String, step: String },
}
