//! Roles, status enums and payment plans for the hub.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`,
//! matching the text columns in the hosted database. Status enums with state
//! machines provide `allowed_next_states()` to enforce valid transitions before
//! a row update is issued.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Role column of a profile row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Client,
    Staff,
    Admin,
    Owner,
}

impl Role {
    /// Staff-side roles see every project and may schedule meetings.
    #[must_use]
    pub const fn is_staff_side(self) -> bool {
        matches!(self, Self::Staff | Self::Admin | Self::Owner)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Staff => "staff",
            Self::Admin => "admin",
            Self::Owner => "owner",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ProjectStage
// ---------------------------------------------------------------------------

/// Stage of a production project.
///
/// ```text
/// submitted → in_review → in_production → delivered → completed
///                       → cancelled     → revision  → in_production
///                                       → on_hold   → in_production
///                                       → cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStage {
    Submitted,
    InReview,
    InProduction,
    Revision,
    OnHold,
    Delivered,
    Completed,
    Cancelled,
}

impl ProjectStage {
    #[must_use]
    #[allow(clippy::match_same_arms)]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Submitted => &[Self::InReview, Self::Cancelled],
            Self::InReview => &[Self::InProduction, Self::Cancelled],
            Self::InProduction => &[
                Self::Revision,
                Self::Delivered,
                Self::OnHold,
                Self::Cancelled,
            ],
            Self::Revision => &[Self::InProduction, Self::Cancelled],
            Self::OnHold => &[Self::InProduction, Self::Cancelled],
            Self::Delivered => &[Self::Completed],
            Self::Completed | Self::Cancelled => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::InReview => "in_review",
            Self::InProduction => "in_production",
            Self::Revision => "revision",
            Self::OnHold => "on_hold",
            Self::Delivered => "delivered",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ProjectStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ProjectTab
// ---------------------------------------------------------------------------

/// Tab filter on the project list screens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProjectTab {
    #[default]
    Active,
    Completed,
    Cancelled,
    All,
}

impl ProjectTab {
    /// Stages shown under this tab. Empty means no stage filter.
    #[must_use]
    pub const fn stages(self) -> &'static [ProjectStage] {
        match self {
            Self::Active => &[
                ProjectStage::Submitted,
                ProjectStage::InReview,
                ProjectStage::InProduction,
                ProjectStage::Revision,
                ProjectStage::OnHold,
                ProjectStage::Delivered,
            ],
            Self::Completed => &[ProjectStage::Completed],
            Self::Cancelled => &[ProjectStage::Cancelled],
            Self::All => &[],
        }
    }
}

// ---------------------------------------------------------------------------
// DraftStatus
// ---------------------------------------------------------------------------

/// Review status of an uploaded draft.
///
/// ```text
/// pending_review → approved
///                → revision_requested
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    PendingReview,
    Approved,
    RevisionRequested,
}

impl DraftStatus {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::PendingReview => &[Self::Approved, Self::RevisionRequested],
            Self::Approved | Self::RevisionRequested => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PendingReview => "pending_review",
            Self::Approved => "approved",
            Self::RevisionRequested => "revision_requested",
        }
    }
}

impl fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// InvoiceStatus
// ---------------------------------------------------------------------------

/// Status of an invoice.
///
/// ```text
/// draft → sent → paid
///              → overdue → paid | void
///              → void
/// draft → void
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
    Void,
}

impl InvoiceStatus {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Draft => &[Self::Sent, Self::Void],
            Self::Sent => &[Self::Paid, Self::Overdue, Self::Void],
            Self::Overdue => &[Self::Paid, Self::Void],
            Self::Paid | Self::Void => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Void => "void",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PaymentStatus
// ---------------------------------------------------------------------------

/// Status of one payment schedule row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Overdue,
}

impl PaymentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PaymentPlan
// ---------------------------------------------------------------------------

/// How a client pays for a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaymentPlan {
    /// Everything up front.
    Full,
    /// Half as a deposit, the balance on delivery.
    Split,
    /// Equal monthly installments.
    Installments { months: u8 },
}

impl PaymentPlan {
    pub const MIN_INSTALLMENTS: u8 = 2;
    pub const MAX_INSTALLMENTS: u8 = 12;

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Split => "split",
            Self::Installments { .. } => "installments",
        }
    }
}

impl fmt::Display for PaymentPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Installments { months } => write!(f, "installments ({months} months)"),
            other => f.write_str(other.as_str()),
        }
    }
}

// ---------------------------------------------------------------------------
// MeetingProvider
// ---------------------------------------------------------------------------

/// Third-party service that hosts a meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MeetingProvider {
    GoogleMeet,
    Zoom,
}

impl MeetingProvider {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GoogleMeet => "google_meet",
            Self::Zoom => "zoom",
        }
    }
}

impl fmt::Display for MeetingProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_serde_roundtrip {
        ($name:ident, $ty:ty, $variant:expr, $expected_str:expr) => {
            #[test]
            fn $name() {
                let val = $variant;
                let json = serde_json::to_string(&val).unwrap();
                assert_eq!(json, format!("\"{}\"", $expected_str));
                let recovered: $ty = serde_json::from_str(&json).unwrap();
                assert_eq!(recovered, val);
            }
        };
    }

    test_serde_roundtrip!(role_owner, Role, Role::Owner, "owner");
    test_serde_roundtrip!(stage_in_review, ProjectStage, ProjectStage::InReview, "in_review");
    test_serde_roundtrip!(stage_on_hold, ProjectStage, ProjectStage::OnHold, "on_hold");
    test_serde_roundtrip!(
        draft_revision_requested,
        DraftStatus,
        DraftStatus::RevisionRequested,
        "revision_requested"
    );
    test_serde_roundtrip!(invoice_overdue, InvoiceStatus, InvoiceStatus::Overdue, "overdue");
    test_serde_roundtrip!(
        provider_google,
        MeetingProvider,
        MeetingProvider::GoogleMeet,
        "google_meet"
    );

    #[test]
    fn as_str_matches_serde_for_stages() {
        for stage in [
            ProjectStage::Submitted,
            ProjectStage::InReview,
            ProjectStage::InProduction,
            ProjectStage::Revision,
            ProjectStage::OnHold,
            ProjectStage::Delivered,
            ProjectStage::Completed,
            ProjectStage::Cancelled,
        ] {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{}\"", stage.as_str()));
        }
    }

    #[test]
    fn payment_plan_is_tagged() {
        let json = serde_json::to_value(PaymentPlan::Installments { months: 3 }).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "installments", "months": 3}));
        let full: PaymentPlan = serde_json::from_str(r#"{"kind":"full"}"#).unwrap();
        assert_eq!(full, PaymentPlan::Full);
    }

    #[test]
    fn staff_side_roles() {
        assert!(!Role::Client.is_staff_side());
        assert!(Role::Staff.is_staff_side());
        assert!(Role::Admin.is_staff_side());
        assert!(Role::Owner.is_staff_side());
    }

    #[test]
    fn stage_valid_transitions() {
        assert!(ProjectStage::Submitted.can_transition_to(ProjectStage::InReview));
        assert!(ProjectStage::InReview.can_transition_to(ProjectStage::InProduction));
        assert!(ProjectStage::InProduction.can_transition_to(ProjectStage::Revision));
        assert!(ProjectStage::Revision.can_transition_to(ProjectStage::InProduction));
        assert!(ProjectStage::OnHold.can_transition_to(ProjectStage::InProduction));
        assert!(ProjectStage::Delivered.can_transition_to(ProjectStage::Completed));
    }

    #[test]
    fn stage_invalid_transitions() {
        assert!(!ProjectStage::Submitted.can_transition_to(ProjectStage::Delivered));
        assert!(!ProjectStage::Delivered.can_transition_to(ProjectStage::Cancelled));
        assert!(!ProjectStage::Completed.can_transition_to(ProjectStage::InProduction));
    }

    #[test]
    fn stage_terminal_states() {
        assert!(ProjectStage::Completed.allowed_next_states().is_empty());
        assert!(ProjectStage::Cancelled.allowed_next_states().is_empty());
        assert!(ProjectStage::Cancelled.is_terminal());
        assert!(!ProjectStage::OnHold.is_terminal());
    }

    #[test]
    fn active_tab_excludes_terminal_stages() {
        assert!(ProjectTab::Active.stages().iter().all(|s| !s.is_terminal()));
        assert!(ProjectTab::All.stages().is_empty());
    }

    #[test]
    fn draft_review_is_one_shot() {
        assert!(DraftStatus::PendingReview.can_transition_to(DraftStatus::Approved));
        assert!(!DraftStatus::Approved.can_transition_to(DraftStatus::RevisionRequested));
    }

    #[test]
    fn invoice_transitions() {
        assert!(InvoiceStatus::Draft.can_transition_to(InvoiceStatus::Sent));
        assert!(InvoiceStatus::Overdue.can_transition_to(InvoiceStatus::Paid));
        assert!(!InvoiceStatus::Paid.can_transition_to(InvoiceStatus::Void));
        assert!(!InvoiceStatus::Draft.can_transition_to(InvoiceStatus::Paid));
    }
}
