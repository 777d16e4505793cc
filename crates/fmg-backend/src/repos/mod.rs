//! Table-level operations, one module per screen's data.
//!
//! Each module adds methods to [`BackendClient`](crate::BackendClient).

mod catalog;
mod drafts;
mod invoices;
mod meetings;
mod messages;
mod profiles;
mod projects;

pub use drafts::NewDraft;
pub use invoices::invoice_number;
pub use meetings::NewMeeting;
pub use projects::ProjectFilter;

/// Table names on the hosted backend.
pub mod tables {
    pub const PROFILES: &str = "profiles";
    pub const PROJECTS: &str = "projects";
    pub const MILESTONES: &str = "project_milestones";
    pub const PAYMENT_SCHEDULES: &str = "payment_schedules";
    pub const REFERENCE_LINKS: &str = "reference_links";
    pub const DRAFTS: &str = "drafts";
    pub const REVISIONS: &str = "revisions";
    pub const INVOICES: &str = "invoices";
    pub const MEETINGS: &str = "meetings";
    pub const MESSAGES: &str = "discussion_messages";
    pub const SERVICES: &str = "services";
    pub const BUNDLES: &str = "bundles";
}
