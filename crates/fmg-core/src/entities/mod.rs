//! Row structs for every table the hub reads or writes.
//!
//! The hosted database owns the schema; these structs are the validated shape
//! of each row at the API boundary. All structs derive `Serialize`,
//! `Deserialize`, and `JsonSchema` for JSON roundtrip and schema validation.

mod catalog;
mod discussion;
mod draft;
mod invoice;
mod meeting;
mod profile;
mod project;

pub use catalog::{Bundle, CatalogService};
pub use discussion::DiscussionMessage;
pub use draft::{Draft, Revision};
pub use invoice::Invoice;
pub use meeting::Meeting;
pub use profile::Profile;
pub use project::{Milestone, PaymentScheduleRow, Project, ReferenceLink};
