//! # fmg-backend
//!
//! Client for the hosted database-and-auth platform the hub runs on.
//!
//! - [`BackendClient`]: typed PostgREST CRUD composed with [`Query`], plus
//!   per-table repository methods (`repos`) and the submission fan-out.
//! - [`with_retry`], [`with_soft_timeout`], [`LatestRequest`]: the retry,
//!   timeout and supersede policies every list screen applies.
//! - [`RealtimeFeed`] / [`poll_inserts`] / [`LiveList`]: insert notifications
//!   merged into lists with id-based dedup.

pub mod client;
pub mod error;
pub mod http;
pub mod latest;
pub mod query;
pub mod realtime;
pub mod repos;
pub mod retry;
pub mod submission;
pub mod timeout;

pub use client::{BackendClient, TokenSource};
pub use error::{BackendError, FanOutStage, SubmissionError};
pub use latest::LatestRequest;
pub use query::Query;
pub use realtime::{LiveList, RealtimeConfig, RealtimeFeed, Subscription, poll_inserts};
pub use repos::{NewDraft, NewMeeting, ProjectFilter};
pub use retry::{RetryConfig, refetch_on_wake, with_retry};
pub use timeout::with_soft_timeout;
