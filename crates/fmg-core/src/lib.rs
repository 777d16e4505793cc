//! # fmg-core
//!
//! Core types shared across all FMG Industry Hub crates:
//! - Validated row structs for every table the hub reads or writes
//! - Status enums with state machine transitions
//! - Order pricing (bundles, custom price floors) and the three-step order wizard
//! - Payment schedule generation for the supported payment plans
//! - Submission payload and HTTP response types
//! - Dedup-by-identifier merging for realtime inserts
//! - Pricing and wizard error types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod identity;
pub mod merge;
pub mod pricing;
pub mod responses;
pub mod schedule;
pub mod submission;
pub mod wizard;
