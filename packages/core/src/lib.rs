//! Core domain types for the mail-delivery job system.
//!
//! This crate contains shared types used across all packages:
//! - Job and JobStatus for background work items
//! - StatusSnapshot for the polling wire format
//! - Events for observing job lifecycle transitions

mod events;
mod job;
mod snapshot;

pub use events::JobEvent;
pub use job::{Job, JobId, JobStatus};
pub use snapshot::StatusSnapshot;
