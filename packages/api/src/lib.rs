//! HTTP surface for the mail-delivery job system.
//!
//! Two routes: `POST /contact` enqueues a delivery job and returns its id,
//! `GET /status/{job_id}` returns the polling snapshot. Everything else -
//! form rendering, contact-record persistence, authentication - lives with
//! the surrounding application.

mod routes;

pub use routes::{ApiError, AppState, SubmitRequest, SubmitResponse, router};
