//! API routes for submission and status polling.
//!
//! - POST /contact — enqueue a mail-delivery job
//! - GET /status/{job_id} — poll a job's status snapshot

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};

use actors::{FetchError, JobQueue, SubmitError};
use mailer_core::StatusSnapshot;
use notify::SendEmailTask;

/// Shared state injected into every route.
#[derive(Clone)]
pub struct AppState {
    /// Handle to the running queue; the explicit dependency both routes
    /// talk through.
    pub queue: JobQueue,
}

/// Body of a contact submission. Field-level validation happened upstream.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub to: String,
    pub subject: String,
    pub message: String,
}

/// Response to a contact submission: the token to poll with.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub job_id: String,
}

/// Route-level failures. All of them are transient from the client's point
/// of view; an unknown job id is not an error (it polls as "invalid").
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::warn!("Request failed: {self}");
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (StatusCode::SERVICE_UNAVAILABLE, body).into_response()
    }
}

/// POST /contact — build the task payload and enqueue it.
async fn submit_contact(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let payload = serde_json::json!({
        "to": request.to,
        "subject": request.subject,
        "body": request.message,
    });

    let job_id = state.queue.submit(SendEmailTask::TASK_TYPE, payload).await?;
    tracing::debug!("Enqueued contact submission as job {}", job_id);

    Ok(Json(SubmitResponse {
        job_id: job_id.to_string(),
    }))
}

/// GET /status/{job_id} — snapshot for polling clients.
async fn job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<StatusSnapshot>, ApiError> {
    let snapshot = state.queue.status(&job_id).await?;
    Ok(Json(snapshot))
}

/// Build the router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/contact", post(submit_contact))
        .route("/status/{job_id}", get(job_status))
        .with_state(state)
}
