//! Event types for observing job lifecycle transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::JobId;

/// Events emitted by the job queue as records move through their lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JobEvent {
    /// A new job was enqueued.
    JobEnqueued {
        job_id: JobId,
        job_type: String,
        timestamp: DateTime<Utc>,
    },
    /// A job was claimed by a worker and started executing.
    JobStarted {
        job_id: JobId,
        worker_id: String,
        timestamp: DateTime<Utc>,
    },
    /// A running job reported progress.
    JobProgress {
        job_id: JobId,
        progress: u8,
        timestamp: DateTime<Utc>,
    },
    /// A job ran to completion.
    JobFinished {
        job_id: JobId,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
    /// A job failed with an unrecoverable error.
    JobFailed {
        job_id: JobId,
        error: String,
        timestamp: DateTime<Utc>,
    },
    /// A terminal job passed its retention window and was dropped.
    JobExpired {
        job_id: JobId,
        timestamp: DateTime<Utc>,
    },
}

impl JobEvent {
    /// Get the timestamp of the event.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            JobEvent::JobEnqueued { timestamp, .. } => *timestamp,
            JobEvent::JobStarted { timestamp, .. } => *timestamp,
            JobEvent::JobProgress { timestamp, .. } => *timestamp,
            JobEvent::JobFinished { timestamp, .. } => *timestamp,
            JobEvent::JobFailed { timestamp, .. } => *timestamp,
            JobEvent::JobExpired { timestamp, .. } => *timestamp,
        }
    }

    /// Get the job ID the event refers to.
    pub fn job_id(&self) -> JobId {
        match self {
            JobEvent::JobEnqueued { job_id, .. } => *job_id,
            JobEvent::JobStarted { job_id, .. } => *job_id,
            JobEvent::JobProgress { job_id, .. } => *job_id,
            JobEvent::JobFinished { job_id, .. } => *job_id,
            JobEvent::JobFailed { job_id, .. } => *job_id,
            JobEvent::JobExpired { job_id, .. } => *job_id,
        }
    }

    /// Get a short description of this event for logging.
    pub fn description(&self) -> String {
        match self {
            JobEvent::JobEnqueued {
                job_id, job_type, ..
            } => format!("Job {} enqueued ({})", job_id, job_type),
            JobEvent::JobStarted {
                job_id, worker_id, ..
            } => format!("Job {} started by {}", job_id, worker_id),
            JobEvent::JobProgress {
                job_id, progress, ..
            } => format!("Job {} at {}%", job_id, progress),
            JobEvent::JobFinished {
                job_id,
                duration_ms,
                ..
            } => format!("Job {} finished in {}ms", job_id, duration_ms),
            JobEvent::JobFailed { job_id, error, .. } => {
                format!("Job {} failed: {}", job_id, error)
            }
            JobEvent::JobExpired { job_id, .. } => format!("Job {} expired", job_id),
        }
    }
}
