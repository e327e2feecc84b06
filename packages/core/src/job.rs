//! Job domain types for background work items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique identifier for a job, using ULID for chronological sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub Ulid);

impl JobId {
    /// Create a new unique job ID.
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Parse a job ID from a string.
    pub fn parse(s: &str) -> Result<Self, ulid::DecodeError> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Current status of a job in its lifecycle.
///
/// Queued -> Running -> {Finished, Failed}. Terminal states absorb; there
/// is no retry or cancellation transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    /// Job is waiting to be claimed by a worker.
    #[default]
    Queued,
    /// Job is currently being executed by a worker.
    Running {
        started_at: DateTime<Utc>,
        worker_id: String,
    },
    /// Job ran to completion (including soft input failures).
    Finished {
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    },
    /// Job failed with an unrecoverable error.
    Failed {
        started_at: DateTime<Utc>,
        failed_at: DateTime<Utc>,
        error: String,
    },
}

impl JobStatus {
    /// Check if the job is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Finished { .. } | JobStatus::Failed { .. })
    }

    /// Get a simple status string for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running { .. } => "running",
            JobStatus::Finished { .. } => "finished",
            JobStatus::Failed { .. } => "failed",
        }
    }

    /// When execution started, if it has.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        match self {
            JobStatus::Queued => None,
            JobStatus::Running { started_at, .. }
            | JobStatus::Finished { started_at, .. }
            | JobStatus::Failed { started_at, .. } => Some(*started_at),
        }
    }
}

/// A job represents one unit of asynchronous background work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Unique identifier for this job; the sole lookup key for pollers.
    pub id: JobId,
    /// Task kind, used for routing to a registered handler.
    pub job_type: String,
    /// Task input as JSON; immutable once enqueued.
    pub payload: serde_json::Value,
    /// Current status.
    pub status: JobStatus,
    /// Percent complete in [0, 100]. 100 is written only by the Finished
    /// transition; workers report at most 99 while Running.
    #[serde(default)]
    pub progress: u8,
    /// When the job was created.
    pub created_at: DateTime<Utc>,
    /// When the job was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a new queued job.
    pub fn new(job_type: impl Into<String>, payload: serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            job_type: job_type.into(),
            payload,
            status: JobStatus::Queued,
            progress: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Transition to Running under the given worker.
    pub fn mark_running(&mut self, worker_id: impl Into<String>) {
        let now = Utc::now();
        self.status = JobStatus::Running {
            started_at: now,
            worker_id: worker_id.into(),
        };
        self.updated_at = now;
    }

    /// Transition to Finished. The only writer of progress = 100.
    pub fn mark_finished(&mut self) {
        let now = Utc::now();
        let started_at = self.status.started_at().unwrap_or(now);
        self.status = JobStatus::Finished {
            started_at,
            finished_at: now,
        };
        self.progress = 100;
        self.updated_at = now;
    }

    /// Transition to Failed, recording the cause. Progress keeps the last
    /// value reached while Running.
    pub fn mark_failed(&mut self, error: impl Into<String>) {
        let now = Utc::now();
        let started_at = self.status.started_at().unwrap_or(now);
        self.status = JobStatus::Failed {
            started_at,
            failed_at: now,
            error: error.into(),
        };
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_lifecycle_transitions() {
        let mut job = Job::new("send_email", serde_json::json!({"to": "a@x.com"}));
        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.progress, 0);

        job.mark_running("worker-1");
        assert_eq!(job.status.as_str(), "running");
        assert!(job.status.started_at().is_some());

        job.progress = 40;
        job.mark_finished();
        assert_eq!(job.status.as_str(), "finished");
        assert_eq!(job.progress, 100);
        assert!(job.status.is_terminal());
    }

    #[test]
    fn failed_job_keeps_partial_progress() {
        let mut job = Job::new("send_email", serde_json::Value::Null);
        job.mark_running("worker-1");
        job.progress = 60;
        job.mark_failed("connection refused");
        assert_eq!(job.status.as_str(), "failed");
        assert_eq!(job.progress, 60);
        match &job.status {
            JobStatus::Failed { error, .. } => assert_eq!(error, "connection refused"),
            other => panic!("unexpected status: {other:?}"),
        }
    }

    #[test]
    fn status_serializes_with_tag() {
        let status = JobStatus::Queued;
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["status"], "queued");

        let mut job = Job::new("send_email", serde_json::Value::Null);
        job.mark_running("worker-7");
        let json = serde_json::to_value(&job.status).unwrap();
        assert_eq!(json["status"], "running");
        assert_eq!(json["worker_id"], "worker-7");
    }

    #[test]
    fn job_id_round_trips_through_string() {
        let id = JobId::new();
        let parsed = JobId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
        assert!(JobId::parse("not-a-ulid").is_err());
    }
}
