//! Wire format for status polling.

use serde::{Deserialize, Serialize};

use crate::{Job, JobStatus};

/// The snapshot a poller receives for a job id.
///
/// `status` is one of "queued", "running", "finished", "failed" or
/// "invalid" (unknown or expired id). `progress` is the percent as a
/// decimal string, or empty while it is not yet meaningful (queued,
/// invalid).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub status: String,
    pub progress: String,
}

impl StatusSnapshot {
    /// Snapshot for an id that was never enqueued or has expired.
    pub fn invalid() -> Self {
        Self {
            status: "invalid".to_string(),
            progress: String::new(),
        }
    }

    /// Snapshot of a known job record.
    pub fn of(job: &Job) -> Self {
        let progress = match &job.status {
            JobStatus::Queued => String::new(),
            JobStatus::Finished { .. } => "100".to_string(),
            JobStatus::Running { .. } | JobStatus::Failed { .. } => job.progress.to_string(),
        };
        Self {
            status: job.status.as_str().to_string(),
            progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Job;

    #[test]
    fn queued_job_has_empty_progress() {
        let job = Job::new("send_email", serde_json::Value::Null);
        let snap = StatusSnapshot::of(&job);
        assert_eq!(snap.status, "queued");
        assert_eq!(snap.progress, "");
    }

    #[test]
    fn running_job_reports_percent() {
        let mut job = Job::new("send_email", serde_json::Value::Null);
        job.mark_running("worker-1");
        let snap = StatusSnapshot::of(&job);
        assert_eq!(snap.status, "running");
        assert_eq!(snap.progress, "0");

        job.progress = 30;
        assert_eq!(StatusSnapshot::of(&job).progress, "30");
    }

    #[test]
    fn finished_job_always_reads_100() {
        let mut job = Job::new("send_email", serde_json::Value::Null);
        job.mark_running("worker-1");
        job.mark_finished();
        let snap = StatusSnapshot::of(&job);
        assert_eq!(snap.status, "finished");
        assert_eq!(snap.progress, "100");
    }

    #[test]
    fn invalid_snapshot_shape() {
        let snap = StatusSnapshot::invalid();
        let json = serde_json::to_string(&snap).unwrap();
        assert_eq!(json, r#"{"status":"invalid","progress":""}"#);
    }
}
