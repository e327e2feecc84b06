//! Message types for actor communication.

use mailer_core::{Job, JobId};
use ractor::RpcReplyPort;

/// Messages for the QueueActor.
#[derive(Debug)]
pub enum QueueMessage {
    /// Enqueue a new job. The record is persisted before it becomes
    /// claimable; a store failure is reported to the submitter and leaves
    /// no record behind.
    Enqueue {
        job: Box<Job>,
        reply: RpcReplyPort<Result<JobId, SubmitError>>,
    },

    /// Claim the next queued job for a worker. The claimed job is marked
    /// Running atomically with delivery; each job is handed to at most one
    /// worker.
    RequestJob {
        worker_id: String,
        reply: RpcReplyPort<Option<Job>>,
    },

    /// Report progress for a running job. Non-monotonic updates are
    /// ignored; values are capped at 99 because 100 is reserved for the
    /// Finished transition.
    ReportProgress { job_id: JobId, percent: u8 },

    /// Report that a job ran to completion.
    JobSucceeded { job_id: JobId, worker_id: String },

    /// Report that a job failed with an unrecoverable error.
    JobFailed {
        job_id: JobId,
        worker_id: String,
        error: String,
    },

    /// Read a snapshot of a job record.
    Fetch {
        job_id: JobId,
        reply: RpcReplyPort<Result<Option<Job>, FetchError>>,
    },

    /// Periodic retention sweep.
    Tick,

    /// Shutdown the queue gracefully.
    Shutdown,
}

/// Messages for the WorkerActor.
#[derive(Debug)]
pub enum WorkerMessage {
    /// Start working on a claimed job.
    ProcessJob { job: Box<Job> },

    /// Heartbeat tick; an idle worker asks the queue for work.
    Heartbeat,

    /// Shutdown the worker.
    Shutdown,
}

/// Errors surfaced to a submitter.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("job store unavailable: {0}")]
    Store(String),

    #[error("queue is not running")]
    Queue,
}

/// Errors surfaced to a poller. Both variants are transient; an unknown id
/// is not an error and comes back as `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("job store unavailable: {0}")]
    Store(String),

    #[error("queue is not running")]
    Queue,
}
