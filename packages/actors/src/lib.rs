//! Actor system for the background mail-delivery jobs.
//!
//! This crate provides the ractor-based queue and worker actors plus the
//! task capability seam.
//!
//! # Architecture
//!
//! - `QueueActor` - owns the job records; its mailbox is the atomic claim
//!   point between producers and workers
//! - `WorkerActor` - long-running dequeue-execute loop
//! - `TaskRegistry` - maps a task kind to its executable capability
//! - `JobQueue` - the handle returned by [`start_queue`], passed explicitly
//!   to the submission and polling sides (no global registry)
//!
//! # Usage
//!
//! ```ignore
//! use actors::{QueueOptions, TaskRegistry, start_queue};
//!
//! let mut tasks = TaskRegistry::new();
//! tasks.register(my_task);
//!
//! let queue = start_queue(QueueOptions::default(), tasks).await?;
//! let job_id = queue.submit("send_email", payload).await?;
//! let snapshot = queue.status(&job_id.to_string()).await?;
//! ```

mod handler;
mod messages;
mod queue;
mod queue_actor;
mod worker_actor;

pub use handler::{
    FnTask, ProgressReporter, TaskError, TaskFuture, TaskHandler, TaskRegistry, TaskResult,
};
pub use messages::{FetchError, QueueMessage, SubmitError, WorkerMessage};
pub use queue::{JobQueue, QueueOptions, start_queue};
pub use queue_actor::QueueActor;
pub use worker_actor::WorkerActor;

/// Re-export ractor types for convenience.
pub use ractor::{Actor, ActorRef, RpcReplyPort, concurrency};
