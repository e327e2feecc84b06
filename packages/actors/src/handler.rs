//! Task capability trait, registry, and progress reporting.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use mailer_core::JobId;
use ractor::ActorRef;

use crate::messages::QueueMessage;

/// Failure modes of a task body.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// Malformed input that retrying cannot fix. The job still counts as
    /// finished; the cause is only logged.
    #[error("invalid task input: {0}")]
    Invalid(String),

    /// Any other execution failure. The job is marked failed with this
    /// cause.
    #[error("{0}")]
    Failed(String),
}

/// Result type for task bodies.
pub type TaskResult = Result<(), TaskError>;

/// Future type for async task bodies.
pub type TaskFuture = Pin<Box<dyn Future<Output = TaskResult> + Send>>;

/// Progress-reporting callback handed to a task body.
///
/// Reports are fire-and-forget messages to the queue actor, which ignores
/// non-monotonic values and caps running progress at 99 (100 is written
/// only by the Finished transition).
#[derive(Clone)]
pub struct ProgressReporter {
    job_id: JobId,
    queue: ActorRef<QueueMessage>,
}

impl ProgressReporter {
    pub(crate) fn new(job_id: JobId, queue: ActorRef<QueueMessage>) -> Self {
        Self { job_id, queue }
    }

    /// Report an absolute percentage.
    pub fn percent(&self, percent: u8) {
        let _ = self.queue.send_message(QueueMessage::ReportProgress {
            job_id: self.job_id,
            percent,
        });
    }

    /// Report completion of `done` out of `total` steps as
    /// `floor(done * 100 / total)` percent.
    pub fn step(&self, done: u32, total: u32) {
        if total == 0 {
            return;
        }
        let percent = (u64::from(done.min(total)) * 100 / u64::from(total)) as u8;
        self.percent(percent);
    }
}

/// Trait for task bodies.
///
/// Implement this trait to define how jobs of a specific kind are executed.
/// The body receives the immutable payload and a progress callback, and
/// every outcome is reported back as job state by the worker loop.
pub trait TaskHandler: Send + Sync + 'static {
    /// The task kind this handler executes.
    fn task_type(&self) -> &str;

    /// Execute the task body.
    fn run(&self, payload: &serde_json::Value, progress: ProgressReporter) -> TaskFuture;
}

/// Registry mapping task kinds to their capabilities.
///
/// The worker loop looks handlers up here at dispatch time.
#[derive(Default)]
pub struct TaskRegistry {
    handlers: HashMap<String, Arc<dyn TaskHandler>>,
}

impl TaskRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for its task kind.
    pub fn register<H: TaskHandler>(&mut self, handler: H) {
        let task_type = handler.task_type().to_string();
        self.handlers.insert(task_type, Arc::new(handler));
    }

    /// Get the handler for a task kind.
    pub fn get(&self, task_type: &str) -> Option<Arc<dyn TaskHandler>> {
        self.handlers.get(task_type).cloned()
    }

    /// Check if a handler exists for a task kind.
    pub fn has_handler(&self, task_type: &str) -> bool {
        self.handlers.contains_key(task_type)
    }

    /// List all registered task kinds.
    pub fn task_types(&self) -> Vec<&str> {
        self.handlers.keys().map(|s| s.as_str()).collect()
    }
}

/// A simple function-based task handler.
pub struct FnTask<F>
where
    F: Fn(serde_json::Value, ProgressReporter) -> TaskFuture + Send + Sync + 'static,
{
    task_type: String,
    body: F,
}

impl<F> FnTask<F>
where
    F: Fn(serde_json::Value, ProgressReporter) -> TaskFuture + Send + Sync + 'static,
{
    /// Create a new function-based handler.
    pub fn new(task_type: impl Into<String>, body: F) -> Self {
        Self {
            task_type: task_type.into(),
            body,
        }
    }
}

impl<F> TaskHandler for FnTask<F>
where
    F: Fn(serde_json::Value, ProgressReporter) -> TaskFuture + Send + Sync + 'static,
{
    fn task_type(&self) -> &str {
        &self.task_type
    }

    fn run(&self, payload: &serde_json::Value, progress: ProgressReporter) -> TaskFuture {
        (self.body)(payload.clone(), progress)
    }
}
