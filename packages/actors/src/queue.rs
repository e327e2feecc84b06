//! Queue startup and the handle handed to producers and pollers.
//!
//! `start_queue` spawns the queue actor and its workers and returns a
//! [`JobQueue`] handle. The handle is an explicit dependency: the
//! submission path and the status endpoint both receive it from their
//! constructors instead of reaching for process-global state.

use std::sync::Arc;
use std::time::Duration;

use mailer_core::{Job, JobEvent, JobId, StatusSnapshot};
use ractor::rpc::CallResult;
use ractor::{Actor, ActorRef, SpawnErr};
use tokio::sync::broadcast;

use crate::handler::TaskRegistry;
use crate::messages::{FetchError, QueueMessage, SubmitError, WorkerMessage};
use crate::queue_actor::{QueueActor, QueueActorState};
use crate::worker_actor::{WorkerActor, WorkerArgs};

/// How long handle calls wait for the queue actor to answer.
const CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// Tuning knobs for a queue and its workers.
#[derive(Debug, Clone)]
pub struct QueueOptions {
    /// Number of concurrent worker actors.
    pub workers: usize,
    /// How often an idle worker asks for work.
    pub poll_interval: Duration,
    /// Interval between retention sweeps.
    pub tick_interval: Duration,
    /// How long terminal records stay queryable.
    pub retention: Duration,
}

impl Default for QueueOptions {
    fn default() -> Self {
        Self {
            workers: 2,
            poll_interval: Duration::from_millis(100),
            tick_interval: Duration::from_secs(30),
            retention: Duration::from_secs(3600),
        }
    }
}

impl QueueOptions {
    /// Set the number of workers.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the idle-worker poll interval.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Set the retention-sweep interval.
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    /// Set the retention window for terminal records.
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }
}

/// Handle to a running queue.
///
/// Cloneable; pass one clone to everything that submits or polls.
#[derive(Clone)]
pub struct JobQueue {
    queue: ActorRef<QueueMessage>,
    workers: Vec<ActorRef<WorkerMessage>>,
    event_tx: broadcast::Sender<JobEvent>,
}

impl JobQueue {
    /// Enqueue a new job and return its id.
    ///
    /// Returns as soon as the record is durable and claimable; execution
    /// happens later on a worker. A store failure surfaces here and no
    /// record is created.
    pub async fn submit(
        &self,
        job_type: impl Into<String>,
        payload: serde_json::Value,
    ) -> Result<JobId, SubmitError> {
        let job = Job::new(job_type, payload);
        let result = ractor::rpc::call(
            &self.queue,
            |reply| QueueMessage::Enqueue {
                job: Box::new(job),
                reply,
            },
            Some(CALL_TIMEOUT),
        )
        .await;

        match result {
            Ok(CallResult::Success(outcome)) => outcome,
            _ => Err(SubmitError::Queue),
        }
    }

    /// Read a snapshot of a job record. Unknown ids are `Ok(None)`.
    pub async fn fetch(&self, job_id: JobId) -> Result<Option<Job>, FetchError> {
        let result = ractor::rpc::call(
            &self.queue,
            |reply| QueueMessage::Fetch { job_id, reply },
            Some(CALL_TIMEOUT),
        )
        .await;

        match result {
            Ok(CallResult::Success(outcome)) => outcome,
            _ => Err(FetchError::Queue),
        }
    }

    /// Resolve an opaque id token into a poller snapshot.
    ///
    /// Tokens that do not parse, were never enqueued, or have expired all
    /// yield the normal "invalid" snapshot; only a store failure is an
    /// error.
    pub async fn status(&self, token: &str) -> Result<StatusSnapshot, FetchError> {
        let Ok(job_id) = JobId::parse(token) else {
            return Ok(StatusSnapshot::invalid());
        };

        Ok(match self.fetch(job_id).await? {
            Some(job) => StatusSnapshot::of(&job),
            None => StatusSnapshot::invalid(),
        })
    }

    /// Subscribe to job lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.event_tx.subscribe()
    }

    /// Shut down the workers and the queue actor.
    pub fn shutdown(&self) {
        for worker in &self.workers {
            let _ = worker.send_message(WorkerMessage::Shutdown);
        }
        let _ = self.queue.send_message(QueueMessage::Shutdown);
    }
}

/// Spawn the queue actor and its workers.
pub async fn start_queue(options: QueueOptions, tasks: TaskRegistry) -> Result<JobQueue, SpawnErr> {
    let (event_tx, _) = broadcast::channel(1024);

    let state = QueueActorState::new(event_tx.clone(), options.retention, options.tick_interval);
    let (queue, _handle) = Actor::spawn(None, QueueActor, state).await?;

    let tasks = Arc::new(tasks);
    let mut workers = Vec::with_capacity(options.workers);
    for n in 1..=options.workers {
        let args = WorkerArgs {
            worker_id: format!("worker-{n}"),
            queue: queue.clone(),
            tasks: Arc::clone(&tasks),
            poll_interval: options.poll_interval,
        };
        let (worker, _handle) = Actor::spawn(None, WorkerActor, args).await?;
        workers.push(worker);
    }

    Ok(JobQueue {
        queue,
        workers,
        event_tx,
    })
}
