//! Queue actor owning the job records.
//!
//! The actor's mailbox serializes every mutation, so a status, progress and
//! failure cause always commit as one field group and snapshot reads never
//! observe a half-written record. Claiming happens inside a single message,
//! which is what makes delivery at-most-once across concurrent workers.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use chrono::Utc;
use db::repositories::JobRepository;
use mailer_core::{Job, JobEvent, JobId, JobStatus};
use ractor::{Actor, ActorProcessingErr, ActorRef};
use tokio::sync::broadcast;

use crate::messages::{FetchError, QueueMessage, SubmitError};

/// State for the queue actor.
pub struct QueueActorState {
    /// All resident job records by ID.
    jobs: HashMap<JobId, Job>,
    /// Queued job IDs in arrival order.
    pending: VecDeque<JobId>,
    /// Event broadcaster.
    event_tx: broadcast::Sender<JobEvent>,
    /// How long terminal records stay queryable.
    retention: chrono::Duration,
    /// Interval between retention sweeps.
    tick_interval: Duration,
}

impl QueueActorState {
    /// Create a new queue actor state.
    pub fn new(
        event_tx: broadcast::Sender<JobEvent>,
        retention: Duration,
        tick_interval: Duration,
    ) -> Self {
        Self {
            jobs: HashMap::new(),
            pending: VecDeque::new(),
            event_tx,
            retention: chrono::Duration::from_std(retention)
                .unwrap_or_else(|_| chrono::Duration::hours(1)),
            tick_interval,
        }
    }

    /// Broadcast an event.
    fn broadcast(&self, event: JobEvent) {
        let _ = self.event_tx.send(event);
    }
}

/// Queue actor that manages the job hand-off between producers and workers.
pub struct QueueActor;

impl Actor for QueueActor {
    type Msg = QueueMessage;
    type State = QueueActorState;
    type Arguments = QueueActorState;

    async fn pre_start(
        &self,
        myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!("Starting job queue actor");

        // Start the periodic retention sweep
        let myself_clone = myself.clone();
        let tick_interval = args.tick_interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_interval);
            interval.tick().await;
            loop {
                interval.tick().await;
                if myself_clone.send_message(QueueMessage::Tick).is_err() {
                    break;
                }
            }
        });

        Ok(args)
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            QueueMessage::Enqueue { job, reply } => {
                let job = *job;

                // Persist before the record becomes visible; an enqueue
                // that cannot reach the store fails loudly and leaves
                // nothing behind.
                if let Err(e) = JobRepository::create(&job).await {
                    tracing::error!("Failed to persist job {}: {}", job.id, e);
                    let _ = reply.send(Err(SubmitError::Store(e.to_string())));
                    return Ok(());
                }

                let job_id = job.id;
                let job_type = job.job_type.clone();
                state.jobs.insert(job_id, job);
                state.pending.push_back(job_id);

                state.broadcast(JobEvent::JobEnqueued {
                    job_id,
                    job_type,
                    timestamp: Utc::now(),
                });

                let _ = reply.send(Ok(job_id));
            }

            QueueMessage::RequestJob { worker_id, reply } => {
                let Some(job_id) = state.pending.pop_front() else {
                    let _ = reply.send(None);
                    return Ok(());
                };

                let Some(job) = state.jobs.get_mut(&job_id) else {
                    let _ = reply.send(None);
                    return Ok(());
                };

                let previous = job.status.clone();
                job.mark_running(&worker_id);

                if let Err(e) =
                    JobRepository::update_status(job_id, &job.status, job.progress).await
                {
                    tracing::warn!("Failed to mark job {} running: {}", job_id, e);
                    job.status = previous;
                    job.updated_at = Utc::now();
                    state.pending.push_front(job_id);
                    let _ = reply.send(None);
                    return Ok(());
                }

                let claimed = job.clone();
                state.broadcast(JobEvent::JobStarted {
                    job_id,
                    worker_id,
                    timestamp: Utc::now(),
                });

                let _ = reply.send(Some(claimed));
            }

            QueueMessage::ReportProgress { job_id, percent } => {
                let Some(job) = state.jobs.get_mut(&job_id) else {
                    return Ok(());
                };
                if !matches!(job.status, JobStatus::Running { .. }) {
                    return Ok(());
                }

                // 100 is reserved for the Finished transition; stale or
                // backwards reports are dropped so pollers only ever see
                // progress move forward.
                let percent = percent.min(99);
                if percent <= job.progress {
                    return Ok(());
                }

                job.progress = percent;
                job.updated_at = Utc::now();

                if let Err(e) = JobRepository::set_progress(job_id, percent).await {
                    tracing::warn!("Failed to persist progress for job {}: {}", job_id, e);
                }

                state.broadcast(JobEvent::JobProgress {
                    job_id,
                    progress: percent,
                    timestamp: Utc::now(),
                });
            }

            QueueMessage::JobSucceeded { job_id, worker_id } => {
                let Some(job) = state.jobs.get_mut(&job_id) else {
                    return Ok(());
                };
                if job.status.is_terminal() {
                    return Ok(());
                }

                let started_at = job.status.started_at();
                job.mark_finished();

                if let Err(e) =
                    JobRepository::update_status(job_id, &job.status, job.progress).await
                {
                    tracing::warn!("Failed to persist status for job {}: {}", job_id, e);
                }

                let finished_at = job.updated_at;
                let duration_ms = started_at
                    .map(|t| (finished_at - t).num_milliseconds().max(0) as u64)
                    .unwrap_or(0);

                tracing::debug!("Job {} finished by {}", job_id, worker_id);
                state.broadcast(JobEvent::JobFinished {
                    job_id,
                    duration_ms,
                    timestamp: finished_at,
                });
            }

            QueueMessage::JobFailed {
                job_id,
                worker_id,
                error,
            } => {
                let Some(job) = state.jobs.get_mut(&job_id) else {
                    return Ok(());
                };
                if job.status.is_terminal() {
                    return Ok(());
                }

                job.mark_failed(&error);

                if let Err(e) =
                    JobRepository::update_status(job_id, &job.status, job.progress).await
                {
                    tracing::warn!("Failed to persist status for job {}: {}", job_id, e);
                }

                tracing::debug!("Job {} failed on {}: {}", job_id, worker_id, error);
                state.broadcast(JobEvent::JobFailed {
                    job_id,
                    error,
                    timestamp: Utc::now(),
                });
            }

            QueueMessage::Fetch { job_id, reply } => {
                if let Some(job) = state.jobs.get(&job_id) {
                    let _ = reply.send(Ok(Some(job.clone())));
                } else {
                    // Not resident (unknown id, or enqueued before a
                    // restart): consult the store. A store failure stays
                    // distinguishable from a missing record.
                    let result = JobRepository::get(job_id)
                        .await
                        .map_err(|e| FetchError::Store(e.to_string()));
                    let _ = reply.send(result);
                }
            }

            QueueMessage::Tick => {
                let cutoff = Utc::now() - state.retention;
                let expired: Vec<JobId> = state
                    .jobs
                    .values()
                    .filter(|job| job.status.is_terminal() && job.updated_at < cutoff)
                    .map(|job| job.id)
                    .collect();

                for job_id in expired {
                    state.jobs.remove(&job_id);
                    state.broadcast(JobEvent::JobExpired {
                        job_id,
                        timestamp: Utc::now(),
                    });
                }

                if let Err(e) = JobRepository::purge_older_than(cutoff).await {
                    tracing::warn!("Failed to purge expired jobs: {}", e);
                }
            }

            QueueMessage::Shutdown => {
                tracing::info!("Shutting down job queue actor");
                myself.stop(None);
            }
        }

        Ok(())
    }
}
