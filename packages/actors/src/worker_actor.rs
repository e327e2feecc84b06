//! Worker actor for executing claimed jobs.

use std::sync::Arc;
use std::time::Duration;

use ractor::{Actor, ActorProcessingErr, ActorRef};

use crate::handler::{ProgressReporter, TaskError, TaskRegistry};
use crate::messages::{QueueMessage, WorkerMessage};

/// How long a worker waits for the queue to answer a claim request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// State for the worker actor.
pub struct WorkerActorState {
    /// Unique worker ID.
    pub worker_id: String,
    /// Job currently being processed, if any.
    pub busy: bool,
    /// Queue actor reference.
    pub queue: ActorRef<QueueMessage>,
    /// Task capability registry.
    pub tasks: Arc<TaskRegistry>,
    /// Whether the worker should continue running.
    pub running: bool,
}

/// Worker actor arguments.
pub struct WorkerArgs {
    pub worker_id: String,
    pub queue: ActorRef<QueueMessage>,
    pub tasks: Arc<TaskRegistry>,
    pub poll_interval: Duration,
}

/// Worker actor that executes jobs.
///
/// Every task outcome, including a panic, is converted into job state and
/// reported to the queue; nothing propagates past the loop.
pub struct WorkerActor;

impl Actor for WorkerActor {
    type Msg = WorkerMessage;
    type State = WorkerActorState;
    type Arguments = WorkerArgs;

    async fn pre_start(
        &self,
        myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!("Starting worker: {}", args.worker_id);

        // Start the work loop
        let myself_clone = myself.clone();
        let poll_interval = args.poll_interval;
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(poll_interval).await;
                if myself_clone.send_message(WorkerMessage::Heartbeat).is_err() {
                    break;
                }
            }
        });

        Ok(WorkerActorState {
            worker_id: args.worker_id,
            busy: false,
            queue: args.queue,
            tasks: args.tasks,
            running: true,
        })
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            WorkerMessage::ProcessJob { job } => {
                let job = *job;
                state.busy = true;

                let outcome = match state.tasks.get(&job.job_type) {
                    Some(handler) => {
                        let reporter = ProgressReporter::new(job.id, state.queue.clone());
                        // Run the body on its own task so a panic is
                        // contained to this job instead of killing the
                        // worker.
                        match tokio::spawn(handler.run(&job.payload, reporter)).await {
                            Ok(result) => result,
                            Err(e) => Err(TaskError::Failed(format!("task panicked: {e}"))),
                        }
                    }
                    None => Err(TaskError::Failed(format!(
                        "no handler for task kind: {}",
                        job.job_type
                    ))),
                };

                match outcome {
                    Ok(()) => {
                        state.queue.send_message(QueueMessage::JobSucceeded {
                            job_id: job.id,
                            worker_id: state.worker_id.clone(),
                        })?;
                    }
                    Err(TaskError::Invalid(reason)) => {
                        // Bad input cannot be fixed by running again, so
                        // the job completes rather than failing.
                        tracing::warn!(
                            "Job {} rejected its input ({}); completing",
                            job.id,
                            reason
                        );
                        state.queue.send_message(QueueMessage::JobSucceeded {
                            job_id: job.id,
                            worker_id: state.worker_id.clone(),
                        })?;
                    }
                    Err(TaskError::Failed(error)) => {
                        tracing::error!("Job {} failed: {}", job.id, error);
                        state.queue.send_message(QueueMessage::JobFailed {
                            job_id: job.id,
                            worker_id: state.worker_id.clone(),
                            error,
                        })?;
                    }
                }

                state.busy = false;
            }

            WorkerMessage::Heartbeat => {
                if !state.running {
                    myself.stop(None);
                    return Ok(());
                }

                // If idle, request a job
                if !state.busy {
                    let result = ractor::rpc::call(
                        &state.queue,
                        |reply| QueueMessage::RequestJob {
                            worker_id: state.worker_id.clone(),
                            reply,
                        },
                        Some(REQUEST_TIMEOUT),
                    )
                    .await;
                    // ractor::rpc::call returns Result<CallResult<T>, MessagingErr<M>>
                    if let Ok(ractor::rpc::CallResult::Success(Some(job))) = result {
                        myself.send_message(WorkerMessage::ProcessJob { job: Box::new(job) })?;
                    }
                }
            }

            WorkerMessage::Shutdown => {
                tracing::info!("Shutting down worker: {}", state.worker_id);
                state.running = false;
                myself.stop(None);
            }
        }

        Ok(())
    }
}
