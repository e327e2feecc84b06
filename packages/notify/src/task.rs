//! The `send_email` task body.

use std::sync::Arc;
use std::time::Duration;

use actors::{ProgressReporter, TaskError, TaskFuture, TaskHandler};

use crate::message::EmailMessage;
use crate::sender::{NotificationError, NotificationSender};

/// Task body that delivers one email through a [`NotificationSender`].
///
/// Delivery is paced over a configurable number of steps, each reporting
/// `floor(step/total*100)` percent, so pollers watch progress climb instead
/// of jumping from 0 to 100. Both the step count and the pacing delay are
/// injected; tests run with zero pacing.
pub struct SendEmailTask {
    sender: Arc<dyn NotificationSender>,
    steps: u32,
    pacing: Duration,
}

impl SendEmailTask {
    /// Task kind this handler is registered under.
    pub const TASK_TYPE: &'static str = "send_email";

    /// Create the task with default pacing (10 steps, 400ms apart).
    pub fn new(sender: Arc<dyn NotificationSender>) -> Self {
        Self {
            sender,
            steps: 10,
            pacing: Duration::from_millis(400),
        }
    }

    /// Set the number of delivery steps.
    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = steps.max(1);
        self
    }

    /// Set the delay between steps.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }
}

impl TaskHandler for SendEmailTask {
    fn task_type(&self) -> &str {
        Self::TASK_TYPE
    }

    fn run(&self, payload: &serde_json::Value, progress: ProgressReporter) -> TaskFuture {
        let sender = Arc::clone(&self.sender);
        let steps = self.steps;
        let pacing = self.pacing;
        let payload = payload.clone();

        Box::pin(async move {
            let message: EmailMessage = serde_json::from_value(payload)
                .map_err(|e| TaskError::Invalid(format!("malformed email payload: {e}")))?;

            tracing::info!(to = %message.to, subject = %message.subject, "About to send email");

            // The last slice of progress belongs to the Finished
            // transition, so steps report up to floor((steps-1)/steps).
            for step in 1..steps {
                if !pacing.is_zero() {
                    tokio::time::sleep(pacing).await;
                }
                progress.step(step, steps);
            }
            if !pacing.is_zero() {
                tokio::time::sleep(pacing).await;
            }

            match sender.send(&message).await {
                Ok(()) => Ok(()),
                Err(NotificationError::BadHeader(reason)) => Err(TaskError::Invalid(reason)),
                Err(NotificationError::Transport(reason)) => Err(TaskError::Failed(reason)),
            }
        })
    }
}
