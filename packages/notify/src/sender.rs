//! Notification sender capability.

use std::future::Future;
use std::pin::Pin;

use crate::message::EmailMessage;

/// Delivery failure modes.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// Malformed header fields; retrying the same input cannot succeed.
    #[error("bad header: {0}")]
    BadHeader(String),

    /// Any transport-level delivery failure.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Future type for async delivery.
pub type SendFuture = Pin<Box<dyn Future<Output = Result<(), NotificationError>> + Send>>;

/// Black-box delivery capability for outbound mail.
pub trait NotificationSender: Send + Sync + 'static {
    /// Deliver one message.
    fn send(&self, message: &EmailMessage) -> SendFuture;
}

/// Sender that writes outbound mail to the log.
///
/// The development transport; real delivery plugs in behind
/// [`NotificationSender`] without touching the task body.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSender;

impl NotificationSender for ConsoleSender {
    fn send(&self, message: &EmailMessage) -> SendFuture {
        let message = message.clone();
        Box::pin(async move {
            message.check_headers()?;
            tracing::info!(to = %message.to, subject = %message.subject, "Sending email");
            tracing::info!("{}", message.body);
            Ok(())
        })
    }
}
