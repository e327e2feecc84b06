//! The outbound notification capability.
//!
//! Delivery itself is a black box behind [`NotificationSender`]; this crate
//! ships the message type, a console transport for development, and the
//! `send_email` task body that bridges queued jobs to the sender.

mod message;
mod sender;
mod task;

pub use message::EmailMessage;
pub use sender::{ConsoleSender, NotificationError, NotificationSender, SendFuture};
pub use task::SendEmailTask;
