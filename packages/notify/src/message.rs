//! Outbound email message type.

use serde::{Deserialize, Serialize};

use crate::sender::NotificationError;

/// An outbound email message; the payload shape of `send_email` jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl EmailMessage {
    pub fn new(
        to: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// Header fields must not smuggle line breaks into the wire format.
    pub fn check_headers(&self) -> Result<(), NotificationError> {
        for (name, value) in [("to", &self.to), ("subject", &self.subject)] {
            if value.contains(['\r', '\n']) {
                return Err(NotificationError::BadHeader(format!(
                    "{name} contains a line break"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_headers_pass() {
        let message = EmailMessage::new("a@x.com", "Hi", "Body");
        assert!(message.check_headers().is_ok());
    }

    #[test]
    fn line_breaks_in_headers_are_rejected() {
        let message = EmailMessage::new("a@x.com\nBcc: b@x.com", "Hi", "Body");
        match message.check_headers() {
            Err(NotificationError::BadHeader(reason)) => assert!(reason.contains("to")),
            other => panic!("unexpected result: {other:?}"),
        }

        let message = EmailMessage::new("a@x.com", "Hi\r\nX-Evil: 1", "Body");
        assert!(message.check_headers().is_err());
    }

    #[test]
    fn line_breaks_in_the_body_are_fine() {
        let message = EmailMessage::new("a@x.com", "Hi", "line one\nline two");
        assert!(message.check_headers().is_ok());
    }

    #[test]
    fn payload_round_trip() {
        let message = EmailMessage::new("a@x.com", "Hi", "Body");
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["to"], "a@x.com");
        let back: EmailMessage = serde_json::from_value(value).unwrap();
        assert_eq!(back, message);
    }
}
