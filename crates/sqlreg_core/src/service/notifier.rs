//! Promotion notification delivery.
//!
//! Delivery is a side effect outside any transaction: a notification that was
//! sent stays sent even if the surrounding batch later rolls back.

use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Delivery failure reported by a [`Notifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyError {
    pub recipient: String,
    pub message: String,
}

impl Display for NotifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "notification to `{}` failed: {}",
            self.recipient, self.message
        )
    }
}

impl Error for NotifyError {}

/// Fire-and-forget notification sink.
pub trait Notifier {
    fn send(&self, recipient: &str, content: &str) -> Result<(), NotifyError>;
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn send(&self, recipient: &str, content: &str) -> Result<(), NotifyError> {
        (**self).send(recipient, content)
    }
}

/// Notifier that only records the delivery in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, recipient: &str, content: &str) -> Result<(), NotifyError> {
        info!(
            "event=notify module=upgrade status=ok recipient={recipient} content_chars={}",
            content.chars().count()
        );
        Ok(())
    }
}
