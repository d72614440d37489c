//! Email notifications sent after a primary mutation has committed.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::NotifyError;

pub mod http;
pub mod templates;

pub use http::HttpNotifier;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Email {
    pub to: String,
    pub subject: String,
    /// Rendered HTML.
    pub body: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_email(&self, email: Email) -> Result<(), NotifyError>;
}

/// Logs the email instead of sending it. Used when notifications are disabled
/// or the crate runs against the in-memory store.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_email(&self, email: Email) -> Result<(), NotifyError> {
        info!(to = %email.to, subject = %email.subject, "Email suppressed");
        Ok(())
    }
}

/// What happened to the secondary notification of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// No address on record, so nothing was attempted.
    NotRequested,
    Sent,
    Failed(String),
}

impl Delivery {
    pub fn was_attempted(&self) -> bool {
        !matches!(self, Delivery::NotRequested)
    }
}

/// Sends at most one email and reports the result. Never fails: a notification
/// error is logged and returned as `Delivery::Failed`.
pub async fn deliver(notifier: &dyn Notifier, email: Option<Email>) -> Delivery {
    let Some(email) = email else {
        return Delivery::NotRequested;
    };

    let to = email.to.clone();
    match notifier.send_email(email).await {
        Ok(()) => {
            info!("Notification sent to {}", to);
            Delivery::Sent
        }
        Err(e) => {
            warn!("Email notification to {} failed: {}", to, e);
            Delivery::Failed(e.to_string())
        }
    }
}
