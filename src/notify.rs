//! Best-effort operator notifications.
//!
//! The request path only enqueues: a background worker owns the caller's
//! [`Notifier`] and drains an unbounded channel, so alerting can never delay
//! or fail an in-flight response. Delivery failures are logged and dropped.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::AuthError;

/// Error type notifier implementations report delivery failures with.
pub type NotifyError = Box<dyn std::error::Error + Send + Sync>;

/// Urgency of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NotificationPriority {
    /// Routine.
    Low,
    /// Worth a look.
    Medium,
    /// Page someone.
    High,
}

impl std::fmt::Display for NotificationPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

/// A single operator-facing notification.
#[derive(Debug, Clone)]
pub struct Notification {
    /// Body text. Required.
    pub message: String,
    /// Short subject line.
    pub subject: String,
    /// Urgency.
    pub priority: NotificationPriority,
    /// Rendered error that triggered the notification, if any.
    pub error: Option<String>,
    /// Free-form routing metadata.
    pub metadata: HashMap<String, String>,
}

impl Notification {
    /// Builds a low-priority notification with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            subject: String::new(),
            priority: NotificationPriority::Low,
            error: None,
            metadata: HashMap::new(),
        }
    }

    /// Sets the subject line.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: NotificationPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Records the error that triggered the notification.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Adds one metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// A notification without a message is not deliverable.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.message.is_empty() {
            return Err(AuthError::NoNotificationMessage);
        }

        Ok(())
    }
}

/// Publishes notifications to an external sink.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers one notification.
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError>;
}

/// Handle for enqueueing notifications onto the background worker.
#[derive(Clone)]
pub struct NotifyHandle {
    tx: mpsc::UnboundedSender<Notification>,
}

impl NotifyHandle {
    /// Spawns the delivery worker and returns the handle feeding it.
    ///
    /// The worker runs until every handle is dropped and logs each delivery
    /// failure at warn; nothing is retried or propagated.
    pub fn spawn(notifier: Arc<dyn Notifier>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Notification>();

        tokio::spawn(async move {
            while let Some(notification) = rx.recv().await {
                let subject = notification.subject.clone();
                if let Err(err) = notifier.notify(notification).await {
                    tracing::warn!(error = %err, subject = %subject, "notification delivery failed");
                }
            }
        });

        Self { tx }
    }

    /// Enqueues a notification without waiting for delivery.
    ///
    /// Fails only on validation; a stopped worker is logged and the
    /// notification dropped.
    pub fn enqueue(&self, notification: Notification) -> Result<(), AuthError> {
        notification.validate()?;

        if self.tx.send(notification).is_err() {
            tracing::warn!("notification worker stopped; dropping notification");
        }

        Ok(())
    }
}

impl std::fmt::Debug for NotifyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyHandle").finish_non_exhaustive()
    }
}
