//! Notification worker tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use auth_gate::{
    AuthError, Notification, NotificationPriority, Notifier, NotifyError, NotifyHandle,
};
use tokio::sync::mpsc;
use tokio_test::assert_ok;

struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        let _ = self.tx.send(notification);
        Ok(())
    }
}

/// Sink that always fails; failures must stay inside the worker.
struct BrokenNotifier {
    attempts: Arc<AtomicUsize>,
}

#[async_trait]
impl Notifier for BrokenNotifier {
    async fn notify(&self, _notification: Notification) -> Result<(), NotifyError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err("sink unavailable".into())
    }
}

#[tokio::test]
async fn enqueued_notifications_are_delivered_in_order() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = NotifyHandle::spawn(Arc::new(ChannelNotifier { tx }));

    tokio_test::assert_ok!(
        handle.enqueue(Notification::new("first").with_priority(NotificationPriority::High))
    );
    tokio_test::assert_ok!(handle.enqueue(Notification::new("second")));

    assert_eq!(rx.recv().await.unwrap().message, "first");
    assert_eq!(rx.recv().await.unwrap().message, "second");
}

#[tokio::test]
async fn enqueue_rejects_empty_messages() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let handle = NotifyHandle::spawn(Arc::new(ChannelNotifier { tx }));

    assert!(matches!(
        handle.enqueue(Notification::new("")),
        Err(AuthError::NoNotificationMessage)
    ));
}

#[tokio::test]
async fn delivery_failure_never_reaches_the_caller() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let handle = NotifyHandle::spawn(Arc::new(BrokenNotifier {
        attempts: Arc::clone(&attempts),
    }));

    handle.enqueue(Notification::new("doomed")).unwrap();

    // the worker consumed and failed the delivery without propagating
    while attempts.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}
