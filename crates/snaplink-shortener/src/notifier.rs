//! Fire-and-forget delivery of notifications to an external sink.
//!
//! Mutating code emits through a [`NotifierHandle`], which only pushes onto
//! an unbounded channel. A separately spawned task drains the channel into
//! the configured [`NotificationSink`]; sink errors are logged and dropped.

use async_trait::async_trait;
use snaplink_core::{Level, Notification, NotificationSink, NotifyError};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{error, info, trace, warn};

/// Cheap, cloneable emitter for notifications.
#[derive(Debug, Clone)]
pub struct NotifierHandle {
    tx: Option<UnboundedSender<Notification>>,
    token: Arc<str>,
}

impl NotifierHandle {
    /// A handle that discards everything.
    pub fn disabled() -> Self {
        Self {
            tx: None,
            token: Arc::from(""),
        }
    }

    /// Queues a notification. Never blocks and never fails; if the notifier
    /// task is gone the notification is dropped.
    pub fn emit(&self, level: Level, message: impl Into<String>) {
        let Some(tx) = &self.tx else {
            return;
        };
        let notification = Notification::new(level, message, self.token.as_ref());
        if tx.send(notification).is_err() {
            trace!("notifier task stopped, dropping notification");
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.emit(Level::Info, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(Level::Error, message);
    }
}

/// Spawns the notifier task on the current tokio runtime.
///
/// The task runs until every clone of the returned handle has been dropped
/// and the queue is drained; awaiting the `JoinHandle` after that flushes
/// all pending notifications.
pub fn spawn<K: NotificationSink>(
    sink: K,
    token: impl Into<String>,
) -> (NotifierHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run(sink, rx));
    let handle = NotifierHandle {
        tx: Some(tx),
        token: Arc::from(token.into()),
    };
    (handle, task)
}

async fn run<K: NotificationSink>(sink: K, mut rx: UnboundedReceiver<Notification>) {
    while let Some(notification) = rx.recv().await {
        if let Err(err) = sink.deliver(&notification).await {
            warn!(
                error = %err,
                level = %notification.level,
                "failed to deliver notification"
            );
        }
    }
    trace!("notifier task finished");
}

/// Forwards notifications to `tracing`. The token is never logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

#[async_trait]
impl NotificationSink for TracingSink {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        match notification.level {
            Level::Info => info!(
                target: "snaplink::notify",
                origin = %notification.origin,
                category = %notification.category,
                "{}",
                notification.message
            ),
            Level::Error => error!(
                target: "snaplink::notify",
                origin = %notification.origin,
                category = %notification.category,
                "{}",
                notification.message
            ),
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::test_sink::{FailingSink, RecordingSink};
    use super::*;
    use snaplink_core::{Category, Origin};

    #[tokio::test]
    async fn delivers_in_order_with_token() {
        let sink = RecordingSink::default();
        let (handle, task) = spawn(sink.clone(), "bearer-123");

        handle.info("first");
        handle.error("second");
        drop(handle);
        task.await.unwrap();

        let delivered = sink.delivered();
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[0].message, "first");
        assert_eq!(delivered[0].level, Level::Info);
        assert_eq!(delivered[1].level, Level::Error);
        for n in &delivered {
            assert_eq!(n.origin, Origin::Frontend);
            assert_eq!(n.category, Category::Component);
            assert_eq!(n.token, "bearer-123");
        }
    }

    #[tokio::test]
    async fn sink_failures_are_swallowed() {
        let (handle, task) = spawn(FailingSink, "");

        handle.info("lost");
        handle.error("also lost");
        drop(handle);

        // The task keeps draining and exits normally.
        task.await.unwrap();
    }

    #[tokio::test]
    async fn emit_after_task_stopped_is_harmless() {
        let (handle, task) = spawn(RecordingSink::default(), "");
        task.abort();
        let _ = task.await;

        handle.info("nobody listening");
    }

    #[test]
    fn disabled_handle_needs_no_runtime() {
        let handle = NotifierHandle::disabled();
        handle.info("dropped");
        handle.error("dropped");
    }

    #[tokio::test]
    async fn tracing_sink_accepts_everything() {
        let sink = TracingSink;
        let n = Notification::new(Level::Error, "Invalid URL: nope", "secret");
        assert!(sink.deliver(&n).await.is_ok());
    }
}
