use std::sync::Arc;

use tokio::sync::mpsc::Sender;
use tracing::{info, warn};
use winwatch_protocol::{Notice, NotifyKind};

use crate::Result;

/// Synchronous last-resort surface for warnings and errors when no
/// notification channel is attached (or it is full/closed). The original
/// system used a blocking modal here.
pub trait Alert: Send + Sync {
    /// Show `title` and `text` to the user, blocking briefly if needed.
    fn alert(&self, title: &str, text: &str);
}

/// Fallback alert that writes to stderr.
pub struct StderrAlert;

impl Alert for StderrAlert {
    fn alert(&self, title: &str, text: &str) {
        eprintln!("{}: {}", title, text);
    }
}

/// Sends notifications to the UI layer, with a synchronous fallback for
/// anything the user must not miss.
#[derive(Clone)]
pub struct NotificationDispatcher {
    tx: Option<Sender<Notice>>,
    fallback: Arc<dyn Alert>,
}

impl NotificationDispatcher {
    /// Create a dispatcher over a notification channel.
    pub fn new(tx: Sender<Notice>) -> Self {
        Self {
            tx: Some(tx),
            fallback: Arc::new(StderrAlert),
        }
    }

    /// Create a dispatcher with no channel; warnings and errors go straight
    /// to the fallback.
    pub fn detached() -> Self {
        Self {
            tx: None,
            fallback: Arc::new(StderrAlert),
        }
    }

    /// Replace the fallback alert surface.
    pub fn with_fallback(mut self, fallback: Arc<dyn Alert>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Send a notification. Warnings and errors that cannot be delivered on
    /// the channel are routed to the synchronous fallback so they still
    /// reach the user.
    pub fn send_notification(&self, kind: NotifyKind, title: String, text: String) -> Result<()> {
        // Always log notifications at info level for traceability.
        info!(kind = ?kind, title = %title, text = %text, "notification");
        let delivered = match &self.tx {
            Some(tx) => tx
                .try_send(Notice {
                    kind,
                    title: title.clone(),
                    text: text.clone(),
                })
                .is_ok(),
            None => false,
        };
        if !delivered && !matches!(kind, NotifyKind::Info) {
            warn!(title = %title, "notification channel unavailable, using fallback alert");
            self.fallback.alert(&title, &text);
        }
        Ok(())
    }

    /// Convenience helper for info notices.
    pub fn send_info(&self, title: &str, text: String) -> Result<()> {
        self.send_notification(NotifyKind::Info, title.to_string(), text)
    }

    /// Convenience helper for warning notices.
    pub fn send_warning(&self, title: &str, text: String) -> Result<()> {
        self.send_notification(NotifyKind::Warn, title.to_string(), text)
    }

    /// Convenience helper for error notices.
    pub fn send_error(&self, title: &str, text: String) -> Result<()> {
        self.send_notification(NotifyKind::Error, title.to_string(), text)
    }
}
