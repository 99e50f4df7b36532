//! Shopper-facing notices.
//!
//! Notices are fire-and-forget: the cart emits them and moves on. Nothing is
//! retried or acknowledged.

use tokio::sync::mpsc;

/// An error message for the shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
}

impl Notice {
    /// An error notice.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A sink for shopper notices.
pub trait Notifier: Send + Sync {
    /// Show a notice. Must not block.
    fn notify(&self, notice: Notice);
}

/// Emits notices as `tracing` events on the `notice` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        tracing::warn!(target: "notice", "{}", notice.message);
    }
}

/// Forwards notices into a channel for a UI to drain.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiver its notices arrive on.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        // No receiver means nobody is displaying notices any more.
        if self.tx.send(notice).is_err() {
            tracing::debug!("notice dropped, receiver closed");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_notifier_delivers_in_order() {
        let (notifier, mut rx) = ChannelNotifier::new();
        notifier.notify(Notice::error("first"));
        notifier.notify(Notice::error("second"));

        assert_eq!(rx.try_recv().unwrap(), Notice::error("first"));
        assert_eq!(rx.try_recv().unwrap().message, "second");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_notifier_ignores_closed_receiver() {
        let (notifier, rx) = ChannelNotifier::new();
        drop(rx);
        notifier.notify(Notice::error("nobody listening"));
    }
}
