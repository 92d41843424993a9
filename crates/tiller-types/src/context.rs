//! Execution context passed from the transport through to command handlers.

use tokio::sync::watch;

/// Context describing a single inbound message.
///
/// The engine treats the context as opaque: it is built by the transport,
/// threaded through search, parsing, and preconditions unchanged, and handed
/// to the handler. Preconditions typically inspect `principal` and `channel`.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Principal performing the action (e.g., "user", "telegram-bot").
    pub principal: String,
    /// Channel through which the message arrived ("tui", "telegram", "http").
    pub channel: String,
    /// Original raw message text, before prefix stripping.
    pub message: String,
    /// Cancellation signal from the transport. The engine never triggers it;
    /// handlers may watch it to abort long work.
    cancel: watch::Receiver<bool>,
}

impl CommandContext {
    /// Create a context with a dormant cancellation signal.
    pub fn new(
        principal: impl Into<String>,
        channel: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        // The sender is dropped immediately; the receiver then reports
        // `false` forever, i.e. "never cancelled".
        let (_tx, rx) = watch::channel(false);
        Self {
            principal: principal.into(),
            channel: channel.into(),
            message: message.into(),
            cancel: rx,
        }
    }

    /// Attach a transport-owned cancellation signal.
    pub fn with_cancel(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Whether the transport has requested cancellation.
    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// A clone of the cancellation signal, for handlers that want to
    /// `select!` against it.
    pub fn cancel_signal(&self) -> watch::Receiver<bool> {
        self.cancel.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_defaults_to_not_cancelled() {
        let ctx = CommandContext::new("user", "tui", "/status");
        assert!(!ctx.is_cancelled());
        assert_eq!(ctx.principal, "user");
        assert_eq!(ctx.channel, "tui");
    }

    #[test]
    fn test_context_observes_transport_cancellation() {
        let (tx, rx) = watch::channel(false);
        let ctx = CommandContext::new("user", "tui", "/long-task").with_cancel(rx);
        assert!(!ctx.is_cancelled());

        tx.send(true).expect("receiver alive");
        assert!(ctx.is_cancelled());

        // Clones observe the same signal.
        let cloned = ctx.clone();
        assert!(cloned.is_cancelled());
    }
}
