//! Shared fixtures for the integration tests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use tiller_commands::{
    handler, CommandContext, CommandError, CommandEvents, CommandHandler, CommandInfo,
};

/// One terminal dispatch outcome, as seen by a subscriber.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Executed(String),
    Errored(String, Option<String>),
}

/// Event subscriber that forwards every notification onto a channel, so
/// tests can await events emitted from spawned tasks.
pub struct Recorder {
    tx: mpsc::UnboundedSender<Event>,
}

impl Recorder {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

#[async_trait]
impl CommandEvents for Recorder {
    async fn executed(&self, _ctx: &CommandContext, command: &CommandInfo) {
        let _ = self.tx.send(Event::Executed(command.path().to_string()));
    }

    async fn errored(
        &self,
        _ctx: &CommandContext,
        error: &CommandError,
        command: Option<&CommandInfo>,
    ) {
        let _ = self.tx.send(Event::Errored(
            error.kind().to_string(),
            command.map(|c| c.path().to_string()),
        ));
    }
}

pub fn ctx() -> CommandContext {
    CommandContext::new("tester", "general", "")
}

pub fn noop() -> Arc<dyn CommandHandler> {
    handler(|_ctx, _args| async { Ok(()) })
}
