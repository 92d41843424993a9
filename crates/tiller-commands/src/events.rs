//! Lifecycle event observers.
//!
//! The dispatcher emits exactly one `executed` or one `errored` call per
//! terminal dispatch state, never both. Subscribers implement the methods
//! they care about; both default to no-ops.

use async_trait::async_trait;
use tiller_types::{CommandContext, CommandError};

use crate::info::CommandInfo;

/// Observer notified when a dispatch reaches a terminal state.
///
/// `command` is `None` for failures reached before a single command was
/// settled on (unknown command, or a parse failure across all overload
/// candidates reported against none in particular is still attributed to the
/// best candidate when one exists).
#[async_trait]
pub trait CommandEvents: Send + Sync {
    /// A command's handler completed successfully.
    async fn executed(&self, ctx: &CommandContext, command: &CommandInfo) {
        let _ = (ctx, command);
    }

    /// A dispatch terminated with a failure.
    async fn errored(
        &self,
        ctx: &CommandContext,
        error: &CommandError,
        command: Option<&CommandInfo>,
    ) {
        let _ = (ctx, error, command);
    }
}
