//! The handler trait commands are dispatched to.

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tiller_types::CommandContext;

use crate::value::Args;

/// The unit of work behind a registered command.
///
/// Handlers receive the transport context and the fully converted arguments.
/// A returned error is routed according to the command's run mode: inline
/// propagation or an error event for `Sync`, an error event from the spawned
/// task for `Async`, and silence for `FireAndForget`.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn run(&self, ctx: &CommandContext, args: Args) -> Result<()>;
}

/// Adapter implementing [`CommandHandler`] for an async closure.
pub struct FnHandler<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> CommandHandler for FnHandler<F>
where
    F: Fn(CommandContext, Args) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send,
{
    async fn run(&self, ctx: &CommandContext, args: Args) -> Result<()> {
        (self.f)(ctx.clone(), args).await
    }
}

/// Wrap an async closure as a shareable handler.
///
/// ```
/// use tiller_commands::handler;
///
/// let h = handler(|_ctx, _args| async { Ok(()) });
/// # let _ = h;
/// ```
pub fn handler<F, Fut>(f: F) -> Arc<dyn CommandHandler>
where
    F: Fn(CommandContext, Args) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(FnHandler { f })
}
