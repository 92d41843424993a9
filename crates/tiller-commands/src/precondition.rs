//! Preconditions: ordered permission predicates checked before execution.
//!
//! A command's effective chain is its module chain's preconditions (root to
//! leaf) followed by its own, evaluated in that order and short-circuiting on
//! the first failure. Module checks therefore always fail fast before any
//! command-specific logic runs.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tiller_types::{CommandContext, CommandError};

/// Permission predicate evaluated against the calling context.
///
/// `Err` carries the human-readable reason surfaced as `BadPermissions`.
#[async_trait]
pub trait Precondition: Send + Sync {
    async fn check(&self, ctx: &CommandContext) -> Result<(), String>;
}

/// Adapter implementing [`Precondition`] for an async closure.
pub struct FnPrecondition<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Precondition for FnPrecondition<F>
where
    F: Fn(CommandContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), String>> + Send,
{
    async fn check(&self, ctx: &CommandContext) -> Result<(), String> {
        (self.f)(ctx.clone()).await
    }
}

/// Wrap an async closure as a shareable precondition.
pub fn precondition<F, Fut>(f: F) -> Arc<dyn Precondition>
where
    F: Fn(CommandContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), String>> + Send + 'static,
{
    Arc::new(FnPrecondition { f })
}

/// A precondition gating on the calling principal.
pub struct RequirePrincipal {
    allowed: Vec<String>,
}

impl RequirePrincipal {
    pub fn new(allowed: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl Precondition for RequirePrincipal {
    async fn check(&self, ctx: &CommandContext) -> Result<(), String> {
        if self.allowed.iter().any(|p| p == &ctx.principal) {
            Ok(())
        } else {
            Err(format!(
                "principal {:?} is not allowed to run this command",
                ctx.principal
            ))
        }
    }
}

/// Evaluate an ordered chain, stopping at the first failure.
pub(crate) async fn check_all(
    chain: &[Arc<dyn Precondition>],
    ctx: &CommandContext,
) -> Result<(), CommandError> {
    for pre in chain {
        if let Err(reason) = pre.check(ctx).await {
            return Err(CommandError::BadPermissions(reason));
        }
    }
    Ok(())
}
