//! Descriptor for one registered command.

use std::sync::Arc;

use tiller_types::{CommandContext, CommandError, RunMode};

use crate::config::CommandConfig;
use crate::handler::CommandHandler;
use crate::info::ParameterInfo;
use crate::parser;
use crate::precondition::{self, Precondition};
use crate::value::Args;

/// Immutable metadata for one command, built once at registration.
///
/// Aliases are module-prefixed and always include the canonical path. The
/// precondition list is pre-aggregated: module chain (root to leaf) first,
/// then the command's own, so module checks fail fast.
pub struct CommandInfo {
    name: String,
    path: String,
    module_path: String,
    aliases: Vec<String>,
    summary: Option<String>,
    parameters: Vec<ParameterInfo>,
    preconditions: Vec<Arc<dyn Precondition>>,
    run_mode: RunMode,
    priority: i32,
    handler: Arc<dyn CommandHandler>,
}

impl CommandInfo {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: String,
        path: String,
        module_path: String,
        aliases: Vec<String>,
        summary: Option<String>,
        parameters: Vec<ParameterInfo>,
        preconditions: Vec<Arc<dyn Precondition>>,
        run_mode: RunMode,
        priority: i32,
        handler: Arc<dyn CommandHandler>,
    ) -> Self {
        Self {
            name,
            path,
            module_path,
            aliases,
            summary,
            parameters,
            preconditions,
            run_mode,
            priority,
            handler,
        }
    }

    /// Local command name, without the module prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical path: ancestor module prefixes joined with the separator,
    /// followed by the command name.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Canonical path of the owning module (empty for root commands).
    pub fn module_path(&self) -> &str {
        &self.module_path
    }

    /// All textual paths resolving to this command; the canonical path is
    /// always the first entry.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// One-line description for help surfaces.
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn parameters(&self) -> &[ParameterInfo] {
        &self.parameters
    }

    /// Number of declared parameters; overloads at one path are told apart
    /// by this.
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    pub fn run_mode(&self) -> RunMode {
        self.run_mode
    }

    /// Tie-break when several commands share an alias; higher runs first.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub(crate) fn handler(&self) -> &Arc<dyn CommandHandler> {
        &self.handler
    }

    /// Evaluate the aggregated precondition chain, short-circuiting on the
    /// first failure.
    pub async fn check_preconditions(&self, ctx: &CommandContext) -> Result<(), CommandError> {
        precondition::check_all(&self.preconditions, ctx).await
    }

    /// Parse the post-alias remainder of the input against this command's
    /// parameter list.
    pub async fn parse(
        &self,
        ctx: &CommandContext,
        input: &str,
        config: &CommandConfig,
    ) -> Result<Args, CommandError> {
        parser::parse_args(self, ctx, input, config).await
    }
}

impl std::fmt::Debug for CommandInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandInfo")
            .field("path", &self.path)
            .field("aliases", &self.aliases)
            .field("arity", &self.arity())
            .field("run_mode", &self.run_mode)
            .field("priority", &self.priority)
            .finish()
    }
}
