//! The command service: registration, search, and dispatch.
//!
//! Dispatch walks a fixed pipeline: prefix detection, longest-alias search,
//! a parse retry loop over same-alias candidates (descending priority),
//! the precondition chain, and finally handler execution under the command's
//! run mode. Exactly one `executed` or `errored` event is emitted per
//! terminal state.
//!
//! # Concurrency
//!
//! Many messages may be dispatched concurrently. The module registry and
//! trie sit behind one `RwLock`: registration and unload take the write
//! lock; a dispatch takes a short read lock to clone the matched commands
//! out and then proceeds without it. `Async` and `FireAndForget` commands
//! spawn unbounded tasks -- the engine imposes no backpressure.

use std::sync::{Arc, RwLock};

use tiller_types::{BuildError, CommandContext, CommandError, RunMode};

use crate::builder::{self, ModuleSpec};
use crate::config::CommandConfig;
use crate::events::CommandEvents;
use crate::info::{CommandInfo, ModuleInfo};
use crate::map::CommandMap;
use crate::reader::TypeReaderRegistry;
use crate::value::Args;

struct ServiceInner {
    map: CommandMap,
    modules: Vec<Arc<ModuleInfo>>,
}

/// Registry and dispatcher for text commands.
pub struct CommandService {
    config: CommandConfig,
    readers: TypeReaderRegistry,
    inner: RwLock<ServiceInner>,
    subscribers: RwLock<Vec<Arc<dyn CommandEvents>>>,
}

impl CommandService {
    pub fn new(config: CommandConfig) -> Self {
        Self {
            config,
            readers: TypeReaderRegistry::new(),
            inner: RwLock::new(ServiceInner {
                map: CommandMap::new(),
                modules: Vec::new(),
            }),
            subscribers: RwLock::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &CommandConfig {
        &self.config
    }

    /// The type reader registry, for global and module-scoped registration.
    pub fn readers(&self) -> &TypeReaderRegistry {
        &self.readers
    }

    /// Subscribe a lifecycle event observer.
    pub fn subscribe(&self, events: Arc<dyn CommandEvents>) {
        self.subscribers
            .write()
            .expect("subscriber lock poisoned")
            .push(events);
    }

    /// Build a module record and register its command tree.
    ///
    /// Fails without side effects: a build or duplicate-path error leaves
    /// previously registered modules untouched and registers nothing from
    /// this record.
    pub fn register_module(&self, spec: ModuleSpec) -> Result<Arc<ModuleInfo>, BuildError> {
        let module = builder::build_module(spec, "", &[], &self.readers, &self.config)?;
        let commands = module.all_commands();

        let mut inner = self.inner.write().expect("service lock poisoned");

        // Canonical paths first so a duplicate is caught before any alias
        // lands; roll back this record's insertions on failure.
        let mut inserted: Vec<(String, Arc<CommandInfo>)> = Vec::new();
        for command in &commands {
            if let Err(err) =
                inner
                    .map
                    .insert(command.path(), self.config.separator, Arc::clone(command))
            {
                for (path, cmd) in &inserted {
                    inner.map.remove(path, self.config.separator, cmd);
                }
                return Err(err);
            }
            inserted.push((command.path().to_string(), Arc::clone(command)));
        }
        for command in &commands {
            for alias in command.aliases().iter().skip(1) {
                inner
                    .map
                    .insert_alias(alias, self.config.separator, Arc::clone(command));
            }
        }

        inner.modules.push(Arc::clone(&module));
        tracing::debug!(
            module = module.path(),
            commands = commands.len(),
            "registered module"
        );
        Ok(module)
    }

    /// Unload a module: its commands stop resolving, other modules are
    /// unaffected. Returns `false` if the module was not registered.
    pub fn remove_module(&self, module: &Arc<ModuleInfo>) -> bool {
        let mut inner = self.inner.write().expect("service lock poisoned");
        let position = inner
            .modules
            .iter()
            .position(|m| Arc::ptr_eq(m, module));
        let Some(position) = position else {
            return false;
        };
        inner.modules.remove(position);
        for command in module.all_commands() {
            for alias in command.aliases() {
                inner.map.remove(alias, self.config.separator, &command);
            }
        }
        tracing::debug!(module = module.path(), "removed module");
        true
    }

    /// Registered top-level modules.
    pub fn modules(&self) -> Vec<Arc<ModuleInfo>> {
        self.inner
            .read()
            .expect("service lock poisoned")
            .modules
            .clone()
    }

    /// Every registered command, across all modules.
    pub fn commands(&self) -> Vec<Arc<CommandInfo>> {
        self.inner
            .read()
            .expect("service lock poisoned")
            .modules
            .iter()
            .flat_map(|m| m.all_commands())
            .collect()
    }

    /// Resolve the longest alias that prefixes `input`.
    ///
    /// Returns the commands at that alias ordered by descending priority
    /// (registration order on ties) and the remaining argument text.
    pub fn search(&self, input: &str) -> Result<(Vec<Arc<CommandInfo>>, String), CommandError> {
        let inner = self.inner.read().expect("service lock poisoned");
        match inner
            .map
            .resolve_longest(input, self.config.separator, !self.config.case_sensitive)
        {
            Some((mut commands, remainder)) => {
                commands.sort_by(|a, b| b.priority().cmp(&a.priority()));
                Ok((commands, remainder.to_string()))
            }
            None => Err(CommandError::UnknownCommand),
        }
    }

    /// Exact path lookup with ancestor fallback, for group-level defaults.
    pub fn find_with_fallback(&self, path: &str) -> Vec<Arc<CommandInfo>> {
        self.inner
            .read()
            .expect("service lock poisoned")
            .map
            .get_with_fallback(path, self.config.separator, !self.config.case_sensitive)
    }

    /// Dispatch the raw transport message carried on the context: detect and
    /// strip the command prefix from `ctx.message`, then execute. `None`
    /// means the message is not a command.
    pub async fn handle_message(&self, ctx: &CommandContext) -> Option<Result<(), CommandError>> {
        let input = self.config.strip_prefix(&ctx.message)?;
        Some(self.execute(ctx, input.trim_start()).await)
    }

    /// Dispatch prefix-stripped input through search, parse, preconditions,
    /// and execution.
    ///
    /// The returned `Err` mirrors the emitted error event, except for a
    /// `Sync` handler failure with `throw_on_error` set: that propagates
    /// here and is not also emitted as an event.
    pub async fn execute(&self, ctx: &CommandContext, input: &str) -> Result<(), CommandError> {
        let (candidates, remainder) = match self.search(input) {
            Ok(found) => found,
            Err(err) => {
                self.emit_errored(ctx, &err, None).await;
                return Err(err);
            }
        };

        // Overload retry: attempt each candidate until one parses. Only the
        // first (highest-priority) failure is reported if none do.
        let mut first_failure: Option<CommandError> = None;
        let mut matched: Option<(Arc<CommandInfo>, Args)> = None;
        for candidate in &candidates {
            match candidate.parse(ctx, &remainder, &self.config).await {
                Ok(args) => {
                    matched = Some((Arc::clone(candidate), args));
                    break;
                }
                Err(err) => {
                    tracing::debug!(
                        command = candidate.path(),
                        error = %err,
                        "candidate failed to parse"
                    );
                    if first_failure.is_none() {
                        first_failure = Some(err);
                    }
                }
            }
        }

        let (command, args) = match matched {
            Some(found) => found,
            None => {
                let err = first_failure.unwrap_or(CommandError::UnknownCommand);
                self.emit_errored(ctx, &err, candidates.first().map(Arc::as_ref))
                    .await;
                return Err(err);
            }
        };

        // Preconditions are never retried against other candidates.
        if let Err(err) = command.check_preconditions(ctx).await {
            self.emit_errored(ctx, &err, Some(command.as_ref())).await;
            return Err(err);
        }

        match command.run_mode() {
            RunMode::Sync => {
                tracing::debug!(command = command.path(), "executing command");
                match command.handler().run(ctx, args).await {
                    Ok(()) => {
                        self.emit_executed(ctx, &command).await;
                        Ok(())
                    }
                    Err(source) => {
                        tracing::error!(
                            command = command.path(),
                            error = %source,
                            "command handler failed"
                        );
                        let err = CommandError::Exception(source);
                        if self.config.throw_on_error {
                            Err(err)
                        } else {
                            self.emit_errored(ctx, &err, Some(command.as_ref())).await;
                            Ok(())
                        }
                    }
                }
            }
            RunMode::Async => {
                let subscribers = self.subscribers_snapshot();
                let ctx = ctx.clone();
                let command = Arc::clone(&command);
                tokio::spawn(async move {
                    tracing::debug!(command = command.path(), "executing async command");
                    match command.handler().run(&ctx, args).await {
                        Ok(()) => {
                            for sub in &subscribers {
                                sub.executed(&ctx, command.as_ref()).await;
                            }
                        }
                        Err(source) => {
                            tracing::error!(
                                command = command.path(),
                                error = %source,
                                "async command handler failed"
                            );
                            let err = CommandError::Exception(source);
                            for sub in &subscribers {
                                sub.errored(&ctx, &err, Some(command.as_ref())).await;
                            }
                        }
                    }
                });
                Ok(())
            }
            RunMode::FireAndForget => {
                let ctx = ctx.clone();
                let command = Arc::clone(&command);
                tokio::spawn(async move {
                    if let Err(source) = command.handler().run(&ctx, args).await {
                        // Loss of error visibility is this mode's contract.
                        tracing::debug!(
                            command = command.path(),
                            error = %source,
                            "fire-and-forget handler failed"
                        );
                    }
                });
                Ok(())
            }
        }
    }

    fn subscribers_snapshot(&self) -> Vec<Arc<dyn CommandEvents>> {
        self.subscribers
            .read()
            .expect("subscriber lock poisoned")
            .clone()
    }

    async fn emit_executed(&self, ctx: &CommandContext, command: &Arc<CommandInfo>) {
        for sub in self.subscribers_snapshot() {
            sub.executed(ctx, command.as_ref()).await;
        }
    }

    async fn emit_errored(
        &self,
        ctx: &CommandContext,
        err: &CommandError,
        command: Option<&CommandInfo>,
    ) {
        for sub in self.subscribers_snapshot() {
            sub.errored(ctx, err, command).await;
        }
    }
}

impl Default for CommandService {
    fn default() -> Self {
        Self::new(CommandConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{CommandSpec, ParameterSpec};
    use crate::handler::handler;

    fn noop() -> Arc<dyn crate::handler::CommandHandler> {
        handler(|_ctx, _args| async { Ok(()) })
    }

    #[test]
    fn test_search_orders_candidates_by_priority() {
        let service = CommandService::default();
        service
            .register_module(
                ModuleSpec::new("m")
                    .command(CommandSpec::new("go", noop()).priority(1))
                    .command(
                        CommandSpec::new("go", noop())
                            .priority(5)
                            .param(ParameterSpec::of::<i64>("x")),
                    ),
            )
            .expect("register");

        let (found, rest) = service.search("m go 1").expect("search");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].priority(), 5);
        assert_eq!(rest, "1");
    }

    #[test]
    fn test_duplicate_registration_rolls_back_whole_record() {
        let service = CommandService::default();
        service
            .register_module(ModuleSpec::new("m").command(CommandSpec::new("a", noop())))
            .expect("first");

        // "b" is inserted before "a" collides; the rollback must undo it.
        let err = service
            .register_module(
                ModuleSpec::new("m")
                    .command(CommandSpec::new("b", noop()))
                    .command(CommandSpec::new("a", noop())),
            )
            .expect_err("duplicate path");
        assert!(matches!(err, BuildError::DuplicatePath { .. }));

        assert!(service.search("m a").is_ok());
        assert!(matches!(
            service.search("m b"),
            Err(CommandError::UnknownCommand)
        ));
        assert_eq!(service.modules().len(), 1);
    }

    #[test]
    fn test_remove_module_leaves_siblings() {
        let service = CommandService::default();
        let math = service
            .register_module(ModuleSpec::new("math").command(CommandSpec::new("add", noop())))
            .expect("math");
        service
            .register_module(ModuleSpec::new("util").command(CommandSpec::new("ping", noop())))
            .expect("util");

        assert!(service.remove_module(&math));
        assert!(matches!(
            service.search("math add"),
            Err(CommandError::UnknownCommand)
        ));
        assert!(service.search("util ping").is_ok());

        // Removing twice is a no-op.
        assert!(!service.remove_module(&math));
    }

    #[test]
    fn test_case_sensitivity_modes() {
        let insensitive = CommandService::default();
        insensitive
            .register_module(ModuleSpec::new("Math").command(CommandSpec::new("Add", noop())))
            .expect("register");
        assert!(insensitive.search("MATH ADD").is_ok());

        let sensitive = CommandService::new(CommandConfig {
            case_sensitive: true,
            ..CommandConfig::default()
        });
        sensitive
            .register_module(ModuleSpec::new("math").command(CommandSpec::new("add", noop())))
            .expect("register");
        assert!(sensitive.search("math add").is_ok());
        assert!(matches!(
            sensitive.search("MATH ADD"),
            Err(CommandError::UnknownCommand)
        ));
    }

    #[test]
    fn test_fallback_lookup_reaches_group_default() {
        let service = CommandService::default();
        service
            .register_module(
                ModuleSpec::new("git")
                    .command(CommandSpec::new("", noop()).param(
                        ParameterSpec::of::<String>("rest").remainder().optional(),
                    ))
                    .command(CommandSpec::new("push", noop())),
            )
            .expect("register");

        let found = service.find_with_fallback("git frobnicate");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path(), "git");
    }
}
