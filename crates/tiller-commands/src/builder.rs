//! Registration records and descriptor construction.
//!
//! A registrar (the collaborator that knows where handlers come from) hands
//! the service inert records: [`ModuleSpec`] containing [`CommandSpec`]s
//! containing [`ParameterSpec`]s. The engine performs no introspection of its
//! own; everything it needs is in the records. Building validates the records
//! and resolves every parameter's type reader, so a misdeclared command fails
//! loudly at registration instead of at parse time.

use std::any::Any;
use std::sync::Arc;

use tiller_types::{BuildError, RunMode};

use crate::config::CommandConfig;
use crate::handler::CommandHandler;
use crate::info::{CommandInfo, ModuleInfo, ParameterInfo};
use crate::precondition::Precondition;
use crate::reader::{enum_reader, EnumArg, ReaderFactory, TypeReaderRegistry};
use crate::value::{ArgValue, TypeTag};

/// Declaration of one command parameter.
pub struct ParameterSpec {
    name: String,
    tag: TypeTag,
    optional: bool,
    remainder: bool,
    variadic: bool,
    default: Option<ArgValue>,
    factory: Option<ReaderFactory>,
}

impl ParameterSpec {
    /// A parameter of type `T`, converted by the reader registered for `T`.
    pub fn of<T: Any + Send + Sync>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: TypeTag::of::<T>(),
            optional: false,
            remainder: false,
            variadic: false,
            default: None,
            factory: None,
        }
    }

    /// A parameter of an [`EnumArg`] type. If no reader is registered for the
    /// type, a case-insensitive name/ordinal reader is synthesized on first
    /// use and cached.
    pub fn enum_of<T: EnumArg>(name: impl Into<String>) -> Self {
        let mut spec = Self::of::<T>(name);
        spec.factory = Some(enum_reader::<T>);
        spec
    }

    /// The parameter may be omitted from the input.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// The parameter consumes the rest of the input verbatim. Must be last.
    pub fn remainder(mut self) -> Self {
        self.remainder = true;
        self
    }

    /// The parameter collects remaining tokens into a sequence. Must be last.
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    /// Value used when the parameter is omitted; implies `optional`.
    pub fn default_value<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.default = Some(ArgValue::new(value));
        self.optional = true;
        self
    }
}

/// Declaration of one command.
pub struct CommandSpec {
    name: String,
    aliases: Vec<String>,
    summary: Option<String>,
    run_mode: Option<RunMode>,
    priority: i32,
    preconditions: Vec<Arc<dyn Precondition>>,
    parameters: Vec<ParameterSpec>,
    handler: Arc<dyn CommandHandler>,
}

impl CommandSpec {
    /// A command with the given local name. An empty name makes this the
    /// module's group-level default, reachable at the module path itself.
    pub fn new(name: impl Into<String>, handler: Arc<dyn CommandHandler>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            summary: None,
            run_mode: None,
            priority: 0,
            preconditions: Vec::new(),
            parameters: Vec::new(),
            handler,
        }
    }

    /// Add a secondary alias (module prefix is applied automatically).
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Override the service's default run mode for this command.
    pub fn run_mode(mut self, mode: RunMode) -> Self {
        self.run_mode = Some(mode);
        self
    }

    /// Tie-break between commands sharing an alias; higher is tried first.
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn precondition(mut self, pre: Arc<dyn Precondition>) -> Self {
        self.preconditions.push(pre);
        self
    }

    /// Append a parameter (declaration order is binding order).
    pub fn param(mut self, param: ParameterSpec) -> Self {
        self.parameters.push(param);
        self
    }
}

/// Declaration of one module: a prefix, shared preconditions, commands, and
/// nested modules.
pub struct ModuleSpec {
    prefix: String,
    summary: Option<String>,
    preconditions: Vec<Arc<dyn Precondition>>,
    commands: Vec<CommandSpec>,
    submodules: Vec<ModuleSpec>,
}

impl ModuleSpec {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            summary: None,
            preconditions: Vec::new(),
            commands: Vec::new(),
            submodules: Vec::new(),
        }
    }

    /// A module without a prefix: its commands are reachable by bare name.
    pub fn root() -> Self {
        Self::new("")
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Precondition inherited by every command in this module and below.
    pub fn precondition(mut self, pre: Arc<dyn Precondition>) -> Self {
        self.preconditions.push(pre);
        self
    }

    pub fn command(mut self, command: CommandSpec) -> Self {
        self.commands.push(command);
        self
    }

    pub fn submodule(mut self, module: ModuleSpec) -> Self {
        self.submodules.push(module);
        self
    }
}

fn normalize(text: &str, config: &CommandConfig) -> String {
    if config.case_sensitive {
        text.to_string()
    } else {
        text.to_lowercase()
    }
}

/// Join two path fragments with the separator, collapsing empty sides.
fn join(left: &str, right: &str, separator: char) -> String {
    if left.is_empty() {
        right.to_string()
    } else if right.is_empty() {
        left.to_string()
    } else {
        format!("{left}{separator}{right}")
    }
}

/// Build a module tree from its record.
///
/// Validation is fatal per module: the first offending command aborts the
/// whole record and nothing from it is registered.
pub(crate) fn build_module(
    spec: ModuleSpec,
    parent_path: &str,
    inherited: &[Arc<dyn Precondition>],
    readers: &TypeReaderRegistry,
    config: &CommandConfig,
) -> Result<Arc<ModuleInfo>, BuildError> {
    let prefix = normalize(&spec.prefix, config);
    let path = join(parent_path, &prefix, config.separator);

    // Two commands with the same name and arity in one module cannot be told
    // apart when dispatching; reject the record outright.
    for (i, a) in spec.commands.iter().enumerate() {
        for b in &spec.commands[i + 1..] {
            if normalize(&a.name, config) == normalize(&b.name, config)
                && a.parameters.len() == b.parameters.len()
            {
                return Err(BuildError::AmbiguousHandler {
                    module: path.clone(),
                    command: a.name.clone(),
                    arity: a.parameters.len(),
                });
            }
        }
    }

    let mut chain: Vec<Arc<dyn Precondition>> = inherited.to_vec();
    chain.extend(spec.preconditions.iter().cloned());

    let mut commands = Vec::with_capacity(spec.commands.len());
    for command in spec.commands {
        commands.push(Arc::new(build_command(
            command, &path, &chain, readers, config,
        )?));
    }

    let mut submodules = Vec::with_capacity(spec.submodules.len());
    for sub in spec.submodules {
        submodules.push(build_module(sub, &path, &chain, readers, config)?);
    }

    Ok(Arc::new(ModuleInfo::new(
        prefix,
        path,
        spec.summary,
        spec.preconditions,
        commands,
        submodules,
    )))
}

fn build_command(
    spec: CommandSpec,
    module_path: &str,
    chain: &[Arc<dyn Precondition>],
    readers: &TypeReaderRegistry,
    config: &CommandConfig,
) -> Result<CommandInfo, BuildError> {
    let last = spec.parameters.len().saturating_sub(1);
    for (i, param) in spec.parameters.iter().enumerate() {
        let is_tail_kind = param.remainder || param.variadic;
        if (param.remainder && param.variadic) || (is_tail_kind && i != last) {
            return Err(BuildError::InvalidVariadicPosition {
                parameter: param.name.clone(),
                command: spec.name.clone(),
            });
        }
    }

    let mut parameters = Vec::with_capacity(spec.parameters.len());
    for param in spec.parameters {
        let reader = readers
            .resolve(param.tag, module_path, param.factory)
            .ok_or_else(|| BuildError::MissingTypeReader {
                type_name: param.tag.name().to_string(),
                parameter: param.name.clone(),
                command: spec.name.clone(),
            })?;
        parameters.push(ParameterInfo::new(
            param.name,
            param.tag,
            reader,
            param.optional,
            param.remainder,
            param.variadic,
            param.default,
        ));
    }

    let name = normalize(&spec.name, config);
    let path = join(module_path, &name, config.separator);

    let mut aliases = vec![path.clone()];
    for alias in &spec.aliases {
        let full = join(module_path, &normalize(alias, config), config.separator);
        if !aliases.contains(&full) {
            aliases.push(full);
        }
    }

    // Module chain first (root to leaf), then the command's own checks.
    let mut preconditions = chain.to_vec();
    preconditions.extend(spec.preconditions);

    Ok(CommandInfo::new(
        name,
        path,
        module_path.to_string(),
        aliases,
        spec.summary,
        parameters,
        preconditions,
        spec.run_mode.unwrap_or(config.default_run_mode),
        spec.priority,
        spec.handler,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler;

    fn noop() -> Arc<dyn CommandHandler> {
        handler(|_ctx, _args| async { Ok(()) })
    }

    fn build(spec: ModuleSpec) -> Result<Arc<ModuleInfo>, BuildError> {
        build_module(
            spec,
            "",
            &[],
            &TypeReaderRegistry::new(),
            &CommandConfig::default(),
        )
    }

    #[test]
    fn test_canonical_alias_includes_module_chain() {
        let spec = ModuleSpec::new("math").submodule(
            ModuleSpec::new("vector")
                .command(CommandSpec::new("add", noop()).alias("plus")),
        );
        let module = build(spec).expect("build");
        let sub = &module.submodules()[0];
        let cmd = &sub.commands()[0];
        assert_eq!(cmd.path(), "math vector add");
        assert_eq!(cmd.aliases(), ["math vector add", "math vector plus"]);
        assert_eq!(cmd.module_path(), "math vector");
    }

    #[test]
    fn test_case_insensitive_build_lowercases_aliases() {
        let spec = ModuleSpec::new("Math").command(CommandSpec::new("Add", noop()));
        let module = build(spec).expect("build");
        assert_eq!(module.commands()[0].path(), "math add");
    }

    #[test]
    fn test_empty_name_is_group_default() {
        let spec = ModuleSpec::new("math").command(CommandSpec::new("", noop()));
        let module = build(spec).expect("build");
        assert_eq!(module.commands()[0].path(), "math");
    }

    #[test]
    fn test_variadic_must_be_last() {
        let spec = ModuleSpec::new("m").command(
            CommandSpec::new("bad", noop())
                .param(ParameterSpec::of::<i64>("xs").variadic())
                .param(ParameterSpec::of::<i64>("y")),
        );
        let err = build(spec).expect_err("variadic not last");
        assert!(matches!(err, BuildError::InvalidVariadicPosition { .. }));
    }

    #[test]
    fn test_remainder_and_variadic_are_exclusive() {
        let spec = ModuleSpec::new("m").command(
            CommandSpec::new("bad", noop())
                .param(ParameterSpec::of::<String>("rest").remainder().variadic()),
        );
        let err = build(spec).expect_err("both flags");
        assert!(matches!(err, BuildError::InvalidVariadicPosition { .. }));
    }

    #[test]
    fn test_missing_type_reader_fails_at_build() {
        struct Unregistered;
        let spec = ModuleSpec::new("m").command(
            CommandSpec::new("bad", noop()).param(ParameterSpec::of::<Unregistered>("x")),
        );
        let err = build(spec).expect_err("missing reader");
        assert!(matches!(err, BuildError::MissingTypeReader { .. }));
    }

    #[test]
    fn test_same_name_same_arity_is_ambiguous() {
        let spec = ModuleSpec::new("m")
            .command(CommandSpec::new("add", noop()).param(ParameterSpec::of::<i64>("x")))
            .command(CommandSpec::new("add", noop()).param(ParameterSpec::of::<i64>("y")));
        let err = build(spec).expect_err("ambiguous");
        assert!(matches!(err, BuildError::AmbiguousHandler { .. }));
    }

    #[test]
    fn test_overloads_with_distinct_arity_build() {
        let spec = ModuleSpec::new("math")
            .command(
                CommandSpec::new("add", noop())
                    .param(ParameterSpec::of::<i64>("x"))
                    .param(ParameterSpec::of::<i64>("y")),
            )
            .command(
                CommandSpec::new("add", noop())
                    .param(ParameterSpec::of::<i64>("x"))
                    .param(ParameterSpec::of::<i64>("y"))
                    .param(ParameterSpec::of::<i64>("z")),
            );
        let module = build(spec).expect("overloads");
        assert_eq!(module.commands().len(), 2);
    }

    #[test]
    fn test_run_mode_defaults_from_config() {
        let spec = ModuleSpec::new("m")
            .command(CommandSpec::new("a", noop()))
            .command(CommandSpec::new("b", noop()).run_mode(RunMode::Async));
        let module = build(spec).expect("build");
        assert_eq!(module.commands()[0].run_mode(), RunMode::Sync);
        assert_eq!(module.commands()[1].run_mode(), RunMode::Async);
    }
}
