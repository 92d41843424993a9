//! Error types shared across the Tiller crates.
//!
//! Two distinct taxonomies:
//!
//! - [`CommandError`] -- runtime failures produced while dispatching a single
//!   message. These surface as structured error events and dispatch results.
//! - [`BuildError`] -- fatal failures raised while registering a module.
//!   A build error aborts registration of the offending module without
//!   affecting anything already registered.

/// Runtime failures produced while dispatching a message.
///
/// Each variant corresponds to a stage of the dispatch pipeline: search,
/// tokenization, type conversion, permission checks, or handler execution.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// No registered alias is a prefix of the input.
    #[error("unknown command")]
    UnknownCommand,

    /// Tokenization failed (e.g. an unterminated quoted argument).
    #[error("failed to parse arguments: {0}")]
    ParseFailed(String),

    /// Too few tokens for the required parameters, or leftover tokens when
    /// extra arguments are not ignored.
    #[error("bad argument count: {0}")]
    BadArgCount(String),

    /// A type reader could not convert a token to the declared type.
    #[error("could not cast {input:?} to {target}")]
    CastFailed {
        /// The offending token.
        input: String,
        /// Display name of the target type.
        target: String,
    },

    /// A type reader found no candidate for the token.
    #[error("no object matching {input:?} was found")]
    ObjectNotFound {
        /// The offending token.
        input: String,
    },

    /// A type reader returned several candidates and the multi-match policy
    /// forbids picking one.
    #[error("multiple objects matched {input:?}")]
    MultipleMatches {
        /// The offending token.
        input: String,
    },

    /// A module- or command-level precondition rejected the caller.
    #[error("precondition failed: {0}")]
    BadPermissions(String),

    /// The handler itself returned an error.
    #[error("command handler failed: {0}")]
    Exception(#[source] anyhow::Error),
}

impl CommandError {
    /// Short machine-readable name of the variant, for logging and events.
    pub fn kind(&self) -> &'static str {
        match self {
            CommandError::UnknownCommand => "unknown_command",
            CommandError::ParseFailed(_) => "parse_failed",
            CommandError::BadArgCount(_) => "bad_arg_count",
            CommandError::CastFailed { .. } => "cast_failed",
            CommandError::ObjectNotFound { .. } => "object_not_found",
            CommandError::MultipleMatches { .. } => "multiple_matches",
            CommandError::BadPermissions(_) => "bad_permissions",
            CommandError::Exception(_) => "exception",
        }
    }
}

/// Fatal failures raised while building and registering a module.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// A command with the same canonical path and the same arity is already
    /// registered. Distinct arities at one path are legal overloads.
    #[error("a command with {arity} parameter(s) is already registered at {path:?}")]
    DuplicatePath {
        /// Canonical path of the rejected command.
        path: String,
        /// Parameter count of the rejected command.
        arity: usize,
    },

    /// No reader is registered (globally or as a module override) for a
    /// declared parameter type.
    #[error("no type reader for {type_name} (parameter {parameter:?} of command {command:?})")]
    MissingTypeReader {
        /// Display name of the unresolvable type.
        type_name: String,
        /// Name of the parameter declaring the type.
        parameter: String,
        /// Name of the command being built.
        command: String,
    },

    /// A remainder or variadic parameter is not the last parameter, or a
    /// parameter is marked both remainder and variadic.
    #[error("parameter {parameter:?} of command {command:?} must be the last parameter")]
    InvalidVariadicPosition {
        /// Name of the offending parameter.
        parameter: String,
        /// Name of the command being built.
        command: String,
    },

    /// Two commands in the same module declare the same name with the same
    /// arity, so their handlers cannot be told apart at dispatch time.
    #[error("module {module:?} declares more than one handler named {command:?} with {arity} parameter(s)")]
    AmbiguousHandler {
        /// Path of the module declaring the duplicates.
        module: String,
        /// The shared command name.
        command: String,
        /// The shared parameter count.
        arity: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_kinds_are_distinct() {
        let errors = [
            CommandError::UnknownCommand,
            CommandError::ParseFailed("x".into()),
            CommandError::BadArgCount("x".into()),
            CommandError::CastFailed {
                input: "x".into(),
                target: "i64".into(),
            },
            CommandError::ObjectNotFound { input: "x".into() },
            CommandError::MultipleMatches { input: "x".into() },
            CommandError::BadPermissions("x".into()),
            CommandError::Exception(anyhow::anyhow!("boom")),
        ];
        let mut kinds: Vec<&str> = errors.iter().map(|e| e.kind()).collect();
        kinds.sort_unstable();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn test_build_error_messages_name_the_offender() {
        let err = BuildError::MissingTypeReader {
            type_name: "Direction".into(),
            parameter: "dir".into(),
            command: "move".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Direction"));
        assert!(msg.contains("dir"));
        assert!(msg.contains("move"));
    }
}
