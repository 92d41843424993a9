//! Configuration for the command service.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tiller_types::RunMode;

/// How to handle a type reader returning several ranked candidates for one
/// token (e.g. a display name resolving to more than one entity).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MultiMatchHandling {
    /// Surface `MultipleMatches` immediately.
    #[default]
    Exception,
    /// Pick the highest-scored candidate; ties go to the earliest returned.
    Best,
}

/// Configuration consumed by [`crate::CommandService`].
///
/// All fields have conservative defaults; transports typically load this
/// from their own config file and only override the prefix list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    /// Token separator between path segments and arguments.
    pub separator: char,
    /// Whether alias matching is case sensitive.
    pub case_sensitive: bool,
    /// Quotation pairs honored by the tokenizer, open character to required
    /// close character. Multiple distinct pairs may be active at once.
    pub quotes: HashMap<char, char>,
    /// Escape character honored inside and outside quotes, or `None` to
    /// disable escaping entirely.
    pub escape: Option<char>,
    /// Leading markers that identify a message as a command.
    pub prefixes: Vec<String>,
    /// Run mode applied to commands that do not declare their own.
    pub default_run_mode: RunMode,
    /// For `Sync` commands: propagate handler errors to the dispatch caller
    /// instead of converting them to error events.
    pub throw_on_error: bool,
    /// Silently drop tokens left over after all parameters are filled
    /// instead of failing with a bad argument count.
    pub ignore_extra_args: bool,
    /// Policy for readers that return several candidates.
    pub multi_match: MultiMatchHandling,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            separator: ' ',
            case_sensitive: false,
            quotes: default_quote_map(),
            escape: Some('\\'),
            prefixes: vec!["/".to_string(), ":".to_string()],
            default_run_mode: RunMode::Sync,
            throw_on_error: true,
            ignore_extra_args: false,
            multi_match: MultiMatchHandling::Exception,
        }
    }
}

impl CommandConfig {
    /// Strip the first matching command prefix, or `None` if the message is
    /// not a command.
    pub fn strip_prefix<'a>(&self, message: &'a str) -> Option<&'a str> {
        let trimmed = message.trim_start();
        self.prefixes
            .iter()
            .find_map(|p| trimmed.strip_prefix(p.as_str()))
    }

    /// The close character required by `open`, if `open` starts a quote.
    pub fn quote_close(&self, open: char) -> Option<char> {
        self.quotes.get(&open).copied()
    }
}

/// Default quotation pairs: ASCII double and single quotes plus the common
/// typographic pairs messaging clients substitute automatically.
pub fn default_quote_map() -> HashMap<char, char> {
    HashMap::from([
        ('"', '"'),
        ('\'', '\''),
        ('\u{201C}', '\u{201D}'), // “ ”
        ('\u{2018}', '\u{2019}'), // ‘ ’
        ('\u{00AB}', '\u{00BB}'), // « »
        ('\u{2039}', '\u{203A}'), // ‹ ›
        ('\u{300C}', '\u{300D}'), // 「 」
        ('\u{300E}', '\u{300F}'), // 『 』
    ])
}
