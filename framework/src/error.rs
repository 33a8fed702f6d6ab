use std::fmt;

use thiserror::Error;
use twilight_model::application::command::CommandOptionType;

/// Errors raised by the framework itself, as opposed to errors returned by handlers.
#[derive(Debug, Error)]
pub enum FrameworkError {
    #[error("unknown event '{key}' while processing {module}")]
    UnknownHandlerKey { module: String, key: String },

    #[error("event '{key}' on {module} can't be used as a {expected} handler")]
    HandlerKindMismatch {
        module: String,
        key: String,
        expected: &'static str,
    },

    #[error("no run handler provided for '{0}', either provide a run handler or use subcommands/subcommand groups")]
    MissingRunHandler(String),

    #[error("invalid option '{option}' for '{owner}': {reason}")]
    InvalidOption {
        owner: String,
        option: String,
        reason: &'static str,
    },

    #[error("unknown group '{group}' for command '{command}'")]
    UnknownGroup { command: String, group: String },

    #[error("unknown subcommand '{subcommand}' for '{parent}'")]
    UnknownSubcommand { parent: String, subcommand: String },

    #[error("'{module}' received {{ name: {option}, value: <{received:?}> {value} }} as an autocomplete request but expected {expected:?}")]
    AutocompleteTypeMismatch {
        module: String,
        option: String,
        value: String,
        received: CommandOptionType,
        expected: CommandOptionType,
    },

    #[error("autocomplete request for '{0}' has no focused option")]
    NoFocusedOption(String),

    #[error("error parsing interaction: {0}")]
    InvalidInteraction(String),
}

impl FrameworkError {
    /// Whether this error means the declared command tree and the one the platform knows about have drifted apart.
    pub fn is_routing_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownGroup { .. } | Self::UnknownSubcommand { .. }
        )
    }
}

/// A failed pre-run check, shown to the user verbatim instead of being reported as a bug.
///
/// ```ignore
/// if !is_moderator {
///     return Err(GuardError::new("You need to be a moderator!").into());
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardError(String);

impl GuardError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GuardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for GuardError {}
