use std::sync::Arc;

pub use client::{Client, ClientOptions, PutCommandOptions, ScopeOutcome};
pub use command::{
    ContextMenuCommand, ContextMenuCommandBuilder, SlashCommand, SlashCommandBuilder, SlashOption,
    Subcommand, SubcommandBuilder, SubcommandGroup, SubcommandGroupBuilder,
};
pub use context::{
    AutocompleteContext, AutocompleteValue, CommandContext, Context, EventContext, ResponseStatus,
    SkipContext,
};
pub use error::{FrameworkError, GuardError};
pub use events::{EventDetails, EventPayload, LifecycleEvent, SkipReason};
pub use execution::{current_module, ModuleHandle};
pub use handler::{BoxFuture, HandlerBuilder};
pub use module::{Command, Module, ModuleBuilder, Node};
pub use platform::{CommandScope, HttpPlatform, Platform};

pub mod client;
pub mod command;
pub mod context;
pub mod error;
pub mod events;
pub mod execution;
pub mod guards;
pub mod handler;
pub mod interaction;
pub mod macros;
pub mod module;
pub mod platform;
mod registry;
mod reply;

pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// An [`Error`] that can be handed to several listeners.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync>;
