use std::sync::Arc;

use twilight_model::{
    application::command::{Command as CommandDefinition, CommandType},
    id::{marker::GuildMarker, Id},
};

use crate::{
    command::{
        context_menu::ContextMenuCommand,
        slash::{SlashCommand, Subcommand, SubcommandGroup},
        Autocompleteable, Runnable,
    },
    handler::HandlerMap,
};

pub mod builder;

pub use builder::ModuleBuilder;

/// A named node in the handler tree, the unit of registration and teardown.
pub struct Module<T> {
    pub(crate) name: String,
    pub(crate) handlers: HandlerMap<T>,
    pub(crate) children: Vec<Node<T>>,
}

impl<T> Module<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handlers(&self) -> &HandlerMap<T> {
        &self.handlers
    }

    pub fn children(&self) -> &[Node<T>] {
        &self.children
    }
}

/// Anything that can be registered with the client.
pub enum Node<T> {
    Module(Arc<Module<T>>),
    Command(Command<T>),
    Group(Arc<SubcommandGroup<T>>),
    Subcommand(Arc<Subcommand<T>>),
}

impl<T> Node<T> {
    pub fn module(&self) -> &Module<T> {
        match self {
            Self::Module(module) => module,
            Self::Command(command) => command.module(),
            Self::Group(group) => &group.module,
            Self::Subcommand(subcommand) => &subcommand.module,
        }
    }

    pub fn name(&self) -> &str {
        self.module().name()
    }

    pub fn children(&self) -> &[Node<T>] {
        self.module().children()
    }

    pub fn as_command(&self) -> Option<&Command<T>> {
        match self {
            Self::Command(command) => Some(command),
            _ => None,
        }
    }
}

impl<T> Clone for Node<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Module(module) => Self::Module(Arc::clone(module)),
            Self::Command(command) => Self::Command(command.clone()),
            Self::Group(group) => Self::Group(Arc::clone(group)),
            Self::Subcommand(subcommand) => Self::Subcommand(Arc::clone(subcommand)),
        }
    }
}

impl<T> From<Module<T>> for Node<T> {
    fn from(module: Module<T>) -> Self {
        Self::Module(Arc::new(module))
    }
}

impl<T> From<Command<T>> for Node<T> {
    fn from(command: Command<T>) -> Self {
        Self::Command(command)
    }
}

impl<T> From<SlashCommand<T>> for Node<T> {
    fn from(command: SlashCommand<T>) -> Self {
        Self::Command(Command::Slash(Arc::new(command)))
    }
}

impl<T> From<ContextMenuCommand<T>> for Node<T> {
    fn from(command: ContextMenuCommand<T>) -> Self {
        Self::Command(command.into())
    }
}

impl<T> From<SubcommandGroup<T>> for Node<T> {
    fn from(group: SubcommandGroup<T>) -> Self {
        Self::Group(Arc::new(group))
    }
}

impl<T> From<Subcommand<T>> for Node<T> {
    fn from(subcommand: Subcommand<T>) -> Self {
        Self::Subcommand(Arc::new(subcommand))
    }
}

/// A top-level runnable that an incoming interaction can name.
pub enum Command<T> {
    Slash(Arc<SlashCommand<T>>),
    User(Arc<ContextMenuCommand<T>>),
    Message(Arc<ContextMenuCommand<T>>),
}

impl<T> Command<T> {
    pub fn module(&self) -> &Module<T> {
        match self {
            Self::Slash(command) => &command.module,
            Self::User(command) | Self::Message(command) => &command.module,
        }
    }

    pub fn name(&self) -> &str {
        self.module().name()
    }

    pub fn kind(&self) -> CommandType {
        match self {
            Self::Slash(_) => CommandType::ChatInput,
            Self::User(_) => CommandType::User,
            Self::Message(_) => CommandType::Message,
        }
    }

    /// Whether an invocation of `kind` can be handled by this command.
    pub fn accepts(&self, kind: CommandType) -> bool {
        self.kind() == kind
    }

    pub fn definition(&self) -> &CommandDefinition {
        match self {
            Self::Slash(command) => &command.definition,
            Self::User(command) | Self::Message(command) => &command.definition,
        }
    }

    /// Guilds this command is restricted to, `None` when it's available everywhere.
    pub fn register_only_in_guilds(&self) -> Option<&[Id<GuildMarker>]> {
        match self {
            Self::Slash(command) => command.register_only_in_guilds.as_deref(),
            Self::User(command) | Self::Message(command) => {
                command.register_only_in_guilds.as_deref()
            }
        }
    }
}

impl<T: 'static> Command<T> {
    pub(crate) fn runnable(&self) -> Arc<dyn Runnable<T>> {
        match self {
            Self::Slash(command) => Arc::clone(command) as Arc<dyn Runnable<T>>,
            Self::User(command) | Self::Message(command) => {
                Arc::clone(command) as Arc<dyn Runnable<T>>
            }
        }
    }

    pub(crate) fn autocompleteable(&self) -> Option<Arc<dyn Autocompleteable<T>>> {
        match self {
            Self::Slash(command) => Some(Arc::clone(command) as Arc<dyn Autocompleteable<T>>),
            _ => None,
        }
    }
}

impl<T> Clone for Command<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Slash(command) => Self::Slash(Arc::clone(command)),
            Self::User(command) => Self::User(Arc::clone(command)),
            Self::Message(command) => Self::Message(Arc::clone(command)),
        }
    }
}

impl<T> From<ContextMenuCommand<T>> for Command<T> {
    fn from(command: ContextMenuCommand<T>) -> Self {
        match command.kind {
            CommandType::Message => Self::Message(Arc::new(command)),
            _ => Self::User(Arc::new(command)),
        }
    }
}
