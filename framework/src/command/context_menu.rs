use std::sync::Arc;

use twilight_model::{
    application::command::{Command as CommandDefinition, CommandType},
    guild::Permissions,
    id::{marker::GuildMarker, Id},
};
use twilight_util::builder::command::CommandBuilder;

use super::Runnable;
use crate::{
    error::FrameworkError,
    events::RUN,
    handler::{HandlerBuilder, HandlerMap},
    interaction::CommandInvocation,
    module::{Module, Node},
};

/// A user or message context-menu command, its `run` gets the target through
/// [`CommandInvocation::target_id`].
pub struct ContextMenuCommand<T> {
    pub(crate) module: Module<T>,
    pub(crate) kind: CommandType,
    pub(crate) definition: CommandDefinition,
    pub(crate) register_only_in_guilds: Option<Vec<Id<GuildMarker>>>,
}

impl<T> ContextMenuCommand<T> {
    pub fn kind(&self) -> CommandType {
        self.kind
    }

    pub fn definition(&self) -> &CommandDefinition {
        &self.definition
    }
}

impl<T: 'static> Runnable<T> for ContextMenuCommand<T> {
    fn module(&self) -> &Module<T> {
        &self.module
    }

    fn route(
        &self,
        _interaction: &CommandInvocation,
    ) -> Result<Option<Arc<dyn Runnable<T>>>, FrameworkError> {
        Ok(None)
    }
}

pub struct ContextMenuCommandBuilder<T> {
    name: String,
    kind: CommandType,
    default_member_permissions: Option<Permissions>,
    dm_permission: Option<bool>,
    register_only_in_guilds: Option<Vec<Id<GuildMarker>>>,
    handlers: HandlerMap<T>,
    children: Vec<Node<T>>,
}

impl<T> ContextMenuCommandBuilder<T> {
    fn new(name: &str, kind: CommandType) -> Self {
        Self {
            name: name.into(),
            kind,
            default_member_permissions: None,
            dm_permission: None,
            register_only_in_guilds: None,
            handlers: HandlerMap::new(),
            children: Vec::new(),
        }
    }

    pub fn user(name: &str) -> Self {
        Self::new(name, CommandType::User)
    }

    pub fn message(name: &str) -> Self {
        Self::new(name, CommandType::Message)
    }

    pub fn default_member_permissions(mut self, permissions: Permissions) -> Self {
        self.default_member_permissions = Some(permissions);
        self
    }

    pub fn dm_permission(mut self, dm_permission: bool) -> Self {
        self.dm_permission = Some(dm_permission);
        self
    }

    pub fn register_only_in_guilds(
        mut self,
        guilds: impl IntoIterator<Item = Id<GuildMarker>>,
    ) -> Self {
        self.register_only_in_guilds = Some(guilds.into_iter().collect());
        self
    }

    pub fn build(self) -> Result<ContextMenuCommand<T>, FrameworkError> {
        if !self.handlers.contains(RUN) {
            return Err(FrameworkError::MissingRunHandler(self.name));
        }

        // context menu commands can't have a description
        let mut builder = CommandBuilder::new(self.name.clone(), "", self.kind);
        if let Some(permissions) = self.default_member_permissions {
            builder = builder.default_member_permissions(permissions);
        }
        if let Some(dm_permission) = self.dm_permission {
            builder = builder.dm_permission(dm_permission);
        }

        Ok(ContextMenuCommand {
            module: Module {
                name: self.name,
                handlers: self.handlers,
                children: self.children,
            },
            kind: self.kind,
            definition: builder.build(),
            register_only_in_guilds: self.register_only_in_guilds,
        })
    }
}

impl<T> HandlerBuilder<T> for ContextMenuCommandBuilder<T> {
    fn handler_map(&mut self) -> &mut HandlerMap<T> {
        &mut self.handlers
    }

    fn child_nodes(&mut self) -> &mut Vec<Node<T>> {
        &mut self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{context::CommandContext, handler_func, module::Command, Error};

    async fn run(_ctx: CommandContext<()>) -> Result<(), Error> {
        Ok(())
    }

    #[test]
    fn context_menu_kind_test() {
        let user: Command<()> = ContextMenuCommandBuilder::user("Inspect")
            .run(handler_func!(run))
            .build()
            .expect("valid command")
            .into();
        let message: Command<()> = ContextMenuCommandBuilder::message("Quote")
            .run(handler_func!(run))
            .build()
            .expect("valid command")
            .into();

        assert!(matches!(user, Command::User(_)));
        assert!(user.accepts(CommandType::User));
        assert!(!user.accepts(CommandType::ChatInput));
        assert_eq!(user.definition().kind, CommandType::User);
        assert!(matches!(message, Command::Message(_)));
        assert_eq!(message.definition().description, "");
    }

    #[test]
    fn context_menu_requires_run_test() {
        assert!(ContextMenuCommandBuilder::<()>::user("Inspect")
            .build()
            .is_err());
    }
}
