use std::{collections::HashMap, sync::Arc};

use twilight_model::{
    application::command::{Command as CommandDefinition, CommandOption, CommandType},
    guild::Permissions,
    id::{marker::GuildMarker, Id},
};
use twilight_util::builder::command::{CommandBuilder, SubCommandBuilder, SubCommandGroupBuilder};

use super::{
    options::{Level, OptionTree, SlashOption},
    AutocompleteOption, Autocompleteable, Runnable,
};
use crate::{
    error::FrameworkError,
    events::RUN,
    handler::{noop, Handler, HandlerBuilder, HandlerMap},
    interaction::{AutocompleteRequest, CommandInvocation},
    module::{Module, Node},
};

pub struct SlashCommand<T> {
    pub(crate) module: Module<T>,
    pub(crate) definition: CommandDefinition,
    pub(crate) register_only_in_guilds: Option<Vec<Id<GuildMarker>>>,
    pub(crate) subcommands: HashMap<String, Arc<Subcommand<T>>>,
    pub(crate) groups: HashMap<String, Arc<SubcommandGroup<T>>>,
    pub(crate) autocomplete: HashMap<String, AutocompleteOption<T>>,
}

impl<T> SlashCommand<T> {
    pub fn definition(&self) -> &CommandDefinition {
        &self.definition
    }
}

pub struct SubcommandGroup<T> {
    pub(crate) module: Module<T>,
    pub(crate) definition: CommandOption,
    pub(crate) subcommands: HashMap<String, Arc<Subcommand<T>>>,
    pub(crate) autocomplete: HashMap<String, AutocompleteOption<T>>,
}

pub struct Subcommand<T> {
    pub(crate) module: Module<T>,
    pub(crate) definition: CommandOption,
    pub(crate) autocomplete: HashMap<String, AutocompleteOption<T>>,
}

impl<T: 'static> Runnable<T> for SlashCommand<T> {
    fn module(&self) -> &Module<T> {
        &self.module
    }

    fn route(
        &self,
        interaction: &CommandInvocation,
    ) -> Result<Option<Arc<dyn Runnable<T>>>, FrameworkError> {
        if let Some(group) = &interaction.group {
            return match self.groups.get(group) {
                Some(found) => Ok(Some(Arc::clone(found) as Arc<dyn Runnable<T>>)),
                None => Err(FrameworkError::UnknownGroup {
                    command: self.module.name.clone(),
                    group: group.clone(),
                }),
            };
        }

        if let Some(subcommand) = &interaction.subcommand {
            return match self.subcommands.get(subcommand) {
                Some(found) => Ok(Some(Arc::clone(found) as Arc<dyn Runnable<T>>)),
                None => Err(FrameworkError::UnknownSubcommand {
                    parent: self.module.name.clone(),
                    subcommand: subcommand.clone(),
                }),
            };
        }

        Ok(None)
    }
}

impl<T: 'static> Runnable<T> for SubcommandGroup<T> {
    fn module(&self) -> &Module<T> {
        &self.module
    }

    fn route(
        &self,
        interaction: &CommandInvocation,
    ) -> Result<Option<Arc<dyn Runnable<T>>>, FrameworkError> {
        let Some(subcommand) = &interaction.subcommand else {
            return Ok(None);
        };

        match self.subcommands.get(subcommand) {
            Some(found) => Ok(Some(Arc::clone(found) as Arc<dyn Runnable<T>>)),
            None => Err(FrameworkError::UnknownSubcommand {
                parent: self.module.name.clone(),
                subcommand: subcommand.clone(),
            }),
        }
    }
}

impl<T: 'static> Runnable<T> for Subcommand<T> {
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

impl<T: 'static> Autocompleteable<T> for SlashCommand<T> {
    fn module(&self) -> &Module<T> {
        &self.module
    }

    fn autocomplete_options(&self) -> &HashMap<String, AutocompleteOption<T>> {
        &self.autocomplete
    }

    fn delegate(&self, request: &AutocompleteRequest) -> Option<Arc<dyn Autocompleteable<T>>> {
        // an unknown group falls through to the subcommand and local lookups
        if let Some(group) = request.group.as_ref().and_then(|g| self.groups.get(g)) {
            return Some(Arc::clone(group) as Arc<dyn Autocompleteable<T>>);
        }

        request
            .subcommand
            .as_ref()
            .and_then(|name| self.subcommands.get(name))
            .map(|subcommand| Arc::clone(subcommand) as Arc<dyn Autocompleteable<T>>)
    }
}

impl<T: 'static> Autocompleteable<T> for SubcommandGroup<T> {
    fn module(&self) -> &Module<T> {
        &self.module
    }

    fn autocomplete_options(&self) -> &HashMap<String, AutocompleteOption<T>> {
        // always empty, groups only hold subcommands
        &self.autocomplete
    }

    fn delegate(&self, request: &AutocompleteRequest) -> Option<Arc<dyn Autocompleteable<T>>> {
        request
            .subcommand
            .as_ref()
            .and_then(|name| self.subcommands.get(name))
            .map(|subcommand| Arc::clone(subcommand) as Arc<dyn Autocompleteable<T>>)
    }
}

impl<T: 'static> Autocompleteable<T> for Subcommand<T> {
    fn module(&self) -> &Module<T> {
        &self.module
    }

    fn autocomplete_options(&self) -> &HashMap<String, AutocompleteOption<T>> {
        &self.autocomplete
    }

    fn delegate(&self, _request: &AutocompleteRequest) -> Option<Arc<dyn Autocompleteable<T>>> {
        None
    }
}

pub struct SlashCommandBuilder<T> {
    name: String,
    description: String,
    default_member_permissions: Option<Permissions>,
    dm_permission: Option<bool>,
    register_only_in_guilds: Option<Vec<Id<GuildMarker>>>,
    options: Vec<SlashOption<T>>,
    handlers: HandlerMap<T>,
    children: Vec<Node<T>>,
}

impl<T> SlashCommandBuilder<T> {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            default_member_permissions: None,
            dm_permission: None,
            register_only_in_guilds: None,
            options: Vec::new(),
            handlers: HandlerMap::new(),
            children: Vec::new(),
        }
    }

    pub fn default_member_permissions(mut self, permissions: Permissions) -> Self {
        self.default_member_permissions = Some(permissions);
        self
    }

    pub fn dm_permission(mut self, dm_permission: bool) -> Self {
        self.dm_permission = Some(dm_permission);
        self
    }

    /// Only register this command in the given guilds, an empty list means nowhere.
    pub fn register_only_in_guilds(
        mut self,
        guilds: impl IntoIterator<Item = Id<GuildMarker>>,
    ) -> Self {
        self.register_only_in_guilds = Some(guilds.into_iter().collect());
        self
    }

    pub fn option(mut self, option: impl Into<SlashOption<T>>) -> Self {
        self.options.push(option.into());
        self
    }

    pub fn build(self) -> Result<SlashCommand<T>, FrameworkError> {
        let tree = OptionTree::parse(&self.name, Level::Command, self.options)?;

        let mut handlers = self.handlers;
        if !handlers.contains(RUN) {
            if tree.subcommands.is_empty() && tree.groups.is_empty() {
                return Err(FrameworkError::MissingRunHandler(self.name));
            }
            handlers.insert(RUN, Handler::Run(noop));
        }

        let mut builder = CommandBuilder::new(
            self.name.clone(),
            self.description,
            CommandType::ChatInput,
        );
        if let Some(permissions) = self.default_member_permissions {
            builder = builder.default_member_permissions(permissions);
        }
        if let Some(dm_permission) = self.dm_permission {
            builder = builder.dm_permission(dm_permission);
        }
        let mut definition = builder.build();
        definition.options = tree.options;

        let mut children = tree.children;
        children.extend(self.children);

        Ok(SlashCommand {
            module: Module {
                name: self.name,
                handlers,
                children,
            },
            definition,
            register_only_in_guilds: self.register_only_in_guilds,
            subcommands: tree.subcommands,
            groups: tree.groups,
            autocomplete: tree.autocomplete,
        })
    }
}

impl<T> HandlerBuilder<T> for SlashCommandBuilder<T> {
    fn handler_map(&mut self) -> &mut HandlerMap<T> {
        &mut self.handlers
    }

    fn child_nodes(&mut self) -> &mut Vec<Node<T>> {
        &mut self.children
    }
}

pub struct SubcommandGroupBuilder<T> {
    name: String,
    description: String,
    options: Vec<SlashOption<T>>,
    handlers: HandlerMap<T>,
    children: Vec<Node<T>>,
}

impl<T> SubcommandGroupBuilder<T> {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            options: Vec::new(),
            handlers: HandlerMap::new(),
            children: Vec::new(),
        }
    }

    pub fn option(mut self, option: impl Into<SlashOption<T>>) -> Self {
        self.options.push(option.into());
        self
    }

    pub fn build(self) -> Result<SubcommandGroup<T>, FrameworkError> {
        let tree = OptionTree::parse(&self.name, Level::Group, self.options)?;

        let mut handlers = self.handlers;
        if !handlers.contains(RUN) {
            handlers.insert(RUN, Handler::Run(noop));
        }

        let mut definition =
            SubCommandGroupBuilder::new(self.name.clone(), self.description).build();
        definition.options = Some(tree.options);

        let mut children = tree.children;
        children.extend(self.children);

        Ok(SubcommandGroup {
            module: Module {
                name: self.name,
                handlers,
                children,
            },
            definition,
            subcommands: tree.subcommands,
            autocomplete: tree.autocomplete,
        })
    }
}

impl<T> HandlerBuilder<T> for SubcommandGroupBuilder<T> {
    fn handler_map(&mut self) -> &mut HandlerMap<T> {
        &mut self.handlers
    }

    fn child_nodes(&mut self) -> &mut Vec<Node<T>> {
        &mut self.children
    }
}

pub struct SubcommandBuilder<T> {
    name: String,
    description: String,
    options: Vec<SlashOption<T>>,
    handlers: HandlerMap<T>,
    children: Vec<Node<T>>,
}

impl<T> SubcommandBuilder<T> {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            options: Vec::new(),
            handlers: HandlerMap::new(),
            children: Vec::new(),
        }
    }

    pub fn option(mut self, option: impl Into<SlashOption<T>>) -> Self {
        self.options.push(option.into());
        self
    }

    pub fn build(self) -> Result<Subcommand<T>, FrameworkError> {
        if !self.handlers.contains(RUN) {
            return Err(FrameworkError::MissingRunHandler(self.name));
        }

        let tree = OptionTree::parse(&self.name, Level::Subcommand, self.options)?;

        let mut definition = SubCommandBuilder::new(self.name.clone(), self.description).build();
        definition.options = Some(tree.options);

        Ok(Subcommand {
            module: Module {
                name: self.name,
                handlers: self.handlers,
                children: self.children,
            },
            definition,
            autocomplete: tree.autocomplete,
        })
    }
}

impl<T> HandlerBuilder<T> for SubcommandBuilder<T> {
    fn handler_map(&mut self) -> &mut HandlerMap<T> {
        &mut self.handlers
    }

    fn child_nodes(&mut self) -> &mut Vec<Node<T>> {
        &mut self.children
    }
}
