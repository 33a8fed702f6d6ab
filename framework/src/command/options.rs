use std::{collections::HashMap, sync::Arc};

use twilight_model::application::command::{CommandOption, CommandOptionType};

use super::{
    slash::{Subcommand, SubcommandGroup},
    AutocompleteOption,
};
use crate::{error::FrameworkError, handler::AutocompleteFunc, module::Node};

/// A declared option of a slash command, group or subcommand.
pub enum SlashOption<T> {
    Value(CommandOption),
    /// A value option answered by a dedicated autocomplete handler.
    Autocomplete(CommandOption, AutocompleteFunc<T>),
    Subcommand(Subcommand<T>),
    Group(SubcommandGroup<T>),
}

impl<T> SlashOption<T> {
    pub fn autocomplete(option: CommandOption, func: AutocompleteFunc<T>) -> Self {
        Self::Autocomplete(option, func)
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Value(option) | Self::Autocomplete(option, _) => &option.name,
            Self::Subcommand(subcommand) => &subcommand.module.name,
            Self::Group(group) => &group.module.name,
        }
    }
}

impl<T> From<CommandOption> for SlashOption<T> {
    fn from(option: CommandOption) -> Self {
        Self::Value(option)
    }
}

impl<T> From<Subcommand<T>> for SlashOption<T> {
    fn from(subcommand: Subcommand<T>) -> Self {
        Self::Subcommand(subcommand)
    }
}

impl<T> From<SubcommandGroup<T>> for SlashOption<T> {
    fn from(group: SubcommandGroup<T>) -> Self {
        Self::Group(group)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Level {
    Command,
    Group,
    Subcommand,
}

/// The four indices built from a declared option list, plus the nested nodes in declaration order.
pub(crate) struct OptionTree<T> {
    pub(crate) options: Vec<CommandOption>,
    pub(crate) subcommands: HashMap<String, Arc<Subcommand<T>>>,
    pub(crate) groups: HashMap<String, Arc<SubcommandGroup<T>>>,
    pub(crate) autocomplete: HashMap<String, AutocompleteOption<T>>,
    pub(crate) children: Vec<Node<T>>,
}

impl<T> OptionTree<T> {
    pub(crate) fn parse(
        owner: &str,
        level: Level,
        declared: Vec<SlashOption<T>>,
    ) -> Result<Self, FrameworkError> {
        let mut tree = Self {
            options: Vec::with_capacity(declared.len()),
            subcommands: HashMap::new(),
            groups: HashMap::new(),
            autocomplete: HashMap::new(),
            children: Vec::new(),
        };
        let mut has_values = false;
        let mut has_nested = false;

        for option in declared {
            let name = option.name().to_string();
            let invalid = |reason: &'static str| FrameworkError::InvalidOption {
                owner: owner.to_string(),
                option: name.clone(),
                reason,
            };

            match option {
                SlashOption::Value(option) => {
                    check_value(level, &option).map_err(invalid)?;
                    has_values = true;
                    tree.options.push(option);
                }
                SlashOption::Autocomplete(mut option, handler) => {
                    check_value(level, &option).map_err(invalid)?;
                    if !matches!(
                        option.kind,
                        CommandOptionType::String
                            | CommandOptionType::Integer
                            | CommandOptionType::Number
                    ) {
                        return Err(invalid(
                            "autocomplete is only supported on string, integer and number options",
                        ));
                    }

                    option.autocomplete = Some(true);
                    tree.autocomplete.insert(
                        name.clone(),
                        AutocompleteOption {
                            kind: option.kind,
                            handler,
                        },
                    );
                    has_values = true;
                    tree.options.push(option);
                }
                SlashOption::Subcommand(subcommand) => {
                    if level == Level::Subcommand {
                        return Err(invalid("subcommands can only contain value options"));
                    }

                    let subcommand = Arc::new(subcommand);
                    has_nested = true;
                    tree.options.push(subcommand.definition.clone());
                    tree.subcommands
                        .insert(name.clone(), Arc::clone(&subcommand));
                    tree.children.push(Node::Subcommand(subcommand));
                }
                SlashOption::Group(group) => {
                    match level {
                        Level::Command => {}
                        Level::Group => return Err(invalid("groups can only contain subcommands")),
                        Level::Subcommand => {
                            return Err(invalid("subcommands can only contain value options"))
                        }
                    }

                    let group = Arc::new(group);
                    has_nested = true;
                    tree.options.push(group.definition.clone());
                    tree.groups.insert(name.clone(), Arc::clone(&group));
                    tree.children.push(Node::Group(group));
                }
            }

            if has_values && has_nested {
                return Err(invalid(
                    "value options can't be mixed with subcommands or groups",
                ));
            }
        }

        Ok(tree)
    }
}

fn check_value(level: Level, option: &CommandOption) -> Result<(), &'static str> {
    if matches!(
        option.kind,
        CommandOptionType::SubCommand | CommandOptionType::SubCommandGroup
    ) {
        return Err(
            "raw subcommand definitions aren't supported, build a Subcommand or SubcommandGroup",
        );
    }
    if level == Level::Group {
        return Err("groups can only contain subcommands");
    }

    Ok(())
}
