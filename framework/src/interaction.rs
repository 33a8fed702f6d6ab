use twilight_model::{
    application::{
        command::{CommandOptionType, CommandType},
        interaction::{
            application_command::{CommandDataOption, CommandOptionValue},
            Interaction, InteractionData, InteractionType,
        },
    },
    guild::Permissions,
    id::{
        marker::{GenericMarker, GuildMarker, InteractionMarker, UserMarker},
        Id,
    },
};

use crate::error::FrameworkError;

/// What's needed to answer an interaction, plus who sent it and where.
#[derive(Clone, Debug)]
pub struct InteractionMeta {
    pub id: Id<InteractionMarker>,
    pub token: String,
    pub guild_id: Option<Id<GuildMarker>>,
    pub user_id: Option<Id<UserMarker>>,
    pub member_permissions: Option<Permissions>,
}

/// A slash command or context-menu invocation, with the subcommand route already resolved.
#[derive(Clone, Debug)]
pub struct CommandInvocation {
    pub meta: InteractionMeta,
    pub name: String,
    pub kind: CommandType,
    pub group: Option<String>,
    pub subcommand: Option<String>,
    /// Options of the leaf that's being invoked.
    pub options: Vec<CommandDataOption>,
    /// Target user or message for context-menu commands.
    pub target_id: Option<Id<GenericMarker>>,
}

impl CommandInvocation {
    pub fn option(&self, name: &str) -> Option<&CommandOptionValue> {
        self.options
            .iter()
            .find(|opt| opt.name == name)
            .map(|opt| &opt.value)
    }
}

#[derive(Clone, Debug)]
pub struct AutocompleteRequest {
    pub meta: InteractionMeta,
    pub name: String,
    pub group: Option<String>,
    pub subcommand: Option<String>,
    pub options: Vec<CommandDataOption>,
}

/// The option the user is typing in, with its raw value and the type the platform reported.
#[derive(Clone, Debug, PartialEq)]
pub struct Focused<'a> {
    pub name: &'a str,
    pub value: &'a str,
    pub kind: CommandOptionType,
}

impl AutocompleteRequest {
    pub fn focused(&self) -> Option<Focused<'_>> {
        self.options.iter().find_map(|opt| match &opt.value {
            CommandOptionValue::Focused(value, kind) => Some(Focused {
                name: &opt.name,
                value,
                kind: *kind,
            }),
            _ => None,
        })
    }
}

#[derive(Clone, Debug)]
pub enum IncomingInteraction {
    Command(CommandInvocation),
    Autocomplete(AutocompleteRequest),
}

/// Converts a platform interaction into something the engine routes, `None` for
/// interaction types it doesn't handle (components, modals, pings).
pub fn parse(interaction: &Interaction) -> Result<Option<IncomingInteraction>, FrameworkError> {
    if !matches!(
        interaction.kind,
        InteractionType::ApplicationCommand | InteractionType::ApplicationCommandAutocomplete
    ) {
        return Ok(None);
    }

    let Some(InteractionData::ApplicationCommand(data)) = &interaction.data else {
        return Err(FrameworkError::InvalidInteraction(format!(
            "no command data for {:?} interaction",
            interaction.kind
        )));
    };

    let meta = InteractionMeta {
        id: interaction.id,
        token: interaction.token.clone(),
        guild_id: interaction.guild_id,
        user_id: interaction.author_id(),
        member_permissions: interaction
            .member
            .as_ref()
            .and_then(|member| member.permissions),
    };
    let (group, subcommand, options) = route(&data.options);

    Ok(Some(match interaction.kind {
        InteractionType::ApplicationCommandAutocomplete => {
            IncomingInteraction::Autocomplete(AutocompleteRequest {
                meta,
                name: data.name.clone(),
                group,
                subcommand,
                options,
            })
        }
        _ => IncomingInteraction::Command(CommandInvocation {
            meta,
            name: data.name.clone(),
            kind: data.kind,
            group,
            subcommand,
            options,
            target_id: data.target_id,
        }),
    }))
}

/// Splits nested options into (group, subcommand, leaf options).
pub(crate) fn route(
    options: &[CommandDataOption],
) -> (Option<String>, Option<String>, Vec<CommandDataOption>) {
    match options.first() {
        Some(CommandDataOption {
            name,
            value: CommandOptionValue::SubCommandGroup(inner),
        }) => {
            let (_, subcommand, leaf) = route(inner);
            (Some(name.clone()), subcommand, leaf)
        }
        Some(CommandDataOption {
            name,
            value: CommandOptionValue::SubCommand(inner),
        }) => (None, Some(name.clone()), inner.clone()),
        _ => (None, None, options.to_vec()),
    }
}
