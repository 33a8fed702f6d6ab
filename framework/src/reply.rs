use std::time::Duration;

use twilight_model::{
    application::command::{CommandOptionChoice, CommandOptionChoiceValue},
    channel::message::MessageFlags,
    http::interaction::{InteractionResponse, InteractionResponseType},
};
use twilight_util::builder::InteractionResponseDataBuilder;

use crate::{
    context::{CommandContext, ResponseStatus},
    Error,
};

pub(crate) const GENERIC_ERROR_MESSAGE: &str =
    ":warning: An unexpected error occurred while running this command, please try again later.";

pub(crate) fn guard_message(message: &str) -> String {
    format!(":warning: {}", message)
}

pub(crate) fn error_message(err: &dyn std::error::Error) -> String {
    format!("{}\n{}", GENERIC_ERROR_MESSAGE, err)
}

pub(crate) fn skip_message(message: &str) -> String {
    format!("This interaction was skipped for \"{}\"", message)
}

pub(crate) fn message_response(content: &str, ephemeral: bool) -> InteractionResponse {
    let mut data = InteractionResponseDataBuilder::new().content(content);
    if ephemeral {
        data = data.flags(MessageFlags::EPHEMERAL);
    }

    InteractionResponse {
        kind: InteractionResponseType::ChannelMessageWithSource,
        data: Some(data.build()),
    }
}

pub(crate) fn autocomplete_response(choices: Vec<CommandOptionChoice>) -> InteractionResponse {
    InteractionResponse {
        kind: InteractionResponseType::ApplicationCommandAutocompleteResult,
        data: Some(InteractionResponseDataBuilder::new().choices(choices).build()),
    }
}

pub(crate) const ERROR_MARKER: &str = "ERROR";
pub(crate) const SKIPPED_MARKER: &str = "SKIPPED";

/// Longest choice name the platform accepts.
const MAX_CHOICE_NAME_LENGTH: usize = 100;

/// A single choice used to tell the user an autocomplete request wasn't answered normally.
///
/// `name` is what the user sees, `marker` is sent back if they pick it anyway.
pub(crate) fn marker_choice(name: &str, marker: &str) -> CommandOptionChoice {
    CommandOptionChoice {
        name: name.chars().take(MAX_CHOICE_NAME_LENGTH).collect(),
        name_localizations: None,
        value: CommandOptionChoiceValue::String(marker.into()),
    }
}

/// Replies in whatever way the interaction's response state allows.
///
/// A deferred response is edited, retrying once after `retry_delay` since the
/// deferral may still be in flight. Otherwise an ephemeral reply is created, or
/// a followup sent when the interaction was already answered.
pub(crate) async fn conditional_reply<T>(
    ctx: &CommandContext<T>,
    content: &str,
    retry_delay: Duration,
) -> Result<(), Error> {
    let meta = &ctx.interaction.meta;

    match ctx.status() {
        ResponseStatus::Deferring | ResponseStatus::Deferred => {
            if let Err(err) = ctx.platform().update_response(meta, content).await {
                tracing::debug!(?err, "editing deferred response failed, retrying");
                tokio::time::sleep(retry_delay).await;
                ctx.platform().update_response(meta, content).await?;
            }
            ctx.state.set(ResponseStatus::Replied);
        }
        ResponseStatus::Pending => {
            ctx.platform()
                .create_response(meta, &message_response(content, true))
                .await?;
            ctx.state.set(ResponseStatus::Replied);
        }
        ResponseStatus::Replied => {
            ctx.platform().create_followup(meta, content, true).await?;
        }
    }

    Ok(())
}
