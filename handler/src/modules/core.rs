use switchboard_framework::{
    handler_func, AutocompleteValue, Error, FrameworkError, HandlerBuilder as _, ModuleBuilder,
    Node, SlashCommandBuilder, SlashOption,
};
use twilight_model::application::{
    command::{CommandOptionChoice, CommandOptionChoiceValue},
    interaction::application_command::CommandOptionValue,
};
use twilight_util::builder::command::StringBuilder;

use crate::context::{AutocompleteContext, CommandContext, Services};

// platform limit on autocomplete results
const MAX_CHOICES: usize = 25;

pub(crate) fn build() -> Result<Node<Services>, FrameworkError> {
    Ok(ModuleBuilder::<Services>::new("core")
        .child(
            SlashCommandBuilder::new("ping", "Check whether the bot is responding")
                .run(handler_func!(cmd_ping))
                .build()?,
        )
        .child(
            SlashCommandBuilder::new("echo", "Repeat a message back")
                .option(SlashOption::autocomplete(
                    StringBuilder::new("text", "What to repeat")
                        .required(true)
                        .build(),
                    handler_func!(complete_text),
                ))
                .run(handler_func!(cmd_echo))
                .build()?,
        )
        .child(
            SlashCommandBuilder::new("modules", "List loaded modules")
                .run(handler_func!(cmd_modules))
                .build()?,
        )
        .into())
}

async fn cmd_ping(ctx: CommandContext) -> Result<(), Error> {
    ctx.reply("Pong!").await
}

async fn cmd_echo(ctx: CommandContext) -> Result<(), Error> {
    let Some(CommandOptionValue::String(text)) = ctx.option("text") else {
        return Err("missing text option".into());
    };

    ctx.reply(text.clone()).await
}

async fn cmd_modules(ctx: CommandContext) -> Result<(), Error> {
    let names = ctx.client.module_names();
    ctx.reply_ephemeral(format!("**Loaded modules:** {}", names.join(", ")))
        .await
}

async fn complete_text(ctx: AutocompleteContext) -> Result<Vec<CommandOptionChoice>, Error> {
    let AutocompleteValue::String(text) = &ctx.value else {
        return Ok(Vec::new());
    };

    Ok(suggestions(text)
        .into_iter()
        .map(|suggestion| CommandOptionChoice {
            name: suggestion.clone(),
            name_localizations: None,
            value: CommandOptionChoiceValue::String(suggestion),
        })
        .collect())
}

fn suggestions(text: &str) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let mut result: Vec<String> = Vec::new();
    for candidate in [
        text.to_string(),
        text.to_uppercase(),
        text.to_lowercase(),
        text.chars().rev().collect(),
    ] {
        if !result.contains(&candidate) {
            result.push(candidate);
        }
    }
    result.truncate(MAX_CHOICES);

    result
}
