use switchboard_framework::{
    guards, handler_func, ContextMenuCommandBuilder, Error, FrameworkError,
    HandlerBuilder as _, ModuleBuilder, Node, SlashCommandBuilder, SubcommandBuilder,
    SubcommandGroupBuilder,
};
use twilight_model::{
    application::interaction::application_command::CommandOptionValue,
    guild::Permissions,
    id::marker::UserMarker,
};
use twilight_util::builder::command::{StringBuilder, UserBuilder};

use crate::context::{CommandContext, Services};

pub(crate) fn build() -> Result<Node<Services>, FrameworkError> {
    let kick = SubcommandBuilder::new("kick", "Kick a member from this server")
        .option(
            UserBuilder::new("user", "The member to kick")
                .required(true)
                .build(),
        )
        .option(StringBuilder::new("reason", "Why they're being kicked").build())
        .run(handler_func!(cmd_kick))
        .build()?;

    let admin = SubcommandGroupBuilder::new("admin", "Member administration")
        .option(kick)
        .run(handler_func!(require_guild))
        .build()?;

    Ok(ModuleBuilder::<Services>::new("moderation")
        .child(
            SlashCommandBuilder::new("user", "Commands acting on server members")
                .default_member_permissions(Permissions::KICK_MEMBERS)
                .dm_permission(false)
                .option(admin)
                .build()?,
        )
        .child(
            ContextMenuCommandBuilder::user("User Info")
                .run(handler_func!(cmd_user_info))
                .build()?,
        )
        .into())
}

/// Runs before every `admin` subcommand, a guard error here stops the subcommand.
async fn require_guild(ctx: CommandContext) -> Result<(), Error> {
    guards::in_guild(&ctx.interaction.meta)?;
    Ok(())
}

async fn cmd_kick(ctx: CommandContext) -> Result<(), Error> {
    let guild_id = guards::in_guild(&ctx.interaction.meta)?;
    guards::has_permissions(&ctx.interaction.meta, Permissions::KICK_MEMBERS)?;

    let Some(CommandOptionValue::User(user_id)) = ctx.option("user") else {
        return Err("missing user option".into());
    };
    let user_id = *user_id;
    let reason = match ctx.option("reason") {
        Some(CommandOptionValue::String(reason)) => reason.clone(),
        _ => "no reason given".to_string(),
    };

    ctx.defer().await?;

    tracing::info!(%guild_id, %user_id, reason = %reason, "kicking member");
    ctx.services
        .http
        .remove_guild_member(guild_id, user_id)
        .await?;

    ctx.update_response(&format!("Kicked <@{}> ({})", user_id, reason))
        .await
}

async fn cmd_user_info(ctx: CommandContext) -> Result<(), Error> {
    let Some(target_id) = ctx.interaction.target_id else {
        return Err("user command without a target".into());
    };
    let user_id = target_id.cast::<UserMarker>();

    ctx.reply_ephemeral(format!(
        "<@{}>\nid: `{}`\ncreated: <t:{}:R>",
        user_id,
        user_id,
        snowflake_timestamp(user_id.get()) / 1000
    ))
    .await
}

/// Millisecond unix timestamp encoded in a snowflake.
fn snowflake_timestamp(snowflake: u64) -> u64 {
    const DISCORD_EPOCH: u64 = 1_420_070_400_000;
    (snowflake >> 22) + DISCORD_EPOCH
}
