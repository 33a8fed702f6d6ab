//! Common pre-run checks, return their error from a `run` handler to stop the command.

use twilight_model::{
    guild::Permissions,
    id::{marker::GuildMarker, Id},
};

use crate::{error::GuardError, interaction::InteractionMeta};

/// Passes when the interaction was sent from a guild.
pub fn in_guild(meta: &InteractionMeta) -> Result<Id<GuildMarker>, GuardError> {
    meta.guild_id
        .ok_or_else(|| GuardError::new("This command can only be used in a server."))
}

/// Passes when the invoking member has every permission in `required`, administrators always pass.
pub fn has_permissions(meta: &InteractionMeta, required: Permissions) -> Result<(), GuardError> {
    in_guild(meta)?;

    let granted = meta.member_permissions.unwrap_or_else(Permissions::empty);
    if granted.contains(Permissions::ADMINISTRATOR) {
        return Ok(());
    }

    let missing = required.difference(granted);
    if missing.is_empty() {
        return Ok(());
    }

    let names: Vec<&str> = missing.iter_names().map(|(name, _)| name).collect();
    Err(GuardError::new(format!(
        "You need the following permissions to use this command: {}",
        names.join(", ")
    )))
}
