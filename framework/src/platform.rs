use std::{fmt, sync::Arc};

use async_trait::async_trait;
use twilight_http::Client as HttpClient;
use twilight_model::{
    application::command::Command as CommandDefinition,
    channel::message::MessageFlags,
    http::interaction::InteractionResponse,
    id::{
        marker::{ApplicationMarker, GuildMarker},
        Id,
    },
};

use crate::{interaction::InteractionMeta, Error};

/// Where a set of command definitions is stored on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommandScope {
    Global,
    Guild(Id<GuildMarker>),
}

impl fmt::Display for CommandScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("globally"),
            Self::Guild(guild_id) => write!(f, "in {}", guild_id),
        }
    }
}

/// The platform calls the engine makes: answering interactions and overwriting stored commands.
#[async_trait]
pub trait Platform: Send + Sync {
    async fn create_response(
        &self,
        interaction: &InteractionMeta,
        response: &InteractionResponse,
    ) -> Result<(), Error>;

    /// Edits the original (possibly deferred) response.
    async fn update_response(&self, interaction: &InteractionMeta, content: &str)
        -> Result<(), Error>;

    async fn create_followup(
        &self,
        interaction: &InteractionMeta,
        content: &str,
        ephemeral: bool,
    ) -> Result<(), Error>;

    /// Atomically replaces every command stored for `scope`.
    async fn put_commands(
        &self,
        scope: CommandScope,
        commands: &[CommandDefinition],
    ) -> Result<Vec<CommandDefinition>, Error>;
}

/// [`Platform`] over the Discord HTTP API.
#[derive(Debug, Clone)]
pub struct HttpPlatform {
    client: Arc<HttpClient>,
    application_id: Id<ApplicationMarker>,
}

impl HttpPlatform {
    pub fn new(client: Arc<HttpClient>, application_id: Id<ApplicationMarker>) -> Self {
        Self {
            client,
            application_id,
        }
    }

    pub fn client(&self) -> Arc<HttpClient> {
        Arc::clone(&self.client)
    }
}

#[async_trait]
impl Platform for HttpPlatform {
    async fn create_response(
        &self,
        interaction: &InteractionMeta,
        response: &InteractionResponse,
    ) -> Result<(), Error> {
        self.client
            .interaction(self.application_id)
            .create_response(interaction.id, &interaction.token, response)
            .await?;

        Ok(())
    }

    async fn update_response(
        &self,
        interaction: &InteractionMeta,
        content: &str,
    ) -> Result<(), Error> {
        self.client
            .interaction(self.application_id)
            .update_response(&interaction.token)
            .content(Some(content))
            .await?;

        Ok(())
    }

    async fn create_followup(
        &self,
        interaction: &InteractionMeta,
        content: &str,
        ephemeral: bool,
    ) -> Result<(), Error> {
        let interaction_client = self.client.interaction(self.application_id);
        let mut followup = interaction_client
            .create_followup(&interaction.token)
            .content(content);
        if ephemeral {
            followup = followup.flags(MessageFlags::EPHEMERAL);
        }
        followup.await?;

        Ok(())
    }

    async fn put_commands(
        &self,
        scope: CommandScope,
        commands: &[CommandDefinition],
    ) -> Result<Vec<CommandDefinition>, Error> {
        let interaction = self.client.interaction(self.application_id);
        let response = match scope {
            CommandScope::Global => interaction.set_global_commands(commands).await?,
            CommandScope::Guild(guild_id) => {
                interaction.set_guild_commands(guild_id, commands).await?
            }
        };

        Ok(response.model().await?)
    }
}
