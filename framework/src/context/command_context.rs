use std::{
    ops::Deref,
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc,
    },
};

use twilight_model::{
    application::interaction::application_command::CommandOptionValue,
    channel::message::MessageFlags,
    http::interaction::{InteractionResponse, InteractionResponseType},
};
use twilight_util::builder::InteractionResponseDataBuilder;

use super::Context;
use crate::{execution::ModuleHandle, interaction::CommandInvocation, Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Pending,
    /// A deferral was sent but not acknowledged yet.
    Deferring,
    Deferred,
    Replied,
}

/// Response status of one interaction, shared by every context routed from it.
#[derive(Debug, Default)]
pub struct ResponseState(AtomicU8);

impl ResponseState {
    pub fn get(&self) -> ResponseStatus {
        match self.0.load(Ordering::Acquire) {
            0 => ResponseStatus::Pending,
            1 => ResponseStatus::Deferring,
            2 => ResponseStatus::Deferred,
            _ => ResponseStatus::Replied,
        }
    }

    pub(crate) fn set(&self, status: ResponseStatus) {
        let val = match status {
            ResponseStatus::Pending => 0,
            ResponseStatus::Deferring => 1,
            ResponseStatus::Deferred => 2,
            ResponseStatus::Replied => 3,
        };
        self.0.store(val, Ordering::Release);
    }
}

/// Passed to `run` handlers of commands, groups and subcommands.
pub struct CommandContext<T> {
    pub context: Context<T>,
    pub interaction: Arc<CommandInvocation>,
    pub(crate) state: Arc<ResponseState>,
}

impl<T> CommandContext<T> {
    pub(crate) fn new(context: Context<T>, interaction: Arc<CommandInvocation>) -> Self {
        Self {
            context,
            interaction,
            state: Arc::new(ResponseState::default()),
        }
    }

    pub fn status(&self) -> ResponseStatus {
        self.state.get()
    }

    pub fn option(&self, name: &str) -> Option<&CommandOptionValue> {
        self.interaction.option(name)
    }

    pub async fn response(&self, response: InteractionResponse) -> Result<(), Error> {
        self.platform()
            .create_response(&self.interaction.meta, &response)
            .await?;
        self.state.set(ResponseStatus::Replied);

        Ok(())
    }

    pub async fn reply(&self, message: impl Into<String>) -> Result<(), Error> {
        let response = InteractionResponseDataBuilder::new()
            .content(message)
            .build();

        self.response(InteractionResponse {
            kind: InteractionResponseType::ChannelMessageWithSource,
            data: Some(response),
        })
        .await
    }

    pub async fn reply_ephemeral(&self, message: impl Into<String>) -> Result<(), Error> {
        let response = InteractionResponseDataBuilder::new()
            .content(message)
            .flags(MessageFlags::EPHEMERAL)
            .build();

        self.response(InteractionResponse {
            kind: InteractionResponseType::ChannelMessageWithSource,
            data: Some(response),
        })
        .await
    }

    /// Acknowledges the interaction now and answers later with [`Self::update_response`].
    pub async fn defer(&self) -> Result<(), Error> {
        self.state.set(ResponseStatus::Deferring);

        let response = InteractionResponse {
            kind: InteractionResponseType::DeferredChannelMessageWithSource,
            data: None,
        };
        match self
            .platform()
            .create_response(&self.interaction.meta, &response)
            .await
        {
            Ok(()) => {
                self.state.set(ResponseStatus::Deferred);
                Ok(())
            }
            Err(err) => {
                self.state.set(ResponseStatus::Pending);
                Err(err)
            }
        }
    }

    pub async fn update_response(&self, content: &str) -> Result<(), Error> {
        self.platform()
            .update_response(&self.interaction.meta, content)
            .await?;
        self.state.set(ResponseStatus::Replied);

        Ok(())
    }
}

impl<T: Clone> CommandContext<T> {
    pub(crate) fn for_module(&self, module: ModuleHandle) -> Self {
        Self {
            context: Context {
                module,
                ..self.context.clone()
            },
            interaction: Arc::clone(&self.interaction),
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> Deref for CommandContext<T> {
    type Target = Context<T>;

    fn deref(&self) -> &Self::Target {
        &self.context
    }
}

impl<T: Clone> Clone for CommandContext<T> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
            interaction: Arc::clone(&self.interaction),
            state: Arc::clone(&self.state),
        }
    }
}
