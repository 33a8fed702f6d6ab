#![allow(dead_code)]

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use switchboard_framework::{
    handler_func,
    interaction::{AutocompleteRequest, CommandInvocation, IncomingInteraction, InteractionMeta},
    Client, ClientOptions, CommandScope, Error, EventContext, HandlerBuilder as _,
    LifecycleEvent, ModuleBuilder, Platform,
};
use twilight_model::{
    application::{
        command::{
            Command as CommandDefinition, CommandOptionChoiceValue, CommandOptionType, CommandType,
        },
        interaction::application_command::{CommandDataOption, CommandOptionValue},
    },
    channel::message::MessageFlags,
    guild::Permissions,
    http::interaction::{InteractionResponse, InteractionResponseType},
    id::Id,
};

/// Services type that records what handlers saw.
#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<String>>>);

impl Recorder {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn with_prefix(&self, prefix: &str) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.starts_with(prefix))
            .collect()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlatformCall {
    Response {
        kind: InteractionResponseType,
        content: Option<String>,
        ephemeral: bool,
        choices: Vec<String>,
    },
    Update(String),
    Followup {
        content: String,
        ephemeral: bool,
    },
    PutCommands {
        scope: CommandScope,
        names: Vec<String>,
    },
}

#[derive(Default)]
pub struct RecordingPlatform {
    calls: Mutex<Vec<PlatformCall>>,
    choice_names: Mutex<Vec<Vec<String>>>,
    failing_updates: AtomicUsize,
    failing_scopes: Mutex<Vec<CommandScope>>,
}

impl RecordingPlatform {
    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Display names of the choices sent with each response, in send order.
    pub fn choice_names(&self) -> Vec<Vec<String>> {
        self.choice_names.lock().unwrap().clone()
    }

    pub fn fail_next_updates(&self, count: usize) {
        self.failing_updates.store(count, Ordering::SeqCst);
    }

    pub fn fail_scope(&self, scope: CommandScope) {
        self.failing_scopes.lock().unwrap().push(scope);
    }

    fn record(&self, call: PlatformCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Platform for RecordingPlatform {
    async fn create_response(
        &self,
        _interaction: &InteractionMeta,
        response: &InteractionResponse,
    ) -> Result<(), Error> {
        let data = response.data.as_ref();
        if let Some(choices) = data.and_then(|data| data.choices.as_ref()) {
            self.choice_names
                .lock()
                .unwrap()
                .push(choices.iter().map(|choice| choice.name.clone()).collect());
        }
        self.record(PlatformCall::Response {
            kind: response.kind,
            content: data.and_then(|data| data.content.clone()),
            ephemeral: data
                .and_then(|data| data.flags)
                .is_some_and(|flags| flags.contains(MessageFlags::EPHEMERAL)),
            choices: data
                .and_then(|data| data.choices.as_ref())
                .map(|choices| {
                    choices
                        .iter()
                        .map(|choice| match &choice.value {
                            CommandOptionChoiceValue::String(value) => value.clone(),
                            CommandOptionChoiceValue::Integer(value) => value.to_string(),
                            CommandOptionChoiceValue::Number(value) => value.to_string(),
                        })
                        .collect()
                })
                .unwrap_or_default(),
        });

        Ok(())
    }

    async fn update_response(
        &self,
        _interaction: &InteractionMeta,
        content: &str,
    ) -> Result<(), Error> {
        self.record(PlatformCall::Update(content.to_string()));

        let failing = self.failing_updates.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_updates.store(failing - 1, Ordering::SeqCst);
            return Err("unknown webhook".into());
        }

        Ok(())
    }

    async fn create_followup(
        &self,
        _interaction: &InteractionMeta,
        content: &str,
        ephemeral: bool,
    ) -> Result<(), Error> {
        self.record(PlatformCall::Followup {
            content: content.to_string(),
            ephemeral,
        });

        Ok(())
    }

    async fn put_commands(
        &self,
        scope: CommandScope,
        commands: &[CommandDefinition],
    ) -> Result<Vec<CommandDefinition>, Error> {
        self.record(PlatformCall::PutCommands {
            scope,
            names: commands.iter().map(|c| c.name.clone()).collect(),
        });

        if self.failing_scopes.lock().unwrap().contains(&scope) {
            return Err(format!("missing access {}", scope).into());
        }

        Ok(commands.to_vec())
    }
}

pub fn setup() -> (Arc<Client<Recorder>>, Arc<RecordingPlatform>, Recorder) {
    let platform = Arc::new(RecordingPlatform::default());
    let recorder = Recorder::default();
    let client = Client::new(
        ClientOptions {
            reply_retry_delay: Duration::from_millis(10),
        },
        Arc::clone(&platform) as Arc<dyn Platform>,
        recorder.clone(),
    );

    (client, platform, recorder)
}

pub fn meta() -> InteractionMeta {
    InteractionMeta {
        id: Id::new(1),
        token: "token".into(),
        guild_id: Some(Id::new(100)),
        user_id: Some(Id::new(200)),
        member_permissions: Some(Permissions::SEND_MESSAGES),
    }
}

pub fn invoke(name: &str, group: Option<&str>, subcommand: Option<&str>) -> IncomingInteraction {
    IncomingInteraction::Command(CommandInvocation {
        meta: meta(),
        name: name.into(),
        kind: CommandType::ChatInput,
        group: group.map(Into::into),
        subcommand: subcommand.map(Into::into),
        options: Vec::new(),
        target_id: None,
    })
}

pub fn invoke_kind(name: &str, kind: CommandType) -> IncomingInteraction {
    IncomingInteraction::Command(CommandInvocation {
        meta: meta(),
        name: name.into(),
        kind,
        group: None,
        subcommand: None,
        options: Vec::new(),
        target_id: Some(Id::new(300)),
    })
}

pub fn autocomplete(
    name: &str,
    group: Option<&str>,
    subcommand: Option<&str>,
    option: &str,
    value: &str,
    kind: CommandOptionType,
) -> IncomingInteraction {
    IncomingInteraction::Autocomplete(AutocompleteRequest {
        meta: meta(),
        name: name.into(),
        group: group.map(Into::into),
        subcommand: subcommand.map(Into::into),
        options: vec![CommandDataOption {
            name: option.into(),
            value: CommandOptionValue::Focused(value.into(), kind),
        }],
    })
}

async fn record_lifecycle(ctx: EventContext<Recorder>) -> Result<(), Error> {
    let Some(event) = ctx.lifecycle() else {
        return Ok(());
    };

    let detail = match event {
        LifecycleEvent::LoadModule { module }
        | LifecycleEvent::UnloadModule { module }
        | LifecycleEvent::RunModule { module, .. }
        | LifecycleEvent::ApplicationInteractionError { module, .. }
        | LifecycleEvent::AutocompleteInteractionError { module, .. } => module.to_string(),
        LifecycleEvent::EventHandled { event, module } => format!("{} {}", event.name, module),
        LifecycleEvent::EventSkipped {
            event,
            module,
            skipped_by,
            reason,
        } => format!(
            "{} {} by {} for {}",
            event.name, module, skipped_by, reason.message
        ),
        LifecycleEvent::FrameworkError { message, .. }
        | LifecycleEvent::FrameworkWarn { message }
        | LifecycleEvent::FrameworkDebug { message } => message.clone(),
        LifecycleEvent::Load | LifecycleEvent::Unload => String::new(),
    };

    ctx.services.push(format!("{}: {}", event.key(), detail));
    Ok(())
}

/// A module that records every lifecycle notification in `keys`.
pub fn watcher(keys: &[&str]) -> ModuleBuilder<Recorder> {
    keys.iter().fold(ModuleBuilder::new("watcher"), |builder, key| {
        builder.on(key, handler_func!(record_lifecycle))
    })
}
