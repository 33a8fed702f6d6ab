//! Handler-map keys and the payloads delivered to listeners.
//!
//! Every key in a module's handler map belongs to exactly one of three closed
//! sets: native events (gateway dispatch names, delivered by the platform),
//! lifecycle events (emitted by the framework itself) and directed events
//! (called directly by the engine, never attached as listeners, because their
//! return value drives control flow).

use std::sync::Arc;

use twilight_gateway::Event;

use crate::{
    execution::ModuleHandle,
    interaction::{AutocompleteRequest, CommandInvocation, IncomingInteraction},
    SharedError,
};

/// Gateway dispatch events a module can listen to, keyed by their dispatch name.
pub const NATIVE_EVENTS: &[&str] = &[
    "APPLICATION_COMMAND_PERMISSIONS_UPDATE",
    "AUTO_MODERATION_ACTION_EXECUTION",
    "AUTO_MODERATION_RULE_CREATE",
    "AUTO_MODERATION_RULE_DELETE",
    "AUTO_MODERATION_RULE_UPDATE",
    "CHANNEL_CREATE",
    "CHANNEL_DELETE",
    "CHANNEL_PINS_UPDATE",
    "CHANNEL_UPDATE",
    "ENTITLEMENT_CREATE",
    "ENTITLEMENT_DELETE",
    "ENTITLEMENT_UPDATE",
    "GUILD_AUDIT_LOG_ENTRY_CREATE",
    "GUILD_BAN_ADD",
    "GUILD_BAN_REMOVE",
    "GUILD_CREATE",
    "GUILD_DELETE",
    "GUILD_EMOJIS_UPDATE",
    "GUILD_INTEGRATIONS_UPDATE",
    "GUILD_MEMBER_ADD",
    "GUILD_MEMBER_REMOVE",
    "GUILD_MEMBER_UPDATE",
    "GUILD_MEMBERS_CHUNK",
    "GUILD_ROLE_CREATE",
    "GUILD_ROLE_DELETE",
    "GUILD_ROLE_UPDATE",
    "GUILD_SCHEDULED_EVENT_CREATE",
    "GUILD_SCHEDULED_EVENT_DELETE",
    "GUILD_SCHEDULED_EVENT_UPDATE",
    "GUILD_SCHEDULED_EVENT_USER_ADD",
    "GUILD_SCHEDULED_EVENT_USER_REMOVE",
    "GUILD_STICKERS_UPDATE",
    "GUILD_UPDATE",
    "INTEGRATION_CREATE",
    "INTEGRATION_DELETE",
    "INTEGRATION_UPDATE",
    "INTERACTION_CREATE",
    "INVITE_CREATE",
    "INVITE_DELETE",
    "MESSAGE_CREATE",
    "MESSAGE_DELETE",
    "MESSAGE_DELETE_BULK",
    "MESSAGE_POLL_VOTE_ADD",
    "MESSAGE_POLL_VOTE_REMOVE",
    "MESSAGE_REACTION_ADD",
    "MESSAGE_REACTION_REMOVE",
    "MESSAGE_REACTION_REMOVE_ALL",
    "MESSAGE_REACTION_REMOVE_EMOJI",
    "MESSAGE_UPDATE",
    "PRESENCE_UPDATE",
    "READY",
    "RESUMED",
    "STAGE_INSTANCE_CREATE",
    "STAGE_INSTANCE_DELETE",
    "STAGE_INSTANCE_UPDATE",
    "THREAD_CREATE",
    "THREAD_DELETE",
    "THREAD_LIST_SYNC",
    "THREAD_MEMBER_UPDATE",
    "THREAD_MEMBERS_UPDATE",
    "THREAD_UPDATE",
    "TYPING_START",
    "UNAVAILABLE_GUILD",
    "USER_UPDATE",
    "VOICE_SERVER_UPDATE",
    "VOICE_STATE_UPDATE",
    "WEBHOOKS_UPDATE",
];

pub const LOAD: &str = "load";
pub const UNLOAD: &str = "unload";
pub const LOAD_MODULE: &str = "load_module";
pub const UNLOAD_MODULE: &str = "unload_module";
pub const RUN_MODULE: &str = "run_module";
pub const EVENT_HANDLED: &str = "event_handled";
pub const EVENT_SKIPPED: &str = "event_skipped";
pub const AUTOCOMPLETE_INTERACTION_ERROR: &str = "autocomplete_interaction_error";
pub const APPLICATION_INTERACTION_ERROR: &str = "application_interaction_error";
pub const FRAMEWORK_ERROR: &str = "framework_error";
pub const FRAMEWORK_WARN: &str = "framework_warn";
pub const FRAMEWORK_DEBUG: &str = "framework_debug";

/// Events emitted by the framework on its own emitter.
pub const LIFECYCLE_EVENTS: &[&str] = &[
    LOAD,
    UNLOAD,
    LOAD_MODULE,
    UNLOAD_MODULE,
    RUN_MODULE,
    EVENT_HANDLED,
    EVENT_SKIPPED,
    AUTOCOMPLETE_INTERACTION_ERROR,
    APPLICATION_INTERACTION_ERROR,
    FRAMEWORK_ERROR,
    FRAMEWORK_WARN,
    FRAMEWORK_DEBUG,
];

pub const RUN: &str = "run";
pub const AUTOCOMPLETE: &str = "autocomplete";
pub const SHOULD_SKIP_EVENT: &str = "should_skip_event";

/// Keys called directly by the engine, whose return value is awaited.
pub const DIRECTED_EVENTS: &[&str] = &[RUN, AUTOCOMPLETE, SHOULD_SKIP_EVENT];

/// Name used in [`EventDetails`] for top-level interaction dispatch.
pub const INTERACTION_CREATE: &str = "INTERACTION_CREATE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Native,
    Lifecycle,
    Directed,
}

/// Sorts a handler-map key into its event set, `None` if it's in none of them.
pub fn classify(key: &str) -> Option<EventKind> {
    if is_native_event(key) {
        Some(EventKind::Native)
    } else if is_lifecycle_event(key) {
        Some(EventKind::Lifecycle)
    } else if is_directed_event(key) {
        Some(EventKind::Directed)
    } else {
        None
    }
}

pub fn is_native_event(key: &str) -> bool {
    NATIVE_EVENTS.contains(&key)
}

pub fn is_lifecycle_event(key: &str) -> bool {
    LIFECYCLE_EVENTS.contains(&key)
}

pub fn is_directed_event(key: &str) -> bool {
    DIRECTED_EVENTS.contains(&key)
}

/// Why a module was skipped, shown to the user when an interaction is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipReason {
    pub message: String,
    pub ephemeral: bool,
}

impl SkipReason {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ephemeral: false,
        }
    }

    pub fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }
}

/// Notifications the framework emits to lifecycle listeners.
#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    Load,
    Unload,
    LoadModule {
        module: ModuleHandle,
    },
    UnloadModule {
        module: ModuleHandle,
    },
    RunModule {
        module: ModuleHandle,
        interaction: Arc<CommandInvocation>,
    },
    EventHandled {
        event: Arc<EventDetails>,
        module: ModuleHandle,
    },
    EventSkipped {
        event: Arc<EventDetails>,
        module: ModuleHandle,
        skipped_by: ModuleHandle,
        reason: SkipReason,
    },
    AutocompleteInteractionError {
        module: ModuleHandle,
        interaction: Arc<AutocompleteRequest>,
        error: SharedError,
    },
    ApplicationInteractionError {
        module: ModuleHandle,
        interaction: Arc<CommandInvocation>,
        error: SharedError,
    },
    FrameworkError {
        message: String,
        error: SharedError,
    },
    FrameworkWarn {
        message: String,
    },
    FrameworkDebug {
        message: String,
    },
}

impl LifecycleEvent {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Load => LOAD,
            Self::Unload => UNLOAD,
            Self::LoadModule { .. } => LOAD_MODULE,
            Self::UnloadModule { .. } => UNLOAD_MODULE,
            Self::RunModule { .. } => RUN_MODULE,
            Self::EventHandled { .. } => EVENT_HANDLED,
            Self::EventSkipped { .. } => EVENT_SKIPPED,
            Self::AutocompleteInteractionError { .. } => AUTOCOMPLETE_INTERACTION_ERROR,
            Self::ApplicationInteractionError { .. } => APPLICATION_INTERACTION_ERROR,
            Self::FrameworkError { .. } => FRAMEWORK_ERROR,
            Self::FrameworkWarn { .. } => FRAMEWORK_WARN,
            Self::FrameworkDebug { .. } => FRAMEWORK_DEBUG,
        }
    }
}

#[derive(Debug, Clone)]
pub enum EventPayload {
    Native(Event),
    Lifecycle(LifecycleEvent),
    Interaction(IncomingInteraction),
}

/// An event as seen by skip handlers and listeners: its key plus what was delivered.
#[derive(Debug, Clone)]
pub struct EventDetails {
    pub name: &'static str,
    pub payload: EventPayload,
}

impl EventDetails {
    pub fn native(name: &'static str, event: Event) -> Self {
        Self {
            name,
            payload: EventPayload::Native(event),
        }
    }

    pub fn lifecycle(event: LifecycleEvent) -> Self {
        Self {
            name: event.key(),
            payload: EventPayload::Lifecycle(event),
        }
    }

    pub fn interaction(interaction: IncomingInteraction) -> Self {
        Self {
            name: INTERACTION_CREATE,
            payload: EventPayload::Interaction(interaction),
        }
    }

    /// Notifications about event delivery itself, these never produce further skip notifications.
    pub(crate) fn is_delivery_notice(&self) -> bool {
        self.name == EVENT_HANDLED || self.name == EVENT_SKIPPED
    }
}
