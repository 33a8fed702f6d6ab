use std::{collections::HashSet, sync::Arc};

use twilight_model::id::{marker::UserMarker, Id};

/// Shared with every module handler through its context.
#[derive(Clone, Debug)]
pub struct Services {
    pub http: Arc<twilight_http::Client>,
    pub blocked_users: Arc<HashSet<Id<UserMarker>>>,
}

pub type CommandContext = switchboard_framework::CommandContext<Services>;
pub type AutocompleteContext = switchboard_framework::AutocompleteContext<Services>;
pub type EventContext = switchboard_framework::EventContext<Services>;
pub type SkipContext = switchboard_framework::SkipContext<Services>;
