use switchboard_framework::{
    events::EventPayload, handler_func, interaction::IncomingInteraction, Error,
    HandlerBuilder as _, ModuleBuilder, Node, SkipReason,
};
use twilight_gateway::Event;
use twilight_model::id::{marker::UserMarker, Id};

use crate::context::{Services, SkipContext};

pub(crate) fn build() -> Node<Services> {
    ModuleBuilder::<Services>::new("blocklist")
        .should_skip_event(handler_func!(should_skip))
        .into()
}

async fn should_skip(ctx: SkipContext) -> Result<Option<SkipReason>, Error> {
    let Some(user_id) = event_user(&ctx.event.payload) else {
        return Ok(None);
    };

    if !ctx.services.blocked_users.contains(&user_id) {
        return Ok(None);
    }

    tracing::debug!(
        %user_id,
        event = ctx.event.name,
        target = ctx.target.qualified_name(),
        "skipping event from blocked user"
    );
    Ok(Some(
        SkipReason::new("you are blocked from using this bot").ephemeral(),
    ))
}

/// Who caused the event, for the events where that's known.
fn event_user(payload: &EventPayload) -> Option<Id<UserMarker>> {
    match payload {
        EventPayload::Interaction(IncomingInteraction::Command(invocation)) => {
            invocation.meta.user_id
        }
        EventPayload::Interaction(IncomingInteraction::Autocomplete(request)) => {
            request.meta.user_id
        }
        EventPayload::Native(Event::MessageCreate(message)) => Some(message.author.id),
        EventPayload::Native(Event::ReactionAdd(reaction)) => Some(reaction.user_id),
        _ => None,
    }
}
