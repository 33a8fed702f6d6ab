use switchboard_framework::{
    events::{
        APPLICATION_INTERACTION_ERROR, EVENT_SKIPPED, LOAD_MODULE, RUN_MODULE, UNLOAD_MODULE,
    },
    handler_func, Error, HandlerBuilder as _, LifecycleEvent, ModuleBuilder, Node,
};
use twilight_gateway::Event;

use crate::context::{EventContext, Services};

pub(crate) fn build() -> Node<Services> {
    ModuleBuilder::<Services>::new("logging")
        .on("READY", handler_func!(on_ready))
        .on(LOAD_MODULE, handler_func!(on_lifecycle))
        .on(UNLOAD_MODULE, handler_func!(on_lifecycle))
        .on(RUN_MODULE, handler_func!(on_lifecycle))
        .on(EVENT_SKIPPED, handler_func!(on_lifecycle))
        .on(APPLICATION_INTERACTION_ERROR, handler_func!(on_lifecycle))
        .into()
}

async fn on_ready(ctx: EventContext) -> Result<(), Error> {
    if let Some(Event::Ready(ready)) = ctx.native() {
        tracing::info!(
            user = %ready.user.name,
            guilds = ready.guilds.len(),
            "connected to gateway"
        );
    }

    Ok(())
}

async fn on_lifecycle(ctx: EventContext) -> Result<(), Error> {
    let Some(event) = ctx.lifecycle() else {
        return Ok(());
    };

    match event {
        LifecycleEvent::LoadModule { module } => {
            tracing::info!(module = module.qualified_name(), "module loaded");
        }
        LifecycleEvent::UnloadModule { module } => {
            tracing::info!(module = module.qualified_name(), "module unloaded");
        }
        LifecycleEvent::RunModule {
            module,
            interaction,
        } => {
            tracing::info!(
                module = module.qualified_name(),
                user = ?interaction.meta.user_id,
                "running /{}",
                interaction.name
            );
        }
        LifecycleEvent::EventSkipped {
            event,
            module,
            skipped_by,
            reason,
        } => {
            tracing::info!(
                event = event.name,
                module = module.qualified_name(),
                skipped_by = skipped_by.qualified_name(),
                reason = %reason.message,
                "event skipped"
            );
        }
        LifecycleEvent::ApplicationInteractionError {
            module,
            interaction,
            error,
        } => {
            tracing::error!(
                module = module.qualified_name(),
                "error running /{}: {}",
                interaction.name,
                error
            );
        }
        _ => (),
    }

    Ok(())
}
