use std::{ops::Deref, sync::Arc};

use super::Context;
use crate::events::{EventDetails, EventPayload, LifecycleEvent};

/// Passed to listeners, for both native and lifecycle events.
pub struct EventContext<T> {
    pub context: Context<T>,
    pub event: Arc<EventDetails>,
}

impl<T> EventContext<T> {
    pub fn native(&self) -> Option<&twilight_gateway::Event> {
        match &self.event.payload {
            EventPayload::Native(event) => Some(event),
            _ => None,
        }
    }

    pub fn lifecycle(&self) -> Option<&LifecycleEvent> {
        match &self.event.payload {
            EventPayload::Lifecycle(event) => Some(event),
            _ => None,
        }
    }
}

impl<T> Deref for EventContext<T> {
    type Target = Context<T>;

    fn deref(&self) -> &Self::Target {
        &self.context
    }
}

impl<T: Clone> Clone for EventContext<T> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
            event: Arc::clone(&self.event),
        }
    }
}
