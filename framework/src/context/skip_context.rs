use std::{ops::Deref, sync::Arc};

use super::Context;
use crate::{events::EventDetails, execution::ModuleHandle};

/// Passed to `should_skip_event` handlers. `module` is the skipping module, `target` the one
/// that would handle the event.
pub struct SkipContext<T> {
    pub context: Context<T>,
    pub event: Arc<EventDetails>,
    pub target: ModuleHandle,
}

impl<T> Deref for SkipContext<T> {
    type Target = Context<T>;

    fn deref(&self) -> &Self::Target {
        &self.context
    }
}
