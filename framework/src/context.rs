use std::sync::Arc;

use crate::{client::Client, execution::ModuleHandle, platform::Platform};

pub mod autocomplete_context;
pub mod command_context;
pub mod event_context;
pub mod skip_context;

pub use autocomplete_context::{AutocompleteContext, AutocompleteValue};
pub use command_context::{CommandContext, ResponseStatus};
pub use event_context::EventContext;
pub use skip_context::SkipContext;

/// What every handler gets: the engine, the user's services and the module it runs as.
pub struct Context<T> {
    pub client: Arc<Client<T>>,
    pub services: T,
    pub module: ModuleHandle,
}

impl<T> Context<T> {
    pub fn platform(&self) -> &Arc<dyn Platform> {
        self.client.platform()
    }
}

impl<T: Clone> Clone for Context<T> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            services: self.services.clone(),
            module: self.module.clone(),
        }
    }
}
