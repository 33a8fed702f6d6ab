use std::{future::Future, pin::Pin};

use twilight_model::application::command::CommandOptionChoice;

use crate::{
    context::{AutocompleteContext, CommandContext, EventContext, SkipContext},
    events::{SkipReason, AUTOCOMPLETE, RUN, SHOULD_SKIP_EVENT},
    module::Node,
    Error,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub type ListenerFunc<T> = fn(EventContext<T>) -> BoxFuture<'static, Result<(), Error>>;
pub type RunFunc<T> = fn(CommandContext<T>) -> BoxFuture<'static, Result<(), Error>>;
pub type AutocompleteFunc<T> =
    fn(AutocompleteContext<T>) -> BoxFuture<'static, Result<Vec<CommandOptionChoice>, Error>>;
pub type SkipFunc<T> = fn(SkipContext<T>) -> BoxFuture<'static, Result<Option<SkipReason>, Error>>;

pub enum Handler<T> {
    /// Attached to an emitter, native or lifecycle depending on its key.
    Listener(ListenerFunc<T>),
    Run(RunFunc<T>),
    Autocomplete(AutocompleteFunc<T>),
    ShouldSkipEvent(SkipFunc<T>),
}

impl<T> Handler<T> {
    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            Self::Listener(_) => "listener",
            Self::Run(_) => RUN,
            Self::Autocomplete(_) => AUTOCOMPLETE,
            Self::ShouldSkipEvent(_) => SHOULD_SKIP_EVENT,
        }
    }
}

impl<T> Clone for Handler<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handler<T> {}

/// A module's handlers keyed by event, in insertion order. Inserting an existing key replaces it.
pub struct HandlerMap<T> {
    entries: Vec<(String, Handler<T>)>,
}

impl<T> HandlerMap<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub(crate) fn insert(&mut self, key: &str, handler: Handler<T>) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == key) {
            entry.1 = handler;
        } else {
            self.entries.push((key.to_string(), handler));
        }
    }

    pub fn get(&self, key: &str) -> Option<Handler<T>> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, handler)| *handler)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Handler<T>)> {
        self.entries.iter().map(|(key, handler)| (key.as_str(), *handler))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn listener(&self, key: &str) -> Option<ListenerFunc<T>> {
        match self.get(key)? {
            Handler::Listener(func) => Some(func),
            _ => None,
        }
    }

    pub(crate) fn run(&self) -> Option<RunFunc<T>> {
        match self.get(RUN)? {
            Handler::Run(func) => Some(func),
            _ => None,
        }
    }

    pub(crate) fn autocomplete(&self) -> Option<AutocompleteFunc<T>> {
        match self.get(AUTOCOMPLETE)? {
            Handler::Autocomplete(func) => Some(func),
            _ => None,
        }
    }
}

impl<T> Default for HandlerMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handler and child registration shared by every module builder.
pub trait HandlerBuilder<T>: Sized {
    fn handler_map(&mut self) -> &mut HandlerMap<T>;
    fn child_nodes(&mut self) -> &mut Vec<Node<T>>;

    /// Listen to a native (`MESSAGE_CREATE`, ...) or lifecycle (`load`, `event_skipped`, ...) event.
    fn on(mut self, event: &str, func: ListenerFunc<T>) -> Self {
        self.handler_map().insert(event, Handler::Listener(func));
        self
    }

    fn run(mut self, func: RunFunc<T>) -> Self {
        self.handler_map().insert(RUN, Handler::Run(func));
        self
    }

    /// Catch-all autocomplete for options without a dedicated handler.
    fn autocomplete(mut self, func: AutocompleteFunc<T>) -> Self {
        self.handler_map()
            .insert(AUTOCOMPLETE, Handler::Autocomplete(func));
        self
    }

    fn should_skip_event(mut self, func: SkipFunc<T>) -> Self {
        self.handler_map()
            .insert(SHOULD_SKIP_EVENT, Handler::ShouldSkipEvent(func));
        self
    }

    fn child(mut self, node: impl Into<Node<T>>) -> Self {
        self.child_nodes().push(node.into());
        self
    }
}

pub(crate) fn noop<T>(_ctx: CommandContext<T>) -> BoxFuture<'static, Result<(), Error>> {
    Box::pin(async { Ok(()) })
}
