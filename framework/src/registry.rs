use std::{
    collections::HashMap,
    hash::{Hash, Hasher},
};

use uuid::Uuid;

use crate::{
    events::{self, EventKind, LOAD, UNLOAD},
    execution::ModuleHandle,
    handler::{Handler, ListenerFunc, SkipFunc},
    module::{Command, Node},
};

/// A listener attached to an emitter on behalf of a module.
pub(crate) struct EventListener<T> {
    pub(crate) uuid: Uuid,
    pub(crate) module: ModuleHandle,
    pub(crate) event: String,
    pub(crate) func: ListenerFunc<T>,
}

impl<T> Clone for EventListener<T> {
    fn clone(&self) -> Self {
        Self {
            uuid: self.uuid,
            module: self.module.clone(),
            event: self.event.clone(),
            func: self.func,
        }
    }
}

impl<T> Hash for EventListener<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uuid.hash(state);
        self.event.hash(state);
    }
}

impl<T> PartialEq for EventListener<T> {
    fn eq(&self, other: &Self) -> bool {
        self.event == other.event && self.uuid == other.uuid
    }
}

impl<T> Eq for EventListener<T> {}

/// Listeners per event key, in attach order.
pub(crate) struct EventRegistry<T> {
    listeners: HashMap<String, Vec<EventListener<T>>>,
}

impl<T> EventRegistry<T> {
    pub(crate) fn new() -> Self {
        Self {
            listeners: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, listener: EventListener<T>) {
        self.listeners
            .entry(listener.event.clone())
            .or_default()
            .push(listener);
    }

    pub(crate) fn remove(&mut self, listener: &EventListener<T>) -> bool {
        let Some(listeners) = self.listeners.get_mut(&listener.event) else {
            return false;
        };

        let before = listeners.len();
        listeners.retain(|l| l != listener);
        let removed = listeners.len() != before;
        if listeners.is_empty() {
            self.listeners.remove(&listener.event);
        }

        removed
    }

    pub(crate) fn get_all(&self, event: &str) -> Vec<EventListener<T>> {
        self.listeners.get(event).cloned().unwrap_or_default()
    }
}

struct ModuleEntry<T> {
    node: Node<T>,
    handle: ModuleHandle,
    listeners: Vec<(EventKind, EventListener<T>)>,
}

pub(crate) struct CommandEntry<T> {
    pub(crate) command: Command<T>,
    pub(crate) handle: ModuleHandle,
}

impl<T> Clone for CommandEntry<T> {
    fn clone(&self) -> Self {
        Self {
            command: self.command.clone(),
            handle: self.handle.clone(),
        }
    }
}

/// Everything the client knows about registered modules.
pub(crate) struct Registry<T> {
    /// Keyed by qualified name.
    modules: HashMap<String, ModuleEntry<T>>,
    /// Top-level runnables keyed by bare name.
    commands: HashMap<String, CommandEntry<T>>,
    native: EventRegistry<T>,
    lifecycle: EventRegistry<T>,
    /// In registration order.
    skip_handlers: Vec<(ModuleHandle, SkipFunc<T>)>,
}

impl<T> Registry<T> {
    pub(crate) fn new() -> Self {
        Self {
            modules: HashMap::new(),
            commands: HashMap::new(),
            native: EventRegistry::new(),
            lifecycle: EventRegistry::new(),
            skip_handlers: Vec::new(),
        }
    }

    /// Registers a single node (not its children), returning any warnings raised.
    ///
    /// Handler keys must already be validated.
    pub(crate) fn register(&mut self, node: &Node<T>, handle: &ModuleHandle) -> Vec<String> {
        let mut warnings = Vec::new();

        // descendants of the previous registration go with it, the replacement
        // registers its own children after this
        if !self.unregister_subtree(handle.qualified_name()).is_empty() {
            warnings.push(format!(
                "Module {} is already registered, overwriting",
                handle
            ));
        }

        let mut listeners = Vec::new();
        for (key, handler) in node.module().handlers.iter() {
            match (events::classify(key), handler) {
                // invoked directly on (un)registration
                (_, Handler::Listener(_)) if key == LOAD || key == UNLOAD => {}
                (
                    Some(kind @ (EventKind::Native | EventKind::Lifecycle)),
                    Handler::Listener(func),
                ) => {
                    let listener = EventListener {
                        uuid: Uuid::now_v7(),
                        module: handle.clone(),
                        event: key.to_string(),
                        func,
                    };
                    self.emitter(kind).insert(listener.clone());
                    listeners.push((kind, listener));
                }
                (_, Handler::ShouldSkipEvent(func)) => {
                    self.skip_handlers.push((handle.clone(), func));
                }
                _ => {}
            }
        }

        if let Some(command) = node.as_command() {
            let name = command.name().to_string();
            let previous = self.commands.insert(
                name.clone(),
                CommandEntry {
                    command: command.clone(),
                    handle: handle.clone(),
                },
            );

            // a module overwrite already warned about this
            if previous.is_some() && warnings.is_empty() {
                warnings.push(format!(
                    "Command {} is already registered, overwriting",
                    name
                ));
            }
        }

        self.modules.insert(
            handle.qualified_name().to_string(),
            ModuleEntry {
                node: node.clone(),
                handle: handle.clone(),
                listeners,
            },
        );

        warnings
    }

    /// Detaches a single module (not its children), returning its node.
    pub(crate) fn unregister(&mut self, handle: &ModuleHandle) -> Option<Node<T>> {
        let entry = self.modules.remove(handle.qualified_name())?;

        for (kind, listener) in &entry.listeners {
            self.emitter(*kind).remove(listener);
        }
        self.skip_handlers.retain(|(module, _)| module != handle);

        if let Some(command) = entry.node.as_command() {
            if self
                .commands
                .get(command.name())
                .is_some_and(|registered| &registered.handle == handle)
            {
                self.commands.remove(command.name());
            }
        }

        Some(entry.node)
    }

    /// Detaches a module and every descendant it was registered with, in registration order.
    pub(crate) fn unregister_subtree(
        &mut self,
        qualified_name: &str,
    ) -> Vec<(Node<T>, ModuleHandle)> {
        let mut subtree = Vec::new();
        if let Some(entry) = self.modules.get(qualified_name) {
            flatten(&entry.node, entry.handle.clone(), &mut subtree);
        }
        for (_, handle) in &subtree {
            self.unregister(handle);
        }

        subtree
    }

    fn emitter(&mut self, kind: EventKind) -> &mut EventRegistry<T> {
        match kind {
            EventKind::Native => &mut self.native,
            _ => &mut self.lifecycle,
        }
    }

    pub(crate) fn module_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.modules.keys().cloned().collect();
        names.sort();
        names
    }

    pub(crate) fn command(&self, name: &str) -> Option<CommandEntry<T>> {
        self.commands.get(name).cloned()
    }

    pub(crate) fn commands(&self) -> Vec<Command<T>> {
        self.commands
            .values()
            .map(|entry| entry.command.clone())
            .collect()
    }

    pub(crate) fn native_listeners(&self, event: &str) -> Vec<EventListener<T>> {
        self.native.get_all(event)
    }

    pub(crate) fn lifecycle_listeners(&self, event: &str) -> Vec<EventListener<T>> {
        self.lifecycle.get_all(event)
    }

    pub(crate) fn skip_handlers(&self) -> Vec<(ModuleHandle, SkipFunc<T>)> {
        self.skip_handlers.clone()
    }
}

/// Collects `node` and its descendants in registration order, with their handles.
pub(crate) fn flatten<T>(
    node: &Node<T>,
    handle: ModuleHandle,
    out: &mut Vec<(Node<T>, ModuleHandle)>,
) {
    out.push((node.clone(), handle.clone()));
    for child in node.children() {
        flatten(child, handle.child(child.name()), out);
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}
