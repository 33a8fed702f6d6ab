use std::{
    collections::BTreeMap,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

use futures::future::join_all;
use twilight_gateway::Event;
use twilight_model::{
    application::command::{Command as CommandDefinition, CommandOptionChoice},
    id::{marker::GuildMarker, Id},
};

use crate::{
    command,
    context::{CommandContext, Context, EventContext, SkipContext},
    error::{FrameworkError, GuardError},
    events::{
        self, EventDetails, EventKind, LifecycleEvent, SkipReason, AUTOCOMPLETE, EVENT_HANDLED,
        LOAD, RUN, SHOULD_SKIP_EVENT, UNLOAD,
    },
    execution::{self, ModuleHandle},
    handler::BoxFuture,
    interaction::{self, AutocompleteRequest, CommandInvocation, IncomingInteraction},
    module::{Command, Node},
    platform::{CommandScope, Platform},
    registry::{flatten, EventListener, Registry},
    reply, Error, SharedError,
};

#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// How long to wait before retrying an edit of a deferred response.
    pub reply_retry_delay: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            reply_retry_delay: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PutCommandOptions {
    /// Only consider these commands (by name) instead of every registered one.
    pub commands: Option<Vec<String>>,
    /// Put the commands in this guild instead of globally.
    pub guild_id: Option<Id<GuildMarker>>,
    /// Ignore guild restrictions for the main put.
    ///
    /// **Dangerous**, every restricted command ends up wherever the commands are put.
    /// Restricted guilds still get their own put when `register_guild_restricted_commands` is set.
    pub override_guild_check: bool,
    /// Also put every restricted command in the guilds it's restricted to.
    pub register_guild_restricted_commands: bool,
}

/// Result of overwriting the commands of a single scope.
#[derive(Debug)]
pub struct ScopeOutcome {
    pub scope: CommandScope,
    pub commands: Vec<String>,
    pub result: Result<Vec<CommandDefinition>, Error>,
}

/// The dispatch engine, owns the module tree and routes events and interactions through it.
pub struct Client<T> {
    options: ClientOptions,
    platform: Arc<dyn Platform>,
    services: T,
    registry: RwLock<Registry<T>>,
}

impl<T> Client<T> {
    pub fn platform(&self) -> &Arc<dyn Platform> {
        &self.platform
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    fn registry(&self) -> RwLockReadGuard<'_, Registry<T>> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn registry_mut(&self) -> RwLockWriteGuard<'_, Registry<T>> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Qualified names of every registered module, sorted.
    pub fn module_names(&self) -> Vec<String> {
        self.registry().module_names()
    }

    pub fn command(&self, name: &str) -> Option<Command<T>> {
        self.registry().command(name).map(|entry| entry.command)
    }

    pub fn commands(&self) -> Vec<Command<T>> {
        self.registry().commands()
    }
}

impl<T: Clone + Send + Sync + 'static> Client<T> {
    pub fn new(options: ClientOptions, platform: Arc<dyn Platform>, services: T) -> Arc<Self> {
        Arc::new(Self {
            options,
            platform,
            services,
            registry: RwLock::new(Registry::new()),
        })
    }

    fn context(self: &Arc<Self>, module: ModuleHandle) -> Context<T> {
        Context {
            client: Arc::clone(self),
            services: self.services.clone(),
            module,
        }
    }

    /// Registers every node and its descendants, then runs their `load` handlers.
    ///
    /// The whole batch is validated first, an invalid handler key anywhere
    /// rejects the batch without registering anything.
    pub async fn add_modules<N: Into<Node<T>>>(
        self: &Arc<Self>,
        nodes: impl IntoIterator<Item = N>,
    ) -> Result<(), FrameworkError> {
        let nodes: Vec<Node<T>> = nodes.into_iter().map(Into::into).collect();

        let mut flattened = Vec::new();
        for node in &nodes {
            flatten(node, ModuleHandle::root(node.name()), &mut flattened);
        }
        for (node, handle) in &flattened {
            validate(node, handle)?;
        }

        let warnings = {
            let mut registry = self.registry_mut();
            flattened
                .iter()
                .flat_map(|(node, handle)| registry.register(node, handle))
                .collect::<Vec<_>>()
        };
        for warning in warnings {
            self.emit(LifecycleEvent::FrameworkWarn { message: warning })
                .await;
        }

        join_all(
            flattened
                .into_iter()
                .map(|(node, handle)| self.load_module(node, handle)),
        )
        .await;

        Ok(())
    }

    async fn load_module(self: &Arc<Self>, node: Node<T>, handle: ModuleHandle) {
        tracing::debug!(module = %handle, "loading module");

        if let Some(func) = node.module().handlers.listener(LOAD) {
            let ctx = EventContext {
                context: self.context(handle.clone()),
                event: Arc::new(EventDetails::lifecycle(LifecycleEvent::Load)),
            };
            if let Err(err) = execution::scope(handle.clone(), LOAD, func(ctx)).await {
                self.emit(LifecycleEvent::FrameworkError {
                    message: format!("Error loading module {}", handle),
                    error: SharedError::from(err),
                })
                .await;
            }
        }

        self.emit(LifecycleEvent::LoadModule { module: handle }).await;
    }

    /// Unregisters modules by qualified name along with their descendants, then runs their `unload` handlers.
    pub async fn remove_modules<S: AsRef<str>>(
        self: &Arc<Self>,
        names: impl IntoIterator<Item = S>,
    ) {
        let mut flattened = Vec::new();
        {
            let mut registry = self.registry_mut();
            for name in names {
                let subtree = registry.unregister_subtree(name.as_ref());
                if subtree.is_empty() {
                    tracing::debug!(module = name.as_ref(), "not registered, not removing");
                    continue;
                }
                flattened.extend(subtree);
            }
        }

        join_all(
            flattened
                .into_iter()
                .map(|(node, handle)| self.unload_module(node, handle)),
        )
        .await;
    }

    async fn unload_module(self: &Arc<Self>, node: Node<T>, handle: ModuleHandle) {
        tracing::debug!(module = %handle, "unloading module");

        if let Some(func) = node.module().handlers.listener(UNLOAD) {
            let ctx = EventContext {
                context: self.context(handle.clone()),
                event: Arc::new(EventDetails::lifecycle(LifecycleEvent::Unload)),
            };
            if let Err(err) = execution::scope(handle.clone(), UNLOAD, func(ctx)).await {
                self.emit(LifecycleEvent::FrameworkError {
                    message: format!("Error unloading module {}", handle),
                    error: SharedError::from(err),
                })
                .await;
            }
        }

        self.emit(LifecycleEvent::UnloadModule { module: handle })
            .await;
    }

    /// Dispatches a gateway event to native listeners, and interactions to their commands.
    pub async fn handle(self: &Arc<Self>, event: Event) {
        let Some(name) = event.kind().name() else {
            return;
        };
        metrics::counter!("switchboard_events_total", "event" => name).increment(1);

        if let Event::InteractionCreate(interaction) = &event {
            match interaction::parse(&interaction.0) {
                Ok(Some(incoming)) => self.handle_interaction(incoming).await,
                Ok(None) => {}
                Err(err) => {
                    self.emit(LifecycleEvent::FrameworkError {
                        message: "Couldn't parse interaction".into(),
                        error: Arc::new(err),
                    })
                    .await
                }
            }
        }

        let listeners = self.registry().native_listeners(name);
        if !listeners.is_empty() {
            self.deliver(Arc::new(EventDetails::native(name, event)), listeners)
                .await;
        }
    }

    pub async fn handle_interaction(self: &Arc<Self>, incoming: IncomingInteraction) {
        match incoming {
            IncomingInteraction::Command(invocation) => self.run_command(invocation).await,
            IncomingInteraction::Autocomplete(request) => self.run_autocomplete(request).await,
        }
    }

    /// Emits a lifecycle notification to every module listening for it.
    pub fn emit(self: &Arc<Self>, event: LifecycleEvent) -> BoxFuture<'static, ()> {
        let client = Arc::clone(self);

        Box::pin(async move {
            match &event {
                LifecycleEvent::FrameworkError { message, error } => {
                    tracing::error!(error = %error, "{}", message)
                }
                LifecycleEvent::FrameworkWarn { message } => tracing::warn!("{}", message),
                LifecycleEvent::FrameworkDebug { message } => tracing::debug!("{}", message),
                _ => {}
            }

            let listeners = client.registry().lifecycle_listeners(event.key());
            if !listeners.is_empty() {
                client
                    .deliver(Arc::new(EventDetails::lifecycle(event)), listeners)
                    .await;
            }
        })
    }

    async fn deliver(
        self: &Arc<Self>,
        details: Arc<EventDetails>,
        listeners: Vec<EventListener<T>>,
    ) {
        let notify = !details.is_delivery_notice();

        for listener in listeners {
            if self
                .should_skip(&details, &listener.module, notify)
                .await
                .is_some()
            {
                continue;
            }

            if details.name != EVENT_HANDLED {
                self.emit(LifecycleEvent::EventHandled {
                    event: Arc::clone(&details),
                    module: listener.module.clone(),
                })
                .await;
            }

            let ctx = EventContext {
                context: self.context(listener.module.clone()),
                event: Arc::clone(&details),
            };
            let result = execution::scope(
                listener.module.clone(),
                details.name,
                (listener.func)(ctx),
            )
            .await;
            if let Err(err) = result {
                tracing::warn!(
                    module = %listener.module,
                    listener = %listener.uuid,
                    "error handling {}: {}",
                    details.name,
                    err
                );
            }
        }
    }

    /// Runs the skip chain for `target`, returning the first reason given.
    ///
    /// A failing skip handler is logged and treated as not skipping.
    async fn should_skip(
        self: &Arc<Self>,
        details: &Arc<EventDetails>,
        target: &ModuleHandle,
        notify: bool,
    ) -> Option<SkipReason> {
        let skippers = self.registry().skip_handlers();

        for (skipper, func) in skippers {
            let ctx = SkipContext {
                context: self.context(skipper.clone()),
                event: Arc::clone(details),
                target: target.clone(),
            };

            match execution::scope(skipper.clone(), SHOULD_SKIP_EVENT, func(ctx)).await {
                Ok(None) => {}
                Ok(Some(reason)) => {
                    tracing::debug!(
                        module = %target,
                        skipped_by = %skipper,
                        "skipped {}: {}",
                        details.name,
                        reason.message
                    );
                    if notify {
                        self.emit(LifecycleEvent::EventSkipped {
                            event: Arc::clone(details),
                            module: target.clone(),
                            skipped_by: skipper,
                            reason: reason.clone(),
                        })
                        .await;
                    }
                    return Some(reason);
                }
                Err(err) => {
                    tracing::error!(
                        module = %skipper,
                        "error in skip handler while checking {} for {}: {}",
                        details.name,
                        target,
                        err
                    );
                }
            }
        }

        None
    }

    async fn run_command(self: &Arc<Self>, invocation: CommandInvocation) {
        let entry = self.registry().command(&invocation.name);
        let Some(entry) = entry else {
            self.emit(LifecycleEvent::FrameworkWarn {
                message: format!("No handler registered for command {}", invocation.name),
            })
            .await;
            return;
        };
        metrics::counter!("switchboard_commands_total", "command" => invocation.name.clone())
            .increment(1);

        let details = Arc::new(EventDetails::interaction(IncomingInteraction::Command(
            invocation.clone(),
        )));
        let invocation = Arc::new(invocation);
        let ctx = CommandContext::new(
            self.context(entry.handle.clone()),
            Arc::clone(&invocation),
        );

        if let Some(reason) = self.should_skip(&details, &entry.handle, true).await {
            let response = reply::message_response(
                &reply::skip_message(&reason.message),
                reason.ephemeral,
            );
            if let Err(err) = ctx.response(response).await {
                self.emit(LifecycleEvent::FrameworkError {
                    message: format!("Failed to send skip notice for {}", entry.handle),
                    error: SharedError::from(err),
                })
                .await;
            }
            return;
        }

        self.emit(LifecycleEvent::RunModule {
            module: entry.handle.clone(),
            interaction: Arc::clone(&invocation),
        })
        .await;

        if !entry.command.accepts(invocation.kind) {
            self.emit(LifecycleEvent::FrameworkWarn {
                message: format!(
                    "Module {} could not handle incoming interaction of type {:?}",
                    entry.handle, invocation.kind
                ),
            })
            .await;
            return;
        }

        let result = command::run(
            entry.command.runnable(),
            entry.handle.clone(),
            ctx.clone(),
        )
        .await;
        if let Err(err) = result {
            self.handle_run_error(&ctx, &entry.handle, err).await;
        }
    }

    async fn handle_run_error(
        self: &Arc<Self>,
        ctx: &CommandContext<T>,
        module: &ModuleHandle,
        err: Error,
    ) {
        let guard_message = err
            .downcast_ref::<GuardError>()
            .map(|guard| reply::guard_message(guard.message()));

        let content = match guard_message {
            Some(content) => content,
            None => {
                let error = SharedError::from(err);
                let content = reply::error_message(error.as_ref());
                let routing = matches!(
                    error.downcast_ref::<FrameworkError>(),
                    Some(framework) if framework.is_routing_error()
                );

                if routing {
                    self.emit(LifecycleEvent::FrameworkError {
                        message: format!("Couldn't route interaction for {}", module),
                        error,
                    })
                    .await;
                } else {
                    self.emit(LifecycleEvent::ApplicationInteractionError {
                        module: module.clone(),
                        interaction: Arc::clone(&ctx.interaction),
                        error,
                    })
                    .await;
                }

                content
            }
        };

        let delivered =
            reply::conditional_reply(ctx, &content, self.options.reply_retry_delay).await;
        if let Err(err) = delivered {
            self.emit(LifecycleEvent::FrameworkError {
                message: format!("Failed to send error reply for {}", module),
                error: SharedError::from(err),
            })
            .await;
        }
    }

    async fn run_autocomplete(self: &Arc<Self>, request: AutocompleteRequest) {
        let request = Arc::new(request);

        let entry = self.registry().command(&request.name);
        let Some(entry) = entry else {
            self.emit(LifecycleEvent::FrameworkWarn {
                message: format!(
                    "No handler registered for autocomplete on {}",
                    request.name
                ),
            })
            .await;
            self.respond_choices(
                &request,
                vec![reply::marker_choice(
                    "No module registered for this interaction",
                    reply::ERROR_MARKER,
                )],
            )
            .await;
            return;
        };

        let details = Arc::new(EventDetails::interaction(IncomingInteraction::Autocomplete(
            (*request).clone(),
        )));
        if let Some(reason) = self.should_skip(&details, &entry.handle, true).await {
            self.respond_choices(
                &request,
                vec![reply::marker_choice(
                    &reply::skip_message(&reason.message),
                    reply::SKIPPED_MARKER,
                )],
            )
            .await;
            return;
        }

        let Some(target) = entry.command.autocompleteable() else {
            self.emit(LifecycleEvent::FrameworkWarn {
                message: format!(
                    "Module {} could not handle incoming autocomplete interaction",
                    entry.handle
                ),
            })
            .await;
            self.respond_choices(
                &request,
                vec![reply::marker_choice(
                    "Wrong module type for this interaction",
                    reply::ERROR_MARKER,
                )],
            )
            .await;
            return;
        };

        let context = self.context(entry.handle.clone());
        let result =
            command::autocomplete(target, entry.handle.clone(), context, Arc::clone(&request))
                .await;
        match result {
            Ok(Some(choices)) => self.respond_choices(&request, choices).await,
            Ok(None) => {}
            Err(err) => {
                self.emit(LifecycleEvent::AutocompleteInteractionError {
                    module: entry.handle.clone(),
                    interaction: Arc::clone(&request),
                    error: SharedError::from(err),
                })
                .await;
                let name = format!(
                    "An error occurred while handling autocomplete for {}",
                    entry.command.name()
                );
                self.respond_choices(
                    &request,
                    vec![reply::marker_choice(&name, reply::ERROR_MARKER)],
                )
                .await;
            }
        }
    }

    async fn respond_choices(
        self: &Arc<Self>,
        request: &AutocompleteRequest,
        choices: Vec<CommandOptionChoice>,
    ) {
        let response = reply::autocomplete_response(choices);
        if let Err(err) = self.platform.create_response(&request.meta, &response).await {
            self.emit(LifecycleEvent::FrameworkError {
                message: format!("Failed to respond to autocomplete for {}", request.name),
                error: SharedError::from(err),
            })
            .await;
        }
    }

    /// Overwrites the platform's stored commands with the registered ones.
    ///
    /// Scopes are put concurrently and independently, a failing scope doesn't
    /// roll back the others and is reported in its own [`ScopeOutcome`].
    pub async fn put_commands(&self, options: PutCommandOptions) -> Vec<ScopeOutcome> {
        let mut commands = self.commands();
        if let Some(names) = &options.commands {
            commands.retain(|command| names.iter().any(|name| name == command.name()));
        }

        let main_scope = options
            .guild_id
            .map_or(CommandScope::Global, CommandScope::Guild);

        let mut main = Vec::new();
        let mut restricted: BTreeMap<Id<GuildMarker>, Vec<CommandDefinition>> = BTreeMap::new();
        for command in &commands {
            let guilds = command.register_only_in_guilds();

            let in_main = options.override_guild_check
                || match (guilds, options.guild_id) {
                    (None, _) => true,
                    (Some(guilds), Some(guild_id)) => guilds.contains(&guild_id),
                    (Some(_), None) => false,
                };
            if in_main {
                main.push(command.definition().clone());
            }

            // restricted puts don't depend on the override
            if !options.register_guild_restricted_commands {
                continue;
            }
            for guild_id in guilds.unwrap_or_default() {
                // the main put already overwrites this guild
                if Some(*guild_id) == options.guild_id {
                    continue;
                }
                restricted
                    .entry(*guild_id)
                    .or_default()
                    .push(command.definition().clone());
            }
        }

        let mut requests = vec![(main_scope, main)];
        requests.extend(
            restricted
                .into_iter()
                .map(|(guild_id, definitions)| (CommandScope::Guild(guild_id), definitions)),
        );

        join_all(requests.into_iter().map(|(scope, mut definitions)| async move {
            definitions.sort_by(|a, b| a.name.cmp(&b.name));
            let names: Vec<String> = definitions.iter().map(|d| d.name.clone()).collect();

            tracing::info!("registering {} command(s) {}", names.len(), scope);
            let result = self.platform.put_commands(scope, &definitions).await;
            match &result {
                Ok(_) => tracing::info!(commands = ?names, "registered commands {}", scope),
                Err(err) => tracing::error!(
                    commands = ?names,
                    "error registering commands {}: {}",
                    scope,
                    err
                ),
            }

            ScopeOutcome {
                scope,
                commands: names,
                result,
            }
        }))
        .await
    }
}

/// Checks every handler key is known and holds the kind of handler it's used for.
fn validate<T>(node: &Node<T>, handle: &ModuleHandle) -> Result<(), FrameworkError> {
    for (key, handler) in node.module().handlers.iter() {
        let expected = match events::classify(key) {
            None => {
                return Err(FrameworkError::UnknownHandlerKey {
                    module: handle.to_string(),
                    key: key.to_string(),
                })
            }
            Some(EventKind::Native | EventKind::Lifecycle) => "listener",
            Some(EventKind::Directed) => match key {
                RUN => RUN,
                AUTOCOMPLETE => AUTOCOMPLETE,
                _ => SHOULD_SKIP_EVENT,
            },
        };

        if handler.kind_name() != expected {
            return Err(FrameworkError::HandlerKindMismatch {
                module: handle.to_string(),
                key: key.to_string(),
                expected,
            });
        }
    }

    Ok(())
}
