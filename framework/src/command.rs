//! Runnable commands and the resolution of an interaction down the command tree.

use std::{collections::HashMap, sync::Arc};

use twilight_model::application::command::{CommandOptionChoice, CommandOptionType};

use crate::{
    context::{AutocompleteContext, AutocompleteValue, CommandContext, Context},
    error::FrameworkError,
    events::{AUTOCOMPLETE, RUN},
    execution::{self, ModuleHandle},
    handler::{noop, AutocompleteFunc, RunFunc},
    interaction::{AutocompleteRequest, CommandInvocation, Focused},
    module::Module,
    Error,
};

pub mod context_menu;
pub mod options;
pub mod slash;

pub use context_menu::{ContextMenuCommand, ContextMenuCommandBuilder};
pub use options::SlashOption;
pub use slash::{
    SlashCommand, SlashCommandBuilder, Subcommand, SubcommandBuilder, SubcommandGroup,
    SubcommandGroupBuilder,
};

/// A level of the command tree that has a `run` handler and may route further down.
pub trait Runnable<T>: Send + Sync {
    fn module(&self) -> &Module<T>;

    fn run_handler(&self) -> RunFunc<T> {
        self.module().handlers.run().unwrap_or(noop)
    }

    /// The next level the invocation names, `None` if this level is the last one.
    fn route(
        &self,
        interaction: &CommandInvocation,
    ) -> Result<Option<Arc<dyn Runnable<T>>>, FrameworkError>;
}

/// A level of the command tree that can answer autocomplete requests.
pub trait Autocompleteable<T>: Send + Sync {
    fn module(&self) -> &Module<T>;

    /// Dedicated handlers keyed by option name.
    fn autocomplete_options(&self) -> &HashMap<String, AutocompleteOption<T>>;

    /// The level the request should be resolved on instead of this one, if any.
    fn delegate(&self, request: &AutocompleteRequest) -> Option<Arc<dyn Autocompleteable<T>>>;
}

/// A dedicated autocomplete handler and the scalar type its option was declared with.
pub struct AutocompleteOption<T> {
    pub kind: CommandOptionType,
    pub handler: AutocompleteFunc<T>,
}

impl<T> Clone for AutocompleteOption<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for AutocompleteOption<T> {}

/// Runs every level from `target` down to the leaf the invocation names, in order.
///
/// An error at any level stops the chain, so a command or group can veto all of its descendants.
pub(crate) async fn run<T: Clone + Send + Sync + 'static>(
    target: Arc<dyn Runnable<T>>,
    handle: ModuleHandle,
    ctx: CommandContext<T>,
) -> Result<(), Error> {
    let mut level = target;
    let mut handle = handle;

    loop {
        let func = level.run_handler();
        execution::scope(handle.clone(), RUN, func(ctx.for_module(handle.clone()))).await?;

        let Some(next) = level.route(&ctx.interaction)? else {
            return Ok(());
        };
        handle = handle.child(next.module().name());
        level = next;
    }
}

/// Resolves an autocomplete request, `Ok(None)` when nothing on the resolved level can answer it.
pub(crate) async fn autocomplete<T: Clone + Send + Sync + 'static>(
    target: Arc<dyn Autocompleteable<T>>,
    handle: ModuleHandle,
    context: Context<T>,
    request: Arc<AutocompleteRequest>,
) -> Result<Option<Vec<CommandOptionChoice>>, Error> {
    let mut level = target;
    let mut handle = handle;
    while let Some(next) = level.delegate(&request) {
        handle = handle.child(next.module().name());
        level = next;
    }

    let focused = request
        .focused()
        .ok_or_else(|| FrameworkError::NoFocusedOption(handle.to_string()))?;
    let value = focused_value(&focused);

    let func = match level.autocomplete_options().get(focused.name) {
        Some(option) => {
            if !accepts(option.kind, &value) {
                return Err(FrameworkError::AutocompleteTypeMismatch {
                    module: handle.to_string(),
                    option: focused.name.to_string(),
                    value: focused.value.to_string(),
                    received: focused.kind,
                    expected: option.kind,
                }
                .into());
            }
            option.handler
        }
        None => match level.module().handlers.autocomplete() {
            Some(func) => func,
            None => return Ok(None),
        },
    };

    let ctx = AutocompleteContext {
        context: Context {
            module: handle.clone(),
            ..context
        },
        request: Arc::clone(&request),
        name: focused.name.to_string(),
        value,
    };

    execution::scope(handle, AUTOCOMPLETE, func(ctx)).await.map(Some)
}

/// Types the raw focused value by the option type the platform reported.
fn focused_value(focused: &Focused<'_>) -> AutocompleteValue {
    let raw = focused.value.trim();
    match focused.kind {
        CommandOptionType::Integer if raw.is_empty() => AutocompleteValue::Integer(0),
        CommandOptionType::Number if raw.is_empty() => AutocompleteValue::Number(0.0),
        CommandOptionType::Integer => match raw.parse() {
            Ok(value) => AutocompleteValue::Integer(value),
            Err(_) => AutocompleteValue::String(focused.value.to_string()),
        },
        CommandOptionType::Number => match raw.parse() {
            Ok(value) => AutocompleteValue::Number(value),
            Err(_) => AutocompleteValue::String(focused.value.to_string()),
        },
        _ => AutocompleteValue::String(focused.value.to_string()),
    }
}

fn accepts(declared: CommandOptionType, value: &AutocompleteValue) -> bool {
    match declared {
        CommandOptionType::String => matches!(value, AutocompleteValue::String(_)),
        CommandOptionType::Integer | CommandOptionType::Number => matches!(
            value,
            AutocompleteValue::Integer(_) | AutocompleteValue::Number(_)
        ),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn focused(value: &str, kind: CommandOptionType) -> Focused<'_> {
        Focused {
            name: "option",
            value,
            kind,
        }
    }

    #[test]
    fn focused_value_test() {
        assert_eq!(
            focused_value(&focused("12", CommandOptionType::Integer)),
            AutocompleteValue::Integer(12)
        );
        assert_eq!(
            focused_value(&focused("", CommandOptionType::Integer)),
            AutocompleteValue::Integer(0)
        );
        assert_eq!(
            focused_value(&focused("1.5", CommandOptionType::Number)),
            AutocompleteValue::Number(1.5)
        );
        assert_eq!(
            focused_value(&focused("abc", CommandOptionType::Integer)),
            AutocompleteValue::String("abc".into())
        );
        assert_eq!(
            focused_value(&focused("12", CommandOptionType::String)),
            AutocompleteValue::String("12".into())
        );
    }

    #[test]
    fn accepts_test() {
        let string = AutocompleteValue::String("a".into());
        let integer = AutocompleteValue::Integer(1);
        let number = AutocompleteValue::Number(1.0);

        assert!(accepts(CommandOptionType::String, &string));
        assert!(!accepts(CommandOptionType::String, &integer));
        assert!(accepts(CommandOptionType::Integer, &integer));
        assert!(accepts(CommandOptionType::Integer, &number));
        assert!(accepts(CommandOptionType::Number, &integer));
        assert!(!accepts(CommandOptionType::Integer, &string));
        assert!(!accepts(CommandOptionType::Boolean, &string));
    }
}
