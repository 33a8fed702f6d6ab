//! Tracks which module is currently executing.
//!
//! Every handler invocation runs inside a task-local scope bound to the module
//! that owns the handler, so [`current_module`] answers correctly from any depth
//! of the call stack, even while many interactions are in flight on the same
//! runtime. Scopes nest and the outer binding is restored when the inner one
//! finishes.

use std::{fmt, future::Future, sync::Arc};

use tracing::Instrument as _;

tokio::task_local! {
    static CURRENT_MODULE: ModuleHandle;
}

/// Identity of a registered module: its bare name plus its `parent/child` qualified name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModuleHandle {
    name: Arc<str>,
    qualified_name: Arc<str>,
}

impl ModuleHandle {
    pub fn new(name: impl Into<Arc<str>>, qualified_name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            qualified_name: qualified_name.into(),
        }
    }

    /// Handle for a top-level module, qualified name equals bare name.
    pub fn root(name: &str) -> Self {
        Self::new(name, name)
    }

    pub fn child(&self, name: &str) -> Self {
        Self::new(name, format!("{}/{}", self.qualified_name, name))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }
}

impl fmt::Display for ModuleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name)
    }
}

/// The module whose handler is running in the current task, if any.
pub fn current_module() -> Option<ModuleHandle> {
    CURRENT_MODULE.try_with(Clone::clone).ok()
}

/// Runs `fut` with `module` bound as the current module, inside a tracing span for the event.
pub(crate) async fn scope<F: Future>(module: ModuleHandle, event: &str, fut: F) -> F::Output {
    let span = tracing::debug_span!("module", module = %module, event);
    CURRENT_MODULE.scope(module, fut.instrument(span)).await
}
