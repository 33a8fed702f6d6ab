use std::{ops::Deref, sync::Arc};

use super::Context;
use crate::interaction::AutocompleteRequest;

/// Value of the focused option, typed according to the option's declaration.
#[derive(Clone, Debug, PartialEq)]
pub enum AutocompleteValue {
    String(String),
    Integer(i64),
    Number(f64),
}

pub struct AutocompleteContext<T> {
    pub context: Context<T>,
    pub request: Arc<AutocompleteRequest>,
    /// Name of the focused option.
    pub name: String,
    pub value: AutocompleteValue,
}

impl<T> Deref for AutocompleteContext<T> {
    type Target = Context<T>;

    fn deref(&self) -> &Self::Target {
        &self.context
    }
}
