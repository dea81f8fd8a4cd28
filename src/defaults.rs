//! Client-wide default context fields.

use crate::value::{Context, ContextValue};

/// Registry of default fields merged under every caller context.
///
/// Deferred entries run on each log call, so values such as a per-call
/// counter or clock reading change between messages.
#[derive(Clone, Debug, Default)]
pub struct DefaultsRegistry {
    fields: Context,
}

impl DefaultsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the default for `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        self.fields.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Merge `context` over the registered defaults; caller keys win.
    pub fn apply(&self, context: Context) -> Context {
        if self.fields.is_empty() {
            return context;
        }
        context.merged_over(&self.fields)
    }
}
