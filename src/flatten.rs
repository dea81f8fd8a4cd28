//! Reduce nested contexts to GELF additional fields.

use std::collections::BTreeMap;

use crate::value::{Context, ContextValue};

/// Flat `_`-prefixed field name to string value mapping.
pub type AdditionalFields = BTreeMap<String, String>;

/// Flatten `context` into additional fields.
///
/// Nested keys are joined with `_`, the result is lowercased and prefixed
/// with `_` unless it already starts with one. Deferred values run once,
/// `Null`, empty and unconvertible values are dropped, and later keys
/// overwrite earlier ones that flatten to the same name.
pub fn flatten(context: &Context) -> AdditionalFields {
    let mut output = AdditionalFields::new();
    flatten_into(context, "", &mut output);
    output
}

fn flatten_into(context: &Context, prefix: &str, output: &mut AdditionalFields) {
    for (key, value) in context.iter() {
        let resolved;
        let value = match value {
            ContextValue::Deferred(_) => {
                resolved = value.clone().resolve();
                &resolved
            }
            other => other,
        };
        match value {
            ContextValue::Map(nested) => {
                flatten_into(nested, &format!("{prefix}{key}_"), output);
            }
            scalar => {
                let Some(text) = scalar.scalar_string().filter(|s| !s.is_empty()) else {
                    continue;
                };
                output.insert(field_name(prefix, key), text);
            }
        }
    }
}

fn field_name(prefix: &str, key: &str) -> String {
    let name = format!("{prefix}{key}").to_lowercase();
    if name.starts_with('_') {
        name
    } else {
        format!("_{name}")
    }
}
