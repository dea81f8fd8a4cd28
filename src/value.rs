//! Structured context attached to log calls.
//!
//! A [`Context`] is an insertion-ordered map from keys to [`ContextValue`]s.
//! Values may nest further contexts or defer their computation to a
//! [`Deferred`] provider that runs each time the context is flattened.

use std::fmt;
use std::sync::Arc;

/// Zero-argument provider resolved at flatten time.
///
/// The provider runs on every resolution; results are never cached.
#[derive(Clone)]
pub struct Deferred(Arc<dyn Fn() -> ContextValue + Send + Sync>);

impl Deferred {
    /// Wrap `provider` so it runs whenever the value is resolved.
    pub fn new<F, V>(provider: F) -> Self
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: Into<ContextValue>,
    {
        Self(Arc::new(move || provider().into()))
    }

    /// Invoke the provider once.
    pub fn resolve(&self) -> ContextValue {
        (self.0)()
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Deferred(..)")
    }
}

/// A single context value.
#[derive(Clone, Debug, Default)]
pub enum ContextValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Map(Context),
    Deferred(Deferred),
}

impl ContextValue {
    /// Build a deferred value from a provider closure.
    pub fn deferred<F, V>(provider: F) -> Self
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: Into<ContextValue>,
    {
        Self::Deferred(Deferred::new(provider))
    }

    /// Return `true` for [`ContextValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Run a deferred provider once; other values are returned unchanged.
    ///
    /// A provider that yields another deferred value resolves to `Null`.
    pub fn resolve(self) -> ContextValue {
        match self {
            Self::Deferred(deferred) => match deferred.resolve() {
                Self::Deferred(_) => Self::Null,
                resolved => resolved,
            },
            other => other,
        }
    }

    /// Canonical string form of a scalar.
    ///
    /// Returns `None` for `Null`, maps, unresolved deferred values and
    /// non-finite floats.
    pub fn scalar_string(&self) -> Option<String> {
        match self {
            Self::Bool(b) => Some(b.to_string()),
            Self::Int(i) => Some(i.to_string()),
            Self::UInt(u) => Some(u.to_string()),
            Self::Float(f) if f.is_finite() => Some(f.to_string()),
            Self::Str(s) => Some(s.clone()),
            Self::Float(_) | Self::Null | Self::Map(_) | Self::Deferred(_) => None,
        }
    }
}

macro_rules! impl_from_scalar {
    ($variant:ident, $target:ty; $($source:ty),+ $(,)?) => {
        $(
            impl From<$source> for ContextValue {
                fn from(value: $source) -> Self {
                    ContextValue::$variant(<$target>::from(value))
                }
            }
        )+
    };
}

impl_from_scalar!(Int, i64; i8, i16, i32, i64);
impl_from_scalar!(UInt, u64; u8, u16, u32, u64);
impl_from_scalar!(Float, f64; f32, f64);
impl_from_scalar!(Bool, bool; bool);

impl From<isize> for ContextValue {
    fn from(value: isize) -> Self {
        i64::try_from(value).map_or_else(|_| ContextValue::Str(value.to_string()), Self::Int)
    }
}

impl From<usize> for ContextValue {
    fn from(value: usize) -> Self {
        u64::try_from(value).map_or_else(|_| ContextValue::Str(value.to_string()), Self::UInt)
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        ContextValue::Str(value.to_owned())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        ContextValue::Str(value)
    }
}

impl From<&String> for ContextValue {
    fn from(value: &String) -> Self {
        ContextValue::Str(value.clone())
    }
}

impl From<Context> for ContextValue {
    fn from(value: Context) -> Self {
        ContextValue::Map(value)
    }
}

impl From<Deferred> for ContextValue {
    fn from(value: Deferred) -> Self {
        ContextValue::Deferred(value)
    }
}

impl<T: Into<ContextValue>> From<Option<T>> for ContextValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ContextValue::Null, Into::into)
    }
}

/// Sequences become maps keyed by their index.
impl<T: Into<ContextValue>> From<Vec<T>> for ContextValue {
    fn from(values: Vec<T>) -> Self {
        ContextValue::Map(
            values
                .into_iter()
                .enumerate()
                .map(|(index, value)| (index.to_string(), value.into()))
                .collect(),
        )
    }
}

impl From<serde_json::Value> for ContextValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => ContextValue::Null,
            Value::Bool(b) => ContextValue::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    ContextValue::Int(i)
                } else if let Some(u) = n.as_u64() {
                    ContextValue::UInt(u)
                } else {
                    n.as_f64().map_or(ContextValue::Null, ContextValue::Float)
                }
            }
            Value::String(s) => ContextValue::Str(s),
            Value::Array(items) => items.into(),
            Value::Object(map) => ContextValue::Map(map.into_iter().collect()),
        }
    }
}

/// Insertion-ordered key/value context.
///
/// Inserting an existing key replaces its value in place, so the key keeps
/// its original position. New keys are appended.
#[derive(Clone, Debug, Default)]
pub struct Context {
    entries: Vec<(String, ContextValue)>,
}

impl Context {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace `key`, returning the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ContextValue>,
    ) -> Option<ContextValue> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Look up `key`.
    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.entries
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    /// Return `true` if `key` is present, even with a `Null` value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Return `true` if `key` is missing or maps to `Null`.
    pub fn is_vacant(&self, key: &str) -> bool {
        self.get(key).is_none_or(ContextValue::is_null)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContextValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Overlay `self` on top of `base`; keys in `self` win.
    pub fn merged_over(self, base: &Context) -> Context {
        let mut merged = base.clone();
        merged.extend(self);
        merged
    }
}

impl<K, V> FromIterator<(K, V)> for Context
where
    K: Into<String>,
    V: Into<ContextValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut context = Context::new();
        context.extend(iter);
        context
    }
}

impl<K, V> Extend<(K, V)> for Context
where
    K: Into<String>,
    V: Into<ContextValue>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl IntoIterator for Context {
    type Item = (String, ContextValue);
    type IntoIter = std::vec::IntoIter<(String, ContextValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
