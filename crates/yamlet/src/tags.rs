//! Tag constructors and the registries they are looked up in.
//!
//! A tag such as `!name` is resolved against the parser's own registry
//! first and then against the process-wide default registry. `!!map`,
//! `!!seq` and `!!str` are built in and cannot be overridden.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, RwLock};

use thiserror::Error;

use crate::decode::resolve::resolve_scalar;
use crate::value::Value;

/// Failure reported by a tag constructor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TagError(pub String);

impl TagError {
    pub fn new(msg: impl Into<String>) -> Self {
        TagError(msg.into())
    }
}

/// Turns the value a tag is attached to into the tagged value.
pub type Constructor = Arc<dyn Fn(Value) -> Result<Value, TagError> + Send + Sync>;

#[derive(Clone, Default)]
pub struct TagRegistry {
    entries: HashMap<String, Constructor>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `constructor` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn(Value) -> Result<Value, TagError> + Send + Sync + 'static,
    {
        self.entries.insert(name.into(), Arc::new(constructor));
    }

    pub fn get(&self, name: &str) -> Option<Constructor> {
        self.entries.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for TagRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("TagRegistry").field("tags", &names).finish()
    }
}

type Builtin = fn(Value) -> Result<Value, TagError>;

const DEFAULT_TAGS: &[(&str, Builtin)] = &[
    ("int", construct_int),
    ("float", construct_float),
    ("bool", construct_bool),
];

static DEFAULTS: LazyLock<RwLock<TagRegistry>> = LazyLock::new(|| {
    let mut registry = TagRegistry::new();
    for &(name, ctor) in DEFAULT_TAGS {
        registry.register(name, ctor);
    }
    RwLock::new(registry)
});

/// Add `constructor` to the process-wide default registry.
///
/// Every parser created afterwards (and every existing one) falls back to
/// this registry for `!name` tags it does not know itself. Registering a
/// name twice keeps the later constructor.
pub fn local_tag<F>(name: impl Into<String>, constructor: F)
where
    F: Fn(Value) -> Result<Value, TagError> + Send + Sync + 'static,
{
    let mut guard = DEFAULTS.write().unwrap_or_else(|e| e.into_inner());
    guard.register(name, constructor);
}

pub(crate) fn default_tag(name: &str) -> Option<Constructor> {
    let guard = DEFAULTS.read().unwrap_or_else(|e| e.into_inner());
    guard.get(name)
}

/// What a tag asks the dispatcher to do with the parsed value.
#[derive(Clone)]
pub(crate) enum TagAction {
    Builtin(Builtin),
    Custom(Constructor),
}

impl TagAction {
    pub(crate) fn apply(&self, value: Value) -> Result<Value, TagError> {
        match self {
            TagAction::Builtin(f) => f(value),
            TagAction::Custom(f) => f(value),
        }
    }
}

pub(crate) fn builtin_tag(name: &str) -> Option<TagAction> {
    let f: Builtin = match name {
        "map" => construct_map,
        "seq" => construct_seq,
        "str" => construct_str,
        _ => return None,
    };
    Some(TagAction::Builtin(f))
}

fn construct_map(value: Value) -> Result<Value, TagError> {
    match value {
        Value::Mapping(_) => Ok(value),
        Value::Null => Ok(Value::Mapping(Vec::new())),
        other => Err(TagError(format!("expected a map, found {}", other.type_name()))),
    }
}

fn construct_seq(value: Value) -> Result<Value, TagError> {
    match value {
        Value::Sequence(_) => Ok(value),
        Value::Null => Ok(Value::Sequence(Vec::new())),
        other => Err(TagError(format!("expected a seq, found {}", other.type_name()))),
    }
}

fn construct_str(value: Value) -> Result<Value, TagError> {
    match value {
        Value::Str(_) => Ok(value),
        v if v.is_primitive() => Ok(Value::Str(v.to_string())),
        other => Err(TagError(format!(
            "cannot convert {} to str",
            other.type_name()
        ))),
    }
}

/// Re-run scalar inference on a string so `!int '42'` and friends work.
fn reresolve(value: Value) -> Value {
    match value {
        Value::Str(s) => resolve_scalar(s.trim()),
        other => other,
    }
}

fn construct_int(value: Value) -> Result<Value, TagError> {
    match reresolve(value) {
        v @ Value::Int(_) => Ok(v),
        other => Err(TagError(format!("expected an int, found {}", other.type_name()))),
    }
}

fn construct_float(value: Value) -> Result<Value, TagError> {
    match reresolve(value) {
        v @ Value::Float(_) => Ok(v),
        Value::Int(i) => Ok(Value::Float(i as f64)),
        other => Err(TagError(format!("expected a float, found {}", other.type_name()))),
    }
}

fn construct_bool(value: Value) -> Result<Value, TagError> {
    match reresolve(value) {
        v @ Value::Bool(_) => Ok(v),
        other => Err(TagError(format!("expected a bool, found {}", other.type_name()))),
    }
}
