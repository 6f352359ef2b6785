//! # Attribute Values
//!
//! The value type that flows through resolution. Plain data is carried as
//! `serde_json::Value`; associations resolve to live [`Instance`]s. A raw
//! [`Sequence`] handle can also travel through a dynamic block, but it is never a
//! valid resolved value and the resolver rejects it.

use crate::persistence::Instance;
use crate::sequence::Sequence;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Ordered attribute name to value mapping
pub type AttributeMap = IndexMap<String, AttributeValue>;

/// Caller-supplied attribute overrides
pub type Overrides = AttributeMap;

#[derive(Clone)]
pub enum AttributeValue {
    /// Plain data: strings, numbers, booleans, null, nested JSON
    Value(Value),
    /// A live object produced by another factory (or handed in by the caller)
    Record(Instance),
    /// A raw sequence accessor
    Sequence(Arc<Sequence>),
}

impl AttributeValue {
    pub fn null() -> Self {
        AttributeValue::Value(Value::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Value(Value::Null))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            AttributeValue::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_value().and_then(Value::as_bool)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_value().and_then(Value::as_i64)
    }

    pub fn as_record(&self) -> Option<&Instance> {
        match self {
            AttributeValue::Record(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, AttributeValue::Sequence(_))
    }

    /// Flatten into plain JSON. Records become a snapshot of their attributes.
    pub fn to_json(&self) -> Value {
        match self {
            AttributeValue::Value(value) => value.clone(),
            AttributeValue::Record(instance) => instance.to_json(),
            AttributeValue::Sequence(_) => Value::Null,
        }
    }

    /// Text form used when a block interpolates a sibling attribute
    pub fn to_text(&self) -> String {
        match self {
            AttributeValue::Value(Value::String(text)) => text.clone(),
            AttributeValue::Value(Value::Null) => String::new(),
            other => other.to_json().to_string(),
        }
    }
}

/// Convert an attribute map into a plain JSON object, preserving order
pub fn to_json_map(attributes: &AttributeMap) -> Map<String, Value> {
    attributes
        .iter()
        .map(|(name, value)| (name.clone(), value.to_json()))
        .collect()
}

/// Build an attribute map from a JSON object. Anything else is rejected.
pub fn from_json_object(value: Value) -> Option<AttributeMap> {
    match value {
        Value::Object(fields) => Some(
            fields
                .into_iter()
                .map(|(name, value)| (name, AttributeValue::Value(value)))
                .collect(),
        ),
        _ => None,
    }
}

impl PartialEq for AttributeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AttributeValue::Value(a), AttributeValue::Value(b)) => a == b,
            (AttributeValue::Record(a), AttributeValue::Record(b)) => a.ptr_eq(b),
            (AttributeValue::Sequence(a), AttributeValue::Sequence(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Value(value) => write!(f, "{value}"),
            AttributeValue::Record(instance) => write!(f, "{instance:?}"),
            AttributeValue::Sequence(sequence) => write!(f, "<sequence {}>", sequence.name()),
        }
    }
}

impl From<Value> for AttributeValue {
    fn from(value: Value) -> Self {
        AttributeValue::Value(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Value(Value::String(value.to_string()))
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Value(Value::String(value))
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Value(Value::Bool(value))
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        AttributeValue::Value(Value::from(value))
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Value(Value::from(value))
    }
}

impl From<u64> for AttributeValue {
    fn from(value: u64) -> Self {
        AttributeValue::Value(Value::from(value))
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Value(Value::from(value))
    }
}

impl From<Instance> for AttributeValue {
    fn from(instance: Instance) -> Self {
        AttributeValue::Record(instance)
    }
}

impl From<Arc<Sequence>> for AttributeValue {
    fn from(sequence: Arc<Sequence>) -> Self {
        AttributeValue::Sequence(sequence)
    }
}

impl<T: Into<AttributeValue>> From<Option<T>> for AttributeValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_else(AttributeValue::null)
    }
}

/// Build an [`AttributeMap`] inline: `attrs! { "first_name" => "Bill", "admin" => true }`
#[macro_export]
macro_rules! attrs {
    () => {
        $crate::attributes::AttributeMap::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::attributes::AttributeMap::new();
        $(
            map.insert(
                ::std::string::String::from($name),
                $crate::attributes::AttributeValue::from($value),
            );
        )+
        map
    }};
}
