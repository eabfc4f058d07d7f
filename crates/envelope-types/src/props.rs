//! Option set and the builder abstraction that fills it.
//!
//! [`Properties`] is a string-keyed map of untyped values. Builders write
//! caller choices with [`PropertyBuilder::put`] and inject their own defaults
//! from [`PropertyBuilder::add_defaults`] through
//! [`PropertyBuilder::add_if_absent`], so a default never replaces a value
//! the caller set.

use crate::keys;
use crate::registry::PayloadType;
use std::collections::BTreeMap;
use std::fmt;

/// An untyped option value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    String(String),
    Int(i64),
    Bool(bool),
    /// A resolved payload type descriptor.
    Type(PayloadType),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&PayloadType> {
        match self {
            PropertyValue::Type(t) => Some(t),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => write!(f, "{s}"),
            PropertyValue::Int(n) => write!(f, "{n}"),
            PropertyValue::Bool(b) => write!(f, "{b}"),
            PropertyValue::Type(t) => write!(f, "{}", t.name()),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Int(value.into())
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        PropertyValue::Int(value.into())
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<PayloadType> for PropertyValue {
    fn from(value: PayloadType) -> Self {
        PropertyValue::Type(value)
    }
}

/// The option set handed to the Kafka client.
///
/// Keys are unique and the last [`Properties::put`] wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    entries: BTreeMap<String, PropertyValue>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, returning the one it replaced.
    pub fn put(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Option<PropertyValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// Store a value only when the key is absent. Returns whether it was stored.
    pub fn add_if_absent(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> bool {
        let key = key.into();
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, value.into());
        true
    }

    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        self.entries.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.entries.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(PropertyValue::as_str)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(PropertyValue::as_int)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(PropertyValue::as_bool)
    }

    pub fn get_type(&self, key: &str) -> Option<&PayloadType> {
        self.get(key).and_then(PropertyValue::as_type)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entries librdkafka understands, rendered as strings.
    ///
    /// Skips [`keys::CLIENT_SIDE`] keys and type descriptors.
    pub fn transport_entries(&self) -> impl Iterator<Item = (&str, String)> {
        self.iter()
            .filter(|(key, value)| {
                !keys::CLIENT_SIDE.contains(key) && !matches!(value, PropertyValue::Type(_))
            })
            .map(|(key, value)| (key, value.to_string()))
    }
}

/// Accumulates an option set.
///
/// Implementors expose their [`Properties`] and may override
/// [`PropertyBuilder::add_defaults`] to fill their own defaults before the
/// option set is finalized. Builders are used once, from a single thread.
pub trait PropertyBuilder {
    fn properties(&self) -> &Properties;

    fn properties_mut(&mut self) -> &mut Properties;

    /// Store or overwrite a value.
    fn put(&mut self, key: &str, value: impl Into<PropertyValue>) {
        self.properties_mut().put(key, value);
    }

    /// Store a default; never replaces an existing value.
    fn add_if_absent(&mut self, key: &str, value: impl Into<PropertyValue>) -> bool {
        self.properties_mut().add_if_absent(key, value)
    }

    /// Hook run right before finalization.
    fn add_defaults(&mut self) {}
}

/// Join values into the comma-separated form used by multi-host fields.
pub fn to_comma_separated<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|value| value.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(",")
}
