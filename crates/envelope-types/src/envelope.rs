//! Envelope wire type.
//!
//! Every value published through the producer is wrapped in an [`Envelope`]
//! and encoded as JSON:
//!
//! ```text
//! {"payload": <value>, "headers": {"trace-id": "abc"}}
//! ```
//!
//! `headers` is omitted when empty and defaults to empty when absent, so an
//! envelope always round-trips to an equal envelope.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// String headers carried next to the payload.
pub type Headers = BTreeMap<String, String>;

/// A payload plus optional string headers.
///
/// Immutable once constructed. Two envelopes are equal iff their payloads
/// and headers are equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    payload: T,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    headers: Headers,
}

impl<T> Envelope<T> {
    /// Wrap a payload with empty headers.
    pub fn of(payload: T) -> Self {
        Self {
            payload,
            headers: Headers::new(),
        }
    }

    /// Wrap a payload with the given headers.
    pub fn with_headers(payload: T, headers: Headers) -> Self {
        Self { payload, headers }
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Look up a single header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn into_payload(self) -> T {
        self.payload
    }

    pub fn into_parts(self) -> (T, Headers) {
        (self.payload, self.headers)
    }

    /// Transform the payload, keeping the headers.
    pub fn map<U, F>(self, f: F) -> Envelope<U>
    where
        F: FnOnce(T) -> U,
    {
        Envelope {
            payload: f(self.payload),
            headers: self.headers,
        }
    }
}

/// A payload whose concrete type was resolved at runtime.
///
/// Produced by [`crate::PayloadType::decode`]. Callers recover the concrete
/// value with [`AnyPayload::downcast`] or [`Envelope::downcast`].
pub struct AnyPayload {
    type_name: Arc<str>,
    value: Box<dyn Any + Send + Sync>,
}

impl AnyPayload {
    pub fn new<T>(type_name: impl Into<Arc<str>>, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            type_name: type_name.into(),
            value: Box::new(value),
        }
    }

    /// Registered name of the payload type (not the Rust type name).
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Take the concrete value out, or give `self` back on a type mismatch.
    pub fn downcast<T: Any>(self) -> std::result::Result<T, Self> {
        let type_name = self.type_name;
        match self.value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => Err(Self { type_name, value }),
        }
    }
}

impl fmt::Debug for AnyPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyPayload")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

impl Envelope<AnyPayload> {
    /// Recover a typed envelope, or give the envelope back on a type mismatch.
    pub fn downcast<T: Any>(self) -> std::result::Result<Envelope<T>, Self> {
        let (payload, headers) = self.into_parts();
        match payload.downcast::<T>() {
            Ok(payload) => Ok(Envelope::with_headers(payload, headers)),
            Err(payload) => Err(Envelope::with_headers(payload, headers)),
        }
    }

    /// Registered name of the payload type.
    pub fn type_name(&self) -> &str {
        self.payload.type_name()
    }
}
