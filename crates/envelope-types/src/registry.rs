//! Payload type registry.
//!
//! Consumers decode envelopes whose payload type is only known by name at
//! configuration time. Each registered name maps to a [`PayloadType`], a
//! type-erased JSON factory that reconstructs `Envelope<T>` and boxes the
//! payload as an [`AnyPayload`].
//!
//! Registration happens at process startup, either on an explicit
//! [`TypeRegistry`] or on the process-wide one behind [`global`].

use crate::envelope::{AnyPayload, Envelope};
use crate::error::{EnvelopeTypesError, Result};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

type DecodeFn = dyn Fn(&[u8]) -> serde_json::Result<Envelope<AnyPayload>> + Send + Sync;

/// A resolved payload type descriptor.
///
/// Cheap to clone. Two descriptors are equal iff their names are equal.
#[derive(Clone)]
pub struct PayloadType {
    name: Arc<str>,
    decode: Arc<DecodeFn>,
}

impl PayloadType {
    /// Describe `T` under the given name.
    pub fn of<T>(name: impl Into<Arc<str>>) -> Self
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let name: Arc<str> = name.into();
        let type_name = Arc::clone(&name);
        let decode = move |bytes: &[u8]| -> serde_json::Result<Envelope<AnyPayload>> {
            let envelope: Envelope<T> = serde_json::from_slice(bytes)?;
            Ok(envelope.map(|payload| AnyPayload::new(Arc::clone(&type_name), payload)))
        };
        Self {
            name,
            decode: Arc::new(decode),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Decode a JSON envelope into this type.
    ///
    /// Either the whole envelope decodes or an error is returned.
    pub fn decode(&self, bytes: &[u8]) -> serde_json::Result<Envelope<AnyPayload>> {
        (self.decode)(bytes)
    }
}

impl PartialEq for PayloadType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for PayloadType {}

impl fmt::Debug for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PayloadType").field(&self.name).finish()
    }
}

/// Maps payload type names to descriptors.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, PayloadType>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` under `name` and return its descriptor.
    pub fn register<T>(&mut self, name: &str) -> Result<PayloadType>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let payload_type = PayloadType::of::<T>(name);
        self.insert(payload_type.clone())?;
        Ok(payload_type)
    }

    /// Add an existing descriptor. Names are registered once.
    pub fn insert(&mut self, payload_type: PayloadType) -> Result<()> {
        if payload_type.name().is_empty() {
            return Err(EnvelopeTypesError::EmptyTypeName);
        }
        if self.types.contains_key(payload_type.name()) {
            return Err(EnvelopeTypesError::DuplicateType(
                payload_type.name().to_string(),
            ));
        }
        self.types
            .insert(payload_type.name().to_string(), payload_type);
        Ok(())
    }

    /// Look up a descriptor by name.
    pub fn resolve(&self, name: &str) -> Result<PayloadType> {
        self.types
            .get(name)
            .cloned()
            .ok_or_else(|| EnvelopeTypesError::TypeNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

static GLOBAL: OnceLock<RwLock<TypeRegistry>> = OnceLock::new();

/// The process-wide registry.
pub fn global() -> &'static RwLock<TypeRegistry> {
    GLOBAL.get_or_init(|| RwLock::new(TypeRegistry::new()))
}

/// Register `T` on the process-wide registry.
pub fn register<T>(name: &str) -> Result<PayloadType>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    global()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register::<T>(name)
}

/// Resolve a name on the process-wide registry.
pub fn resolve(name: &str) -> Result<PayloadType> {
    global()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .resolve(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::Headers;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Order {
        id: u64,
        sku: String,
    }

    #[test]
    fn test_register_and_resolve() {
        let mut registry = TypeRegistry::new();
        let registered = registry.register::<Order>("orders.Order").unwrap();
        let resolved = registry.resolve("orders.Order").unwrap();

        assert_eq!(registered, resolved);
        assert_eq!(resolved.name(), "orders.Order");
        assert!(registry.contains("orders.Order"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_resolve_unknown_name() {
        let registry = TypeRegistry::new();
        let err = registry.resolve("missing.Type").unwrap_err();
        assert!(matches!(err, EnvelopeTypesError::TypeNotFound(name) if name == "missing.Type"));
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut registry = TypeRegistry::new();
        registry.register::<Order>("orders.Order").unwrap();
        let err = registry.register::<String>("orders.Order").unwrap_err();
        assert!(matches!(err, EnvelopeTypesError::DuplicateType(_)));
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let mut registry = TypeRegistry::new();
        let err = registry.register::<Order>("").unwrap_err();
        assert!(matches!(err, EnvelopeTypesError::EmptyTypeName));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_decode_reconstructs_envelope() {
        let payload_type = PayloadType::of::<Order>("orders.Order");
        let bytes = br#"{"payload":{"id":1,"sku":"A-1"},"headers":{"source":"web"}}"#;

        let envelope = payload_type.decode(bytes).unwrap();
        assert_eq!(envelope.type_name(), "orders.Order");

        let mut headers = Headers::new();
        headers.insert("source".to_string(), "web".to_string());
        let expected = Envelope::with_headers(
            Order {
                id: 1,
                sku: "A-1".to_string(),
            },
            headers,
        );
        assert_eq!(envelope.downcast::<Order>().unwrap(), expected);
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        let payload_type = PayloadType::of::<Order>("orders.Order");
        assert!(payload_type.decode(br#"{"payload":{"id":"x"}}"#).is_err());
        assert!(payload_type.decode(br#"{"payload":{"id":1,"sku""#).is_err());
    }

    #[test]
    fn test_names_are_sorted() {
        let mut registry = TypeRegistry::new();
        registry.register::<u32>("b").unwrap();
        registry.register::<u32>("a").unwrap();
        assert_eq!(registry.names(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_global_registry() {
        register::<Order>("registry-tests.Order").unwrap();
        assert_eq!(
            resolve("registry-tests.Order").unwrap().name(),
            "registry-tests.Order"
        );
        assert!(resolve("registry-tests.Missing").is_err());
    }
}
