//! JSON envelope deserializer with runtime payload type resolution.

use super::{Deserializer, RecordValue};
use crate::error::{Error, Result};
use envelope_types::{keys, registry, AnyPayload, Envelope, PayloadType, Properties, TypeRegistry};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
enum State {
    Unconfigured,
    Configured(PayloadType),
    Closed,
}

/// Decodes JSON envelopes into the payload type named by `deserializer.class`.
///
/// The name is resolved once, in [`TypedDeserializer::configure`], against
/// the type registry. A descriptor carried in `deserializer.type` under the
/// same name is accepted when the registry does not know the name. After
/// that every record is decoded with the cached descriptor.
#[derive(Debug)]
pub struct TypedDeserializer {
    registry: Option<Arc<TypeRegistry>>,
    state: State,
}

impl TypedDeserializer {
    /// Resolve names against the process-wide registry.
    pub fn new() -> Self {
        Self {
            registry: None,
            state: State::Unconfigured,
        }
    }

    /// Resolve names against `registry`.
    pub fn with_registry(registry: Arc<TypeRegistry>) -> Self {
        Self {
            registry: Some(registry),
            state: State::Unconfigured,
        }
    }

    /// Read `deserializer.class` and resolve it to a payload type.
    pub fn configure(&mut self, properties: &Properties) -> Result<()> {
        match self.state {
            State::Unconfigured => {}
            State::Configured(_) => {
                return Err(Error::InvalidConfig(
                    "TypedDeserializer is already configured".to_string(),
                ))
            }
            State::Closed => {
                return Err(Error::InvalidConfig(
                    "TypedDeserializer is closed".to_string(),
                ))
            }
        }

        let class_name = properties
            .get_str(keys::DESERIALIZER_CLASS)
            .unwrap_or_default();
        if class_name.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "Property [{}] must be informed",
                keys::DESERIALIZER_CLASS
            )));
        }

        let payload_type = self.resolve(class_name, properties)?;
        debug!("TypedDeserializer bound to payload type {}", payload_type.name());
        self.state = State::Configured(payload_type);
        Ok(())
    }

    fn resolve(&self, name: &str, properties: &Properties) -> Result<PayloadType> {
        let resolved = match &self.registry {
            Some(registry) => registry.resolve(name),
            None => registry::resolve(name),
        };

        resolved.or_else(|source| {
            properties
                .get_type(keys::DESERIALIZER_TYPE)
                .filter(|carried| carried.name() == name)
                .cloned()
                .ok_or_else(|| Error::UnresolvedType {
                    message: format!(
                        "Error when configuring deserializable type. Type: {name} not found in registry"
                    ),
                    source,
                })
        })
    }

    /// Decode one record.
    pub fn deserialize(&self, topic: &str, data: &[u8]) -> Result<Envelope<AnyPayload>> {
        let payload_type = match &self.state {
            State::Configured(payload_type) => payload_type,
            State::Unconfigured => {
                return Err(Error::InvalidConfig(
                    "TypedDeserializer used before configure".to_string(),
                ))
            }
            State::Closed => {
                return Err(Error::InvalidConfig(
                    "TypedDeserializer used after close".to_string(),
                ))
            }
        };

        payload_type
            .decode(data)
            .map_err(|e| Error::Deserialization {
                message: format!(
                    "Error when deserializing record from topic '{topic}' into {}",
                    payload_type.name()
                ),
                source: Box::new(e),
            })
    }

    /// The bound payload type, once configured.
    pub fn payload_type(&self) -> Option<&PayloadType> {
        match &self.state {
            State::Configured(payload_type) => Some(payload_type),
            _ => None,
        }
    }

    /// Idempotent; holds no resources beyond the cached descriptor.
    ///
    /// Once closed, `deserialize` and `configure` fail with a configuration
    /// error.
    pub fn close(&mut self) {
        self.state = State::Closed;
    }
}

impl Default for TypedDeserializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Deserializer for TypedDeserializer {
    fn configure(&mut self, properties: &Properties, _is_key: bool) -> Result<()> {
        TypedDeserializer::configure(self, properties)
    }

    fn deserialize(&self, topic: &str, data: &[u8]) -> Result<RecordValue> {
        TypedDeserializer::deserialize(self, topic, data).map(RecordValue::Envelope)
    }

    fn close(&mut self) {
        TypedDeserializer::close(self)
    }
}
