//! Record serializers.
//!
//! `key.serializer` and `value.serializer` name these by their type name, the
//! same way the consumer names its deserializers.

use crate::error::Result;
use envelope_types::Envelope;
use serde::Serialize;
use std::any::type_name;

/// UTF-8 key codec. The default `key.serializer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringSerializer;

impl StringSerializer {
    pub fn serialize(&self, key: &str) -> Vec<u8> {
        key.as_bytes().to_vec()
    }
}

/// Encodes an [`Envelope`] as JSON. The default `value.serializer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEnvelopeSerializer;

impl JsonEnvelopeSerializer {
    pub fn serialize<V: Serialize>(&self, envelope: &Envelope<V>) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(envelope)?)
    }
}

pub fn key_serializer_name() -> &'static str {
    type_name::<StringSerializer>()
}

pub fn value_serializer_name() -> &'static str {
    type_name::<JsonEnvelopeSerializer>()
}
