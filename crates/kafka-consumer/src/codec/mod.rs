//! Record deserializers.
//!
//! The option set names a deserializer per side (`key.deserializer`,
//! `value.deserializer`) by its fully-qualified type name. The consumer
//! instantiates the named codec, binds it with [`Deserializer::configure`],
//! and runs every record through it.

mod typed;

pub use typed::TypedDeserializer;

use crate::error::{Error, Result};
use envelope_types::{AnyPayload, Envelope, PayloadType, Properties, TypeRegistry};
use std::any::{type_name, Any};
use std::sync::Arc;

/// Turns raw record bytes into a [`RecordValue`].
pub trait Deserializer: Send + Sync {
    /// Bind to the option set. Runs once, before the first record.
    fn configure(&mut self, properties: &Properties, is_key: bool) -> Result<()>;

    fn deserialize(&self, topic: &str, data: &[u8]) -> Result<RecordValue>;

    fn close(&mut self) {}
}

/// A decoded record key or value.
#[derive(Debug)]
pub enum RecordValue {
    String(String),
    Bytes(Vec<u8>),
    Envelope(Envelope<AnyPayload>),
}

impl RecordValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RecordValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            RecordValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_envelope(&self) -> Option<&Envelope<AnyPayload>> {
        match self {
            RecordValue::Envelope(e) => Some(e),
            _ => None,
        }
    }

    /// Take the envelope out as `Envelope<T>` if this is an envelope of `T`.
    pub fn into_envelope<T: Any>(self) -> Option<Envelope<T>> {
        match self {
            RecordValue::Envelope(e) => e.downcast::<T>().ok(),
            _ => None,
        }
    }
}

/// UTF-8 string codec. The default for both keys and values.
#[derive(Debug, Default)]
pub struct StringDeserializer;

impl Deserializer for StringDeserializer {
    fn configure(&mut self, _properties: &Properties, _is_key: bool) -> Result<()> {
        Ok(())
    }

    fn deserialize(&self, topic: &str, data: &[u8]) -> Result<RecordValue> {
        String::from_utf8(data.to_vec())
            .map(RecordValue::String)
            .map_err(|e| Error::Deserialization {
                message: format!("Invalid UTF-8 in record from topic '{topic}'"),
                source: Box::new(e),
            })
    }
}

/// Passes bytes through untouched.
#[derive(Debug, Default)]
pub struct BytesDeserializer;

impl Deserializer for BytesDeserializer {
    fn configure(&mut self, _properties: &Properties, _is_key: bool) -> Result<()> {
        Ok(())
    }

    fn deserialize(&self, _topic: &str, data: &[u8]) -> Result<RecordValue> {
        Ok(RecordValue::Bytes(data.to_vec()))
    }
}

/// Codecs selectable for record keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyCodec {
    #[default]
    String,
    Bytes,
}

impl KeyCodec {
    /// Fully-qualified type name written to `key.deserializer`.
    pub fn class_name(&self) -> &'static str {
        match self {
            KeyCodec::String => type_name::<StringDeserializer>(),
            KeyCodec::Bytes => type_name::<BytesDeserializer>(),
        }
    }
}

/// Codecs selectable for record values.
///
/// `TypedJson` carries the payload type it decodes into, so choosing dynamic
/// type resolution and choosing the value deserializer are one decision.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ValueCodec {
    #[default]
    String,
    Bytes,
    TypedJson(PayloadType),
}

impl ValueCodec {
    /// Fully-qualified type name written to `value.deserializer`.
    pub fn class_name(&self) -> &'static str {
        match self {
            ValueCodec::String => type_name::<StringDeserializer>(),
            ValueCodec::Bytes => type_name::<BytesDeserializer>(),
            ValueCodec::TypedJson(_) => type_name::<TypedDeserializer>(),
        }
    }
}

/// Whether `class_name` names a codec this crate can instantiate.
pub fn is_known(class_name: &str) -> bool {
    [
        type_name::<StringDeserializer>(),
        type_name::<BytesDeserializer>(),
        type_name::<TypedDeserializer>(),
    ]
    .contains(&class_name)
}

/// Instantiate the codec named by `class_name`, unconfigured.
///
/// `registry` is used by the typed deserializer; `None` means the
/// process-wide registry.
pub fn create(
    class_name: &str,
    registry: Option<&Arc<TypeRegistry>>,
) -> Result<Box<dyn Deserializer>> {
    if class_name == type_name::<StringDeserializer>() {
        Ok(Box::new(StringDeserializer))
    } else if class_name == type_name::<BytesDeserializer>() {
        Ok(Box::new(BytesDeserializer))
    } else if class_name == type_name::<TypedDeserializer>() {
        let deserializer = match registry {
            Some(registry) => TypedDeserializer::with_registry(Arc::clone(registry)),
            None => TypedDeserializer::new(),
        };
        Ok(Box::new(deserializer))
    } else {
        Err(Error::InvalidConfig(format!(
            "Unknown deserializer: {class_name}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_deserializer() {
        let value = StringDeserializer.deserialize("t", b"hello").unwrap();
        assert_eq!(value.as_str(), Some("hello"));
    }

    #[test]
    fn test_string_deserializer_rejects_invalid_utf8() {
        let err = StringDeserializer
            .deserialize("t", &[0xff, 0xfe])
            .unwrap_err();
        assert!(err.is_deserialization());
    }

    #[test]
    fn test_bytes_deserializer() {
        let value = BytesDeserializer.deserialize("t", &[1, 2, 3]).unwrap();
        assert_eq!(value.as_bytes(), Some(&[1u8, 2, 3][..]));
        assert!(value.as_str().is_none());
    }

    #[test]
    fn test_class_names_are_known() {
        let payload_type = PayloadType::of::<u32>("numbers.U32");
        for name in [
            KeyCodec::String.class_name(),
            KeyCodec::Bytes.class_name(),
            ValueCodec::TypedJson(payload_type).class_name(),
        ] {
            assert!(is_known(name), "{name}");
            assert!(create(name, None).is_ok(), "{name}");
        }
        assert!(!is_known("org.apache.kafka.common.serialization.StringDeserializer"));
    }

    #[test]
    fn test_create_unknown_class_is_config_error() {
        let err = create("my::Missing", None).err().unwrap();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_value_codec_default_is_string() {
        assert_eq!(ValueCodec::default(), ValueCodec::String);
        assert_eq!(
            ValueCodec::default().class_name(),
            KeyCodec::default().class_name()
        );
    }

    #[test]
    fn test_into_envelope_downcasts() {
        let envelope = Envelope::of(AnyPayload::new("numbers.U32", 9u32));
        let value = RecordValue::Envelope(envelope);
        assert!(value.as_envelope().is_some());
        assert_eq!(value.into_envelope::<u32>(), Some(Envelope::of(9)));

        assert_eq!(
            RecordValue::String("x".to_string()).into_envelope::<u32>(),
            None
        );
    }
}
