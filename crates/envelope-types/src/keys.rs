//! Option set keys written by the consumer and producer builders.

pub const BOOTSTRAP_SERVERS: &str = "bootstrap.servers";
pub const CLIENT_ID: &str = "client.id";
pub const GROUP_ID: &str = "group.id";
pub const AUTO_OFFSET_RESET: &str = "auto.offset.reset";
pub const SESSION_TIMEOUT_MS: &str = "session.timeout.ms";
pub const ENABLE_AUTO_COMMIT: &str = "enable.auto.commit";
pub const ACKS: &str = "acks";
pub const MESSAGE_TIMEOUT_MS: &str = "message.timeout.ms";

pub const KEY_DESERIALIZER: &str = "key.deserializer";
pub const VALUE_DESERIALIZER: &str = "value.deserializer";
pub const KEY_SERIALIZER: &str = "key.serializer";
pub const VALUE_SERIALIZER: &str = "value.serializer";

/// Registered payload type name read by the typed deserializer.
pub const DESERIALIZER_CLASS: &str = "deserializer.class";

/// Resolved payload type descriptor stored next to [`DESERIALIZER_CLASS`].
pub const DESERIALIZER_TYPE: &str = "deserializer.type";

/// Upper bound on records returned by one poll.
pub const MAX_POLL_RECORDS: &str = "max.poll.records";

/// Keys interpreted by this library rather than by librdkafka.
///
/// librdkafka rejects unknown properties, so these never reach the
/// `ClientConfig`.
pub const CLIENT_SIDE: &[&str] = &[
    KEY_DESERIALIZER,
    VALUE_DESERIALIZER,
    KEY_SERIALIZER,
    VALUE_SERIALIZER,
    DESERIALIZER_CLASS,
    DESERIALIZER_TYPE,
    MAX_POLL_RECORDS,
];
