//! Kafka Envelope Library
//!
//! Kafka producer and consumer plumbing for records whose values are JSON
//! envelopes: `{"payload": <value>, "headers": {<string>: <string>}}`.
//!
//! # Features
//!
//! - Validated configuration: Builders fill defaults and reject inconsistent setups before any client exists
//! - Runtime payload types: The consumer resolves the payload type from a registered name
//! - Envelope producer: Wrap values (optionally with headers) and send them without blocking
//! - Consumer groups: Spawn multiple consumers sharing a group id
//!
//! # Crates
//!
//! - `envelope_types` - Envelope, payload type registry, option set
//! - `kafka_envelope_consumer` - Consumer configuration, deserializers, consumer runtime
//! - `kafka_envelope_producer` - Producer configuration, producer client, transports

pub use envelope_types as types;
pub use kafka_envelope_consumer as consumer;
pub use kafka_envelope_producer as producer;

pub use envelope_types::{registry, AnyPayload, Envelope, Headers, PayloadType, TypeRegistry};
pub use kafka_envelope_consumer::{
    CommitMode, ConsumerConfig, ConsumerConfigBuilder, ConsumerRecord, KeyCodec, MessageHandler,
    OffsetReset, RebalanceListener, TopicPartition, TypedDeserializer, ValueCodec,
};
pub use kafka_envelope_producer::{Acks, ProducerClient, ProducerConfig, ProducerConfigBuilder};
