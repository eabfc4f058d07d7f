//! Kafka consumer library for records whose values are JSON envelopes.
//!
//! Features:
//!
//! - Validated Configuration: A builder that fills defaults and rejects inconsistent setups before any client exists
//! - Runtime Payload Types: Resolve the envelope payload type by name and decode without a compile-time type parameter
//! - Rebalance Listeners: Observe partition assignment and revocation
//! - Consumer Groups: Spawn multiple consumers in the same consumer group
//! - Commit Modes: Auto commit, or sync/async commit after each handled poll

/// CLI arguments that seed a configuration builder
pub mod args;

/// High-level API for spawning consumer tasks
///
/// Takes a validated consumer config to create one or more consumers in the
/// same consumer group, each running in its own async task.
pub mod client;

/// Record deserializers, including the typed JSON envelope deserializer
pub mod codec;
pub mod config;

/// Low-level consumer with batch polling and commits
pub mod consumer;
mod context;
pub mod error;
pub mod handler;
pub mod listener;

// Re-export main types for easy access
pub use args::ConsumerArgs;
pub use client::Client;
pub use codec::{
    BytesDeserializer, Deserializer, KeyCodec, RecordValue, StringDeserializer, TypedDeserializer,
    ValueCodec,
};
pub use config::{
    CommitMode, ConsumerConfig, ConsumerConfigBuilder, OffsetReset, Subscription,
    DEFAULT_MAX_POLL_RECORDS,
};
pub use consumer::{Consumer, RecordDecoder};
pub use error::{Error, Result};
pub use handler::{ConsumerRecord, MessageHandler};
pub use listener::{NoOpRebalanceListener, RebalanceListener, TopicPartition};
