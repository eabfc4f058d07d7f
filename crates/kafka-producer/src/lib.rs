//! Kafka producer library that publishes values wrapped in JSON envelopes.
//!
//! ## Features
//!
//! - **Envelope encoding**: Values are wrapped in `{"payload": .., "headers": {..}}` before sending
//! - **Validated configuration**: A builder that fills serializer defaults and requires bootstrap servers
//! - **Pluggable transport**: An rdkafka `FutureProducer` by default, any [`Transport`] in tests
//! - **Topic management**: Utilities for creating Kafka topics
//!
//! ## Usage
//!
//! ```rust,no_run
//! use kafka_envelope_producer::{ProducerClient, ProducerConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ProducerConfig::builder()
//!         .with_servers(["localhost:9092"])
//!         .build()?;
//!     let mut producer = ProducerClient::<u64>::new(&config)?;
//!
//!     let metadata = producer.send("numbers", 42).await?;
//!     println!("stored at {}[{}]@{}", metadata.topic, metadata.partition, metadata.offset);
//!
//!     producer.close();
//!     Ok(())
//! }
//! ```

pub mod admin;
pub mod args;
pub mod codec;
pub mod config;
pub mod error;
pub mod producer;
pub mod transport;

pub use admin::create_topic_if_not_exists;
pub use args::ProducerArgs;
pub use codec::{JsonEnvelopeSerializer, StringSerializer};
pub use config::{Acks, ProducerConfig, ProducerConfigBuilder};
pub use error::{Error, Result};
pub use producer::ProducerClient;
pub use transport::{DeliveryHandle, KafkaTransport, OutboundRecord, RecordMetadata, Transport};
