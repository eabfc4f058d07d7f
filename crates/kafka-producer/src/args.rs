//! CLI argument definitions for the envelope producer.

use crate::config::{Acks, ProducerConfig, ProducerConfigBuilder};
use clap::Args;
use std::time::Duration;

/// Kafka producer arguments.
#[derive(Args, Clone, Debug)]
pub struct ProducerArgs {
    /// Kafka brokers (comma-separated, e.g., "localhost:9092")
    #[arg(long, env = "KAFKA_BROKERS", default_value = "localhost:9092", value_delimiter = ',')]
    pub kafka_brokers: Vec<String>,

    /// Client ID reported to the brokers
    #[arg(long)]
    pub client_id: Option<String>,

    /// Acknowledgements required before a send completes
    #[arg(long, value_enum)]
    pub acks: Option<Acks>,

    /// Delivery timeout in milliseconds
    #[arg(long, default_value = "5000")]
    pub message_timeout_ms: u64,
}

impl ProducerArgs {
    /// Start a [`ProducerConfigBuilder`] from these arguments.
    pub fn into_builder(self) -> ProducerConfigBuilder {
        let mut builder = ProducerConfig::builder()
            .with_servers(&self.kafka_brokers)
            .with_message_timeout(Duration::from_millis(self.message_timeout_ms));
        if let Some(client_id) = self.client_id {
            builder = builder.with_client_id(client_id);
        }
        if let Some(acks) = self.acks {
            builder = builder.with_acks(acks);
        }
        builder
    }
}
