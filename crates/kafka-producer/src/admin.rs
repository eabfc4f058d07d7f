//! Topic administration helpers.

use crate::config::ProducerConfig;
use crate::error::{Error, Result};
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::config::ClientConfig;
use rdkafka::error::KafkaError;
use rdkafka::types::RDKafkaErrorCode;
use std::time::Duration;
use tracing::info;

/// Create `topic` with `partitions` partitions unless it already exists.
pub async fn create_topic_if_not_exists(
    config: &ProducerConfig,
    topic: &str,
    partitions: i32,
) -> Result<()> {
    let servers = config.bootstrap_servers().ok_or_else(|| {
        Error::InvalidConfig("Bootstrap servers are required to create topics".to_string())
    })?;
    let admin_client: AdminClient<DefaultClientContext> = ClientConfig::new()
        .set("bootstrap.servers", servers)
        .create()?;

    let new_topic = NewTopic::new(topic, partitions, TopicReplication::Fixed(1));
    let opts = AdminOptions::new().operation_timeout(Some(Duration::from_secs(5)));

    for result in admin_client.create_topics(&[new_topic], &opts).await? {
        match result {
            Ok(topic_name) => info!("Topic '{topic_name}' created successfully"),
            Err((topic_name, RDKafkaErrorCode::TopicAlreadyExists)) => {
                info!("Topic '{topic_name}' already exists")
            }
            Err((_, code)) => return Err(Error::Kafka(KafkaError::AdminOp(code))),
        }
    }

    Ok(())
}
