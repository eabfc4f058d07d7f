use crate::config::ConsumerConfig;
use crate::consumer::Consumer;
use crate::error::Result;
use envelope_types::TypeRegistry;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Kafka client for managing multiple consumers of one configuration
pub struct Client {
    config: ConsumerConfig,
    registry: Option<Arc<TypeRegistry>>,
}

impl Client {
    /// Create a client whose consumers resolve payload types globally
    pub fn new(config: ConsumerConfig) -> Self {
        Self {
            config,
            registry: None,
        }
    }

    /// Create a client whose consumers resolve payload types against `registry`
    pub fn with_registry(config: ConsumerConfig, registry: Arc<TypeRegistry>) -> Self {
        Self {
            config,
            registry: Some(registry),
        }
    }

    /// Create a single consumer
    pub fn create_consumer(&self) -> Result<Consumer> {
        Consumer::with_registry(&self.config, self.registry.clone())
    }

    /// Spawn a consumer task that runs until an error stops it
    pub fn spawn_consumer_task(&self) -> anyhow::Result<JoinHandle<anyhow::Result<()>>> {
        let consumer = self.create_consumer()?;

        let handle = tokio::spawn(async move {
            consumer.run().await?;
            Ok(())
        });

        Ok(handle)
    }

    /// Spawn multiple consumer tasks in the same consumer group
    ///
    /// All consumers share the configured `group.id`, so Kafka assigns each
    /// partition to exactly one of them.
    pub fn spawn_consumer_group(
        &self,
        num_consumers: usize,
    ) -> anyhow::Result<Vec<JoinHandle<anyhow::Result<()>>>> {
        let mut handles = Vec::new();

        for _ in 0..num_consumers {
            handles.push(self.spawn_consumer_task()?);
        }

        Ok(handles)
    }

    /// Get the config
    pub fn config(&self) -> &ConsumerConfig {
        &self.config
    }
}
