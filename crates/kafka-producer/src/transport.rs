//! The send primitive the producer client forwards to.

use crate::config::ProducerConfig;
use crate::error::{Error, Result};
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tracing::{info, warn};

/// How long `close` waits for outstanding deliveries.
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// A serialized record ready for the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRecord {
    pub topic: String,
    pub key: Option<Vec<u8>>,
    pub payload: Vec<u8>,
}

/// Where an acknowledged record landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMetadata {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
}

/// Resolves once the transport acknowledges (or fails) one send.
pub struct DeliveryHandle {
    inner: Pin<Box<dyn Future<Output = Result<RecordMetadata>> + Send>>,
}

impl DeliveryHandle {
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<RecordMetadata>> + Send + 'static,
    {
        Self {
            inner: Box::pin(future),
        }
    }

    /// A handle that is already complete.
    pub fn ready(result: Result<RecordMetadata>) -> Self {
        Self::new(std::future::ready(result))
    }
}

impl Future for DeliveryHandle {
    type Output = Result<RecordMetadata>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl fmt::Debug for DeliveryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryHandle").finish_non_exhaustive()
    }
}

/// Asynchronous record sink.
///
/// `send` must not block; completion is reported through the handle.
pub trait Transport: Send + Sync {
    fn send(&self, record: OutboundRecord) -> DeliveryHandle;

    /// Flush outstanding deliveries and release the connection.
    fn close(&self) -> Result<()>;
}

/// [`Transport`] backed by an rdkafka [`FutureProducer`].
pub struct KafkaTransport {
    producer: FutureProducer,
    flush_timeout: Duration,
}

impl KafkaTransport {
    pub fn new(config: &ProducerConfig) -> Result<Self> {
        let mut client_config = ClientConfig::new();
        for (key, value) in config.properties().transport_entries() {
            client_config.set(key, value);
        }

        let producer: FutureProducer = client_config.create()?;
        info!(
            "Kafka producer created for {}",
            config.bootstrap_servers().unwrap_or_default()
        );

        Ok(Self {
            producer,
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
        })
    }

    pub fn with_flush_timeout(mut self, flush_timeout: Duration) -> Self {
        self.flush_timeout = flush_timeout;
        self
    }

    /// Get the underlying producer (for advanced use cases)
    pub fn inner(&self) -> &FutureProducer {
        &self.producer
    }
}

impl Transport for KafkaTransport {
    fn send(&self, record: OutboundRecord) -> DeliveryHandle {
        let mut future_record =
            FutureRecord::<[u8], [u8]>::to(&record.topic).payload(record.payload.as_slice());
        if let Some(key) = &record.key {
            future_record = future_record.key(key.as_slice());
        }

        match self.producer.send_result(future_record) {
            Ok(delivery) => {
                let topic = record.topic.clone();
                DeliveryHandle::new(async move {
                    match delivery.await {
                        Ok(Ok((partition, offset))) => Ok(RecordMetadata {
                            topic,
                            partition,
                            offset,
                        }),
                        Ok(Err((e, _message))) => Err(Error::Kafka(e)),
                        Err(_canceled) => Err(Error::Canceled),
                    }
                })
            }
            Err((e, _record)) => DeliveryHandle::ready(Err(Error::Kafka(e))),
        }
    }

    fn close(&self) -> Result<()> {
        self.producer
            .flush(Timeout::After(self.flush_timeout))
            .map_err(|e| {
                warn!("Failed to flush producer on close: {e}");
                Error::Kafka(e)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_handle_resolves() {
        let metadata = RecordMetadata {
            topic: "orders".to_string(),
            partition: 3,
            offset: 99,
        };
        let handle = DeliveryHandle::ready(Ok(metadata.clone()));
        assert_eq!(tokio_test::block_on(handle).unwrap(), metadata);

        let handle = DeliveryHandle::ready(Err(Error::Closed));
        assert!(matches!(tokio_test::block_on(handle), Err(Error::Closed)));
    }

    #[tokio::test]
    async fn test_handle_wraps_async_completion() {
        let (tx, rx) = tokio::sync::oneshot::channel::<i64>();
        let handle = DeliveryHandle::new(async move {
            let offset = rx.await.map_err(|_| Error::Canceled)?;
            Ok::<_, Error>(RecordMetadata {
                topic: "orders".to_string(),
                partition: 0,
                offset,
            })
        });
        tx.send(12).unwrap();
        assert_eq!(handle.await.unwrap().offset, 12);
    }
}
