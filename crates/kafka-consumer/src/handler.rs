use crate::codec::RecordValue;
use async_trait::async_trait;
use std::future::Future;

/// A consumed record with decoded key and value.
#[derive(Debug)]
pub struct ConsumerRecord {
    /// Kafka topic
    pub topic: String,
    /// Kafka partition
    pub partition: i32,
    /// Kafka offset
    pub offset: i64,
    /// Message timestamp (milliseconds since epoch)
    pub timestamp: Option<i64>,
    /// Decoded key, if the record has one
    pub key: Option<RecordValue>,
    /// Decoded value; `None` for tombstones
    pub value: Option<RecordValue>,
}

/// Receives every record the consumer decodes.
///
/// Returning an error stops the consumer before the record is committed.
/// Closures `Fn(ConsumerRecord) -> impl Future<Output = anyhow::Result<()>>`
/// implement this trait.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, record: ConsumerRecord) -> anyhow::Result<()>;
}

#[async_trait]
impl<F, Fut> MessageHandler for F
where
    F: Fn(ConsumerRecord) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn handle(&self, record: ConsumerRecord) -> anyhow::Result<()> {
        (self)(record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn record(offset: i64) -> ConsumerRecord {
        ConsumerRecord {
            topic: "orders".to_string(),
            partition: 0,
            offset,
            timestamp: None,
            key: None,
            value: Some(RecordValue::String("v".to_string())),
        }
    }

    #[tokio::test]
    async fn test_closure_is_a_handler() {
        let seen = Arc::new(AtomicUsize::new(0));
        let handler = {
            let seen = Arc::clone(&seen);
            move |record: ConsumerRecord| {
                let seen = Arc::clone(&seen);
                async move {
                    assert_eq!(record.value.unwrap().as_str(), Some("v"));
                    seen.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, anyhow::Error>(())
                }
            }
        };

        let handler: Arc<dyn MessageHandler> = Arc::new(handler);
        handler.handle(record(0)).await.unwrap();
        handler.handle(record(1)).await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_handler_errors_propagate() {
        let handler = |record: ConsumerRecord| async move {
            Err::<(), _>(anyhow::anyhow!("cannot handle offset {}", record.offset))
        };
        let err = tokio_test::block_on(handler.handle(record(7))).unwrap_err();
        assert_eq!(err.to_string(), "cannot handle offset 7");
    }
}
