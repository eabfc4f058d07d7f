use crate::codec::{self, Deserializer};
use crate::config::{CommitMode, ConsumerConfig, Subscription};
use crate::context::ListenerContext;
use crate::error::{Error, Result};
use crate::handler::{ConsumerRecord, MessageHandler};
use envelope_types::{keys, Properties, TypeRegistry};
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{
    CommitMode as RdkafkaCommitMode, Consumer as RdkafkaConsumer,
    StreamConsumer as RdkafkaStreamConsumer,
};
use rdkafka::message::{BorrowedMessage as RdkafkaBorrowedMessage, Message as RdkafkaMessage};
use rdkafka::{Offset, TopicPartitionList};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Next offset to commit, per topic partition.
type Offsets = BTreeMap<(String, i32), i64>;

/// Kafka consumer driven by a [`ConsumerConfig`].
///
/// Construction binds both deserializers before the client is created, so an
/// unresolvable payload type fails here rather than on the first record.
///
/// The client never stores offsets on its own: an offset becomes eligible for
/// auto-commit only once its record was handed back through [`Consumer::commit`]
/// or handled by [`Consumer::run`].
#[derive(Clone)]
pub struct Consumer {
    consumer: Arc<RdkafkaStreamConsumer<ListenerContext>>,
    decoder: Arc<RecordDecoder>,
    handler: Arc<dyn MessageHandler>,
    commit_mode: CommitMode,
    max_poll_records: usize,
    pending: Arc<Mutex<Option<Error>>>,
}

impl Consumer {
    /// Create a consumer resolving payload types against the global registry.
    pub fn new(config: &ConsumerConfig) -> Result<Self> {
        Self::with_registry(config, None)
    }

    pub fn with_registry(config: &ConsumerConfig, registry: Option<Arc<TypeRegistry>>) -> Result<Self> {
        config.validate()?;
        let decoder = RecordDecoder::from_properties(config.properties(), registry.as_ref())?;

        let client_config = client_config(config);
        let context = ListenerContext::new(Arc::clone(config.rebalance_listener()));
        let consumer: RdkafkaStreamConsumer<ListenerContext> =
            client_config.create_with_context(context)?;

        match config.subscription() {
            Subscription::Topics(topics) => {
                let topics: Vec<&str> = topics.iter().map(String::as_str).collect();
                consumer.subscribe(&topics)?;
                info!("Subscribed to topics {:?}", topics);
            }
            Subscription::Pattern(pattern) => {
                let pattern = pattern_subscription(pattern);
                consumer.subscribe(&[pattern.as_str()])?;
                info!("Subscribed to topic pattern {pattern}");
            }
        }

        Ok(Self {
            consumer: Arc::new(consumer),
            decoder: Arc::new(decoder),
            handler: Arc::clone(config.message_handler()),
            commit_mode: config.commit_mode(),
            max_poll_records: config.max_poll_records(),
            pending: Arc::new(Mutex::new(None)),
        })
    }

    /// Receive a batch of decoded records (blocks until at least one arrives).
    ///
    /// A record that fails to decode ends the batch. The records decoded
    /// before it are returned and the error is reported by the next poll;
    /// when it is the first record the error is returned right away.
    pub async fn poll(&self) -> Result<Vec<ConsumerRecord>> {
        let mut pending = self.pending.lock().await;
        if let Some(e) = pending.take() {
            return Err(e);
        }

        let mut batch = PolledBatch::default();
        let message = self.consumer.recv().await?;
        if batch.push(self.decoder.decode_message(&message)) {
            while batch.records.len() < self.max_poll_records {
                match tokio::time::timeout(Duration::from_millis(10), self.consumer.recv()).await {
                    Ok(Ok(message)) => {
                        if !batch.push(self.decoder.decode_message(&message)) {
                            break;
                        }
                    }
                    _ => break,
                }
            }
        }

        batch.into_result(&mut pending)
    }

    /// Acknowledge `records` as processed.
    ///
    /// With [`CommitMode::Sync`] or [`CommitMode::Async`] the following offsets
    /// are committed. With [`CommitMode::None`] they are stored for the
    /// client's auto-commit.
    pub fn commit(&self, records: &[ConsumerRecord]) -> Result<()> {
        let mut offsets = Offsets::new();
        for record in records {
            track(&mut offsets, &record.topic, record.partition, record.offset);
        }
        self.acknowledge(&offsets)
    }

    fn acknowledge(&self, offsets: &Offsets) -> Result<()> {
        if offsets.is_empty() {
            return Ok(());
        }

        let tpl = offset_list(offsets)?;
        match rdkafka_mode(self.commit_mode) {
            Some(mode) => {
                self.consumer.commit(&tpl, mode)?;
                debug!("Committed {} partition offset(s) ({:?})", offsets.len(), self.commit_mode);
            }
            None => {
                self.consumer.store_offsets(&tpl)?;
                debug!("Stored {} partition offset(s) for auto-commit", offsets.len());
            }
        }
        Ok(())
    }

    /// Poll, hand every record to the message handler, and acknowledge, until
    /// an error stops the loop.
    ///
    /// A handler failure acknowledges the records handled before it and
    /// returns [`Error::Handler`]. Neither the failing record nor the rest of
    /// its batch is acknowledged, so a new consumer in the group starts from
    /// the failing record. A decode failure behaves the same way.
    pub async fn run(&self) -> Result<()> {
        loop {
            let records = match self.poll().await {
                Ok(records) => records,
                Err(e) => {
                    error!("Consumer stopped while polling: {e}");
                    return Err(e);
                }
            };

            let outcome = handle_batch(self.handler.as_ref(), records).await;
            if let Err(e) = self.acknowledge(&outcome.offsets) {
                if outcome.failure.is_none() {
                    return Err(e);
                }
                warn!("Failed to commit handled records before stopping: {e}");
            }
            if let Some(e) = outcome.failure {
                error!("Consumer stopped: {e}");
                return Err(e);
            }
        }
    }

    /// Leave the group subscription.
    pub fn close(&self) {
        self.consumer.unsubscribe();
        info!("Consumer unsubscribed");
    }

    /// Get the underlying consumer (for advanced use cases)
    pub fn inner(&self) -> &RdkafkaStreamConsumer<ListenerContext> {
        &self.consumer
    }
}

/// The bound key and value deserializers.
pub struct RecordDecoder {
    key: Box<dyn Deserializer>,
    value: Box<dyn Deserializer>,
}

impl RecordDecoder {
    /// Instantiate and configure the codecs named in `properties`.
    pub fn from_properties(
        properties: &Properties,
        registry: Option<&Arc<TypeRegistry>>,
    ) -> Result<Self> {
        Ok(Self {
            key: bind(properties, keys::KEY_DESERIALIZER, true, registry)?,
            value: bind(properties, keys::VALUE_DESERIALIZER, false, registry)?,
        })
    }

    /// Decode one record's raw parts. Absent key or payload stays `None`.
    pub fn decode(
        &self,
        topic: &str,
        partition: i32,
        offset: i64,
        timestamp: Option<i64>,
        key: Option<&[u8]>,
        payload: Option<&[u8]>,
    ) -> Result<ConsumerRecord> {
        Ok(ConsumerRecord {
            topic: topic.to_string(),
            partition,
            offset,
            timestamp,
            key: key.map(|k| self.key.deserialize(topic, k)).transpose()?,
            value: payload.map(|v| self.value.deserialize(topic, v)).transpose()?,
        })
    }

    fn decode_message(&self, msg: &RdkafkaBorrowedMessage<'_>) -> Result<ConsumerRecord> {
        self.decode(
            msg.topic(),
            msg.partition(),
            msg.offset(),
            msg.timestamp().to_millis(),
            msg.key(),
            msg.payload(),
        )
    }
}

impl Drop for RecordDecoder {
    fn drop(&mut self) {
        self.key.close();
        self.value.close();
    }
}

/// librdkafka settings for `config`.
///
/// Offsets are stored explicitly after records are handled, never on delivery
/// to the application, so auto-commit cannot move past unprocessed records.
fn client_config(config: &ConsumerConfig) -> ClientConfig {
    let mut client_config = ClientConfig::new();
    for (key, value) in config.properties().transport_entries() {
        client_config.set(key, value);
    }
    if !config.properties().contains_key("enable.partition.eof") {
        client_config.set("enable.partition.eof", "false");
    }
    client_config.set("enable.auto.offset.store", "false");
    client_config
}

fn rdkafka_mode(mode: CommitMode) -> Option<RdkafkaCommitMode> {
    match mode {
        CommitMode::None => None,
        CommitMode::Sync => Some(RdkafkaCommitMode::Sync),
        CommitMode::Async => Some(RdkafkaCommitMode::Async),
    }
}

fn offset_list(offsets: &Offsets) -> Result<TopicPartitionList> {
    let mut tpl = TopicPartitionList::new();
    for ((topic, partition), next) in offsets {
        tpl.add_partition_offset(topic, *partition, Offset::Offset(*next))?;
    }
    Ok(tpl)
}

/// Records decoded by one poll, and the decode failure that ended it.
#[derive(Default)]
struct PolledBatch {
    records: Vec<ConsumerRecord>,
    failure: Option<Error>,
}

impl PolledBatch {
    /// Returns false once a record failed to decode.
    fn push(&mut self, decoded: Result<ConsumerRecord>) -> bool {
        match decoded {
            Ok(record) => {
                self.records.push(record);
                true
            }
            Err(e) => {
                self.failure = Some(e);
                false
            }
        }
    }

    fn into_result(self, pending: &mut Option<Error>) -> Result<Vec<ConsumerRecord>> {
        match self.failure {
            Some(e) if self.records.is_empty() => Err(e),
            Some(e) => {
                warn!(
                    "Decode failed after {} record(s); returning them before the error",
                    self.records.len()
                );
                *pending = Some(e);
                Ok(self.records)
            }
            None => Ok(self.records),
        }
    }
}

fn bind(
    properties: &Properties,
    key: &str,
    is_key: bool,
    registry: Option<&Arc<TypeRegistry>>,
) -> Result<Box<dyn Deserializer>> {
    let class_name = properties
        .get_str(key)
        .ok_or_else(|| Error::InvalidConfig(format!("Property [{key}] must be informed")))?;
    let mut deserializer = codec::create(class_name, registry)?;
    deserializer.configure(properties, is_key)?;
    Ok(deserializer)
}

struct BatchOutcome {
    offsets: Offsets,
    failure: Option<Error>,
}

/// Hand records to `handler` in order, stopping at the first failure.
async fn handle_batch(handler: &dyn MessageHandler, records: Vec<ConsumerRecord>) -> BatchOutcome {
    let mut offsets = Offsets::new();
    for record in records {
        let (topic, partition, offset) = (record.topic.clone(), record.partition, record.offset);
        if let Err(source) = handler.handle(record).await {
            return BatchOutcome {
                offsets,
                failure: Some(Error::Handler {
                    topic,
                    partition,
                    offset,
                    source,
                }),
            };
        }
        track(&mut offsets, &topic, partition, offset);
    }
    BatchOutcome {
        offsets,
        failure: None,
    }
}

fn track(offsets: &mut Offsets, topic: &str, partition: i32, offset: i64) {
    let next = offsets.entry((topic.to_string(), partition)).or_insert(offset + 1);
    *next = (*next).max(offset + 1);
}

/// librdkafka treats a subscription starting with `^` as a regex. The pattern
/// must match the whole topic name.
fn pattern_subscription(pattern: &Regex) -> String {
    let source = pattern.as_str();
    if source.starts_with('^') {
        source.to_string()
    } else {
        format!("^({source})$")
    }
}
