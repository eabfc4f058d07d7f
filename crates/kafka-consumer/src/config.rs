//! Consumer configuration.
//!
//! [`ConsumerConfigBuilder`] accumulates the option set and the consumer's
//! wiring (subscription, listener, handler, commit mode). [`ConsumerConfig`]
//! is the immutable result of [`ConsumerConfigBuilder::build`], which fills
//! defaults and validates before anything reaches the Kafka client.

use crate::codec::{self, KeyCodec, TypedDeserializer, ValueCodec};
use crate::error::{Error, Result};
use crate::handler::MessageHandler;
use crate::listener::{NoOpRebalanceListener, RebalanceListener};
use envelope_types::{keys, to_comma_separated, Properties, PropertyBuilder, PropertyValue};
use regex::Regex;
use std::any::type_name;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Records returned by one poll when `max.poll.records` is not set.
pub const DEFAULT_MAX_POLL_RECORDS: usize = 500;

/// What to do when the group has no committed offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OffsetReset {
    /// Start from the earliest available offset
    Earliest,
    /// Start from the latest offset
    Latest,
    /// Fail if no offset is found
    None,
}

impl OffsetReset {
    pub fn as_str(&self) -> &'static str {
        match self {
            OffsetReset::Earliest => "earliest",
            OffsetReset::Latest => "latest",
            OffsetReset::None => "none",
        }
    }
}

/// How consumed offsets are acknowledged.
///
/// `None` leaves committing to the client's auto-commit, governed by
/// `enable.auto.commit`. `Sync` and `Async` commit after each handled poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CommitMode {
    #[default]
    None,
    Sync,
    Async,
}

/// The consumer's topic selection.
#[derive(Debug, Clone, Copy)]
pub enum Subscription<'a> {
    Topics(&'a [String]),
    Pattern(&'a Regex),
}

/// Validated consumer configuration.
#[derive(Clone)]
pub struct ConsumerConfig {
    properties: Properties,
    topics: Vec<String>,
    topic_pattern: Option<Regex>,
    rebalance_listener: Arc<dyn RebalanceListener>,
    message_handler: Arc<dyn MessageHandler>,
    commit_mode: CommitMode,
}

impl ConsumerConfig {
    pub fn builder() -> ConsumerConfigBuilder {
        ConsumerConfigBuilder::new()
    }

    /// Re-check the invariants `build` established.
    pub fn validate(&self) -> Result<()> {
        validate_selection(&self.topics, self.topic_pattern.as_ref())?;
        validate_properties(&self.properties)?;

        if self.commit_mode != CommitMode::None && self.is_enable_auto_commit() {
            warn!(
                "Commit mode {:?} selected while enable.auto.commit is true; offsets will also be auto-committed",
                self.commit_mode
            );
        }
        Ok(())
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn topic_pattern(&self) -> Option<&Regex> {
        self.topic_pattern.as_ref()
    }

    pub fn is_topic_by_pattern(&self) -> bool {
        self.topic_pattern.is_some()
    }

    pub fn subscription(&self) -> Subscription<'_> {
        match &self.topic_pattern {
            Some(pattern) => Subscription::Pattern(pattern),
            None => Subscription::Topics(&self.topics),
        }
    }

    pub fn rebalance_listener(&self) -> &Arc<dyn RebalanceListener> {
        &self.rebalance_listener
    }

    pub fn message_handler(&self) -> &Arc<dyn MessageHandler> {
        &self.message_handler
    }

    pub fn commit_mode(&self) -> CommitMode {
        self.commit_mode
    }

    pub fn is_commit_sync(&self) -> bool {
        self.commit_mode == CommitMode::Sync
    }

    pub fn is_commit_async(&self) -> bool {
        self.commit_mode == CommitMode::Async
    }

    /// Read from `enable.auto.commit`; the client default is on.
    pub fn is_enable_auto_commit(&self) -> bool {
        self.properties
            .get_bool(keys::ENABLE_AUTO_COMMIT)
            .unwrap_or(true)
    }

    pub fn group_id(&self) -> Option<&str> {
        self.properties.get_str(keys::GROUP_ID)
    }

    pub fn max_poll_records(&self) -> usize {
        self.properties
            .get_int(keys::MAX_POLL_RECORDS)
            .and_then(|n| usize::try_from(n).ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_POLL_RECORDS)
    }
}

impl fmt::Debug for ConsumerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsumerConfig")
            .field("properties", &self.properties)
            .field("topics", &self.topics)
            .field("topic_pattern", &self.topic_pattern)
            .field("commit_mode", &self.commit_mode)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ConsumerConfig`].
///
/// Every `with_*` call returns the builder. Topics and pattern are separate
/// axes (the last call wins on each); `build` rejects having both or neither.
pub struct ConsumerConfigBuilder {
    properties: Properties,
    topics: Vec<String>,
    topic_pattern: Option<Regex>,
    rebalance_listener: Arc<dyn RebalanceListener>,
    message_handler: Option<Arc<dyn MessageHandler>>,
    commit_mode: CommitMode,
}

impl ConsumerConfigBuilder {
    pub fn new() -> Self {
        Self {
            properties: Properties::new(),
            topics: Vec::new(),
            topic_pattern: None,
            rebalance_listener: Arc::new(NoOpRebalanceListener),
            message_handler: None,
            commit_mode: CommitMode::None,
        }
    }

    pub fn with_servers<I, S>(mut self, servers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.put(keys::BOOTSTRAP_SERVERS, to_comma_separated(servers));
        self
    }

    pub fn with_key_deserializer(mut self, codec: KeyCodec) -> Self {
        self.put(keys::KEY_DESERIALIZER, codec.class_name());
        self
    }

    /// Select the value codec.
    ///
    /// [`ValueCodec::TypedJson`] also records the payload type name and
    /// descriptor for the typed deserializer; any other codec clears them.
    pub fn with_value_deserializer(mut self, codec: ValueCodec) -> Self {
        self.put(keys::VALUE_DESERIALIZER, codec.class_name());
        match codec {
            ValueCodec::TypedJson(payload_type) => {
                self.put(keys::DESERIALIZER_CLASS, payload_type.name());
                self.put(keys::DESERIALIZER_TYPE, payload_type);
            }
            ValueCodec::String | ValueCodec::Bytes => {
                self.properties.remove(keys::DESERIALIZER_CLASS);
                self.properties.remove(keys::DESERIALIZER_TYPE);
            }
        }
        self
    }

    /// Decode values as JSON envelopes of `payload_type`.
    pub fn with_deserializer_type(self, payload_type: envelope_types::PayloadType) -> Self {
        self.with_value_deserializer(ValueCodec::TypedJson(payload_type))
    }

    pub fn with_group_id(mut self, group_id: impl Into<String>) -> Self {
        self.put(keys::GROUP_ID, group_id.into());
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.put(keys::CLIENT_ID, client_id.into());
        self
    }

    pub fn with_auto_offset_reset(mut self, offset_reset: OffsetReset) -> Self {
        self.put(keys::AUTO_OFFSET_RESET, offset_reset.as_str());
        self
    }

    pub fn with_session_timeout(mut self, timeout: Duration) -> Self {
        let millis = i64::try_from(timeout.as_millis()).unwrap_or(i64::MAX);
        self.put(keys::SESSION_TIMEOUT_MS, millis);
        self
    }

    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics = topics.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_topic_pattern(mut self, pattern: Regex) -> Self {
        self.topic_pattern = Some(pattern);
        self
    }

    pub fn with_rebalance_listener<L>(mut self, listener: L) -> Self
    where
        L: RebalanceListener + 'static,
    {
        self.rebalance_listener = Arc::new(listener);
        self
    }

    pub fn with_message_handler<H>(mut self, handler: H) -> Self
    where
        H: MessageHandler + 'static,
    {
        self.message_handler = Some(Arc::new(handler));
        self
    }

    pub fn with_shared_message_handler(mut self, handler: Arc<dyn MessageHandler>) -> Self {
        self.message_handler = Some(handler);
        self
    }

    pub fn with_enable_auto_commit(mut self, enable_auto_commit: bool) -> Self {
        self.put(keys::ENABLE_AUTO_COMMIT, enable_auto_commit);
        self
    }

    /// Commit synchronously after each poll. Clears async commit.
    pub fn with_commit_sync(mut self) -> Self {
        self.commit_mode = CommitMode::Sync;
        self
    }

    /// Commit asynchronously after each poll. Clears sync commit.
    pub fn with_commit_async(mut self) -> Self {
        self.commit_mode = CommitMode::Async;
        self
    }

    pub fn with_commit_mode(mut self, commit_mode: CommitMode) -> Self {
        self.commit_mode = commit_mode;
        self
    }

    pub fn with_max_poll_records(mut self, max_poll_records: usize) -> Self {
        let max_poll_records = i64::try_from(max_poll_records).unwrap_or(i64::MAX);
        self.put(keys::MAX_POLL_RECORDS, max_poll_records);
        self
    }

    /// Set any other librdkafka property.
    ///
    /// Keys with a typed setter are checked by `build`: `enable.auto.commit`
    /// must be a boolean and `max.poll.records` a positive integer.
    pub fn with_property(mut self, key: &str, value: impl Into<PropertyValue>) -> Self {
        self.put(key, value);
        self
    }

    pub fn commit_mode(&self) -> CommitMode {
        self.commit_mode
    }

    /// Fill defaults, validate, and freeze the configuration.
    pub fn build(mut self) -> Result<ConsumerConfig> {
        self.add_defaults();

        validate_selection(&self.topics, self.topic_pattern.as_ref())?;
        let message_handler = self
            .message_handler
            .ok_or_else(|| Error::InvalidConfig("Message handler cannot be null".to_string()))?;

        let config = ConsumerConfig {
            properties: self.properties,
            topics: self.topics,
            topic_pattern: self.topic_pattern,
            rebalance_listener: self.rebalance_listener,
            message_handler,
            commit_mode: self.commit_mode,
        };
        config.validate()?;
        Ok(config)
    }
}

impl Default for ConsumerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyBuilder for ConsumerConfigBuilder {
    fn properties(&self) -> &Properties {
        &self.properties
    }

    fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }

    fn add_defaults(&mut self) {
        self.add_if_absent(keys::KEY_DESERIALIZER, KeyCodec::String.class_name());
        self.add_if_absent(keys::VALUE_DESERIALIZER, ValueCodec::String.class_name());
    }
}

impl fmt::Debug for ConsumerConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsumerConfigBuilder")
            .field("properties", &self.properties)
            .field("topics", &self.topics)
            .field("topic_pattern", &self.topic_pattern)
            .field("has_message_handler", &self.message_handler.is_some())
            .field("commit_mode", &self.commit_mode)
            .finish_non_exhaustive()
    }
}

fn validate_selection(topics: &[String], topic_pattern: Option<&Regex>) -> Result<()> {
    match (topics.is_empty(), topic_pattern) {
        (true, None) => Err(Error::InvalidConfig(
            "Either topics or a topic pattern must be informed".to_string(),
        )),
        (false, Some(pattern)) => Err(Error::InvalidConfig(format!(
            "Topics {topics:?} and topic pattern '{pattern}' are mutually exclusive"
        ))),
        _ => Ok(()),
    }
}

fn validate_properties(properties: &Properties) -> Result<()> {
    for key in [keys::KEY_DESERIALIZER, keys::VALUE_DESERIALIZER] {
        let class_name = properties
            .get_str(key)
            .ok_or_else(|| Error::InvalidConfig(format!("Property [{key}] must be informed")))?;
        if !codec::is_known(class_name) {
            return Err(Error::InvalidConfig(format!(
                "Unknown deserializer in [{key}]: {class_name}"
            )));
        }
    }

    let typed = type_name::<TypedDeserializer>();
    let uses_typed = properties.get_str(keys::KEY_DESERIALIZER) == Some(typed)
        || properties.get_str(keys::VALUE_DESERIALIZER) == Some(typed);
    if uses_typed
        && properties
            .get_str(keys::DESERIALIZER_CLASS)
            .map_or(true, str::is_empty)
    {
        return Err(Error::InvalidConfig(format!(
            "Property [{}] must be informed when using {typed}",
            keys::DESERIALIZER_CLASS
        )));
    }

    if let Some(value) = properties.get(keys::ENABLE_AUTO_COMMIT) {
        if value.as_bool().is_none() {
            return Err(Error::InvalidConfig(format!(
                "Property [{}] must be a boolean, got '{value}'",
                keys::ENABLE_AUTO_COMMIT
            )));
        }
    }

    if let Some(value) = properties.get(keys::MAX_POLL_RECORDS) {
        if !value.as_int().is_some_and(|n| n > 0) {
            return Err(Error::InvalidConfig(format!(
                "Property [{}] must be a positive integer, got '{value}'",
                keys::MAX_POLL_RECORDS
            )));
        }
    }
    Ok(())
}
