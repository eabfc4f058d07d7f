//! Producer configuration.

use crate::codec;
use crate::error::{Error, Result};
use envelope_types::{keys, to_comma_separated, Properties, PropertyBuilder, PropertyValue};
use std::time::Duration;

/// Broker acknowledgements required before a send completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Acks {
    /// Do not wait for the broker
    #[value(name = "0")]
    None,
    /// Wait for the partition leader
    #[value(name = "1")]
    Leader,
    /// Wait for all in-sync replicas
    All,
}

impl Acks {
    pub fn as_str(&self) -> &'static str {
        match self {
            Acks::None => "0",
            Acks::Leader => "1",
            Acks::All => "all",
        }
    }
}

/// Validated producer option set.
#[derive(Debug, Clone)]
pub struct ProducerConfig {
    properties: Properties,
}

impl ProducerConfig {
    pub fn builder() -> ProducerConfigBuilder {
        ProducerConfigBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        let servers = self
            .properties
            .get_str(keys::BOOTSTRAP_SERVERS)
            .unwrap_or_default();
        if servers.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "Property [{}] must be informed",
                keys::BOOTSTRAP_SERVERS
            )));
        }

        check_serializer(&self.properties, keys::KEY_SERIALIZER, codec::key_serializer_name())?;
        check_serializer(
            &self.properties,
            keys::VALUE_SERIALIZER,
            codec::value_serializer_name(),
        )?;
        Ok(())
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn bootstrap_servers(&self) -> Option<&str> {
        self.properties.get_str(keys::BOOTSTRAP_SERVERS)
    }
}

/// Builder for [`ProducerConfig`].
#[derive(Debug, Default)]
pub struct ProducerConfigBuilder {
    properties: Properties,
}

impl ProducerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_servers<I, S>(mut self, servers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.put(keys::BOOTSTRAP_SERVERS, to_comma_separated(servers));
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.put(keys::CLIENT_ID, client_id.into());
        self
    }

    pub fn with_acks(mut self, acks: Acks) -> Self {
        self.put(keys::ACKS, acks.as_str());
        self
    }

    pub fn with_message_timeout(mut self, timeout: Duration) -> Self {
        let millis = i64::try_from(timeout.as_millis()).unwrap_or(i64::MAX);
        self.put(keys::MESSAGE_TIMEOUT_MS, millis);
        self
    }

    /// Set any other librdkafka property.
    pub fn with_property(mut self, key: &str, value: impl Into<PropertyValue>) -> Self {
        self.put(key, value);
        self
    }

    /// Fill defaults, validate, and freeze the configuration.
    pub fn build(mut self) -> Result<ProducerConfig> {
        self.add_defaults();
        let config = ProducerConfig {
            properties: self.properties,
        };
        config.validate()?;
        Ok(config)
    }
}

impl PropertyBuilder for ProducerConfigBuilder {
    fn properties(&self) -> &Properties {
        &self.properties
    }

    fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }

    fn add_defaults(&mut self) {
        self.add_if_absent(keys::KEY_SERIALIZER, codec::key_serializer_name());
        self.add_if_absent(keys::VALUE_SERIALIZER, codec::value_serializer_name());
    }
}

fn check_serializer(properties: &Properties, key: &str, expected: &str) -> Result<()> {
    match properties.get_str(key) {
        Some(name) if name == expected => Ok(()),
        Some(name) => Err(Error::InvalidConfig(format!(
            "Unsupported serializer in [{key}]: {name}"
        ))),
        None => Err(Error::InvalidConfig(format!(
            "Property [{key}] must be informed"
        ))),
    }
}
