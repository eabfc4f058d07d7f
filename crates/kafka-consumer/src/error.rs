use envelope_types::EnvelopeTypesError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid configuration: {message}")]
    UnresolvedType {
        message: String,
        #[source]
        source: EnvelopeTypesError,
    },

    #[error("Deserialization error: {message}")]
    Deserialization {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Message handler failed for {topic}[{partition}]@{offset}")]
    Handler {
        topic: String,
        partition: i32,
        offset: i64,
        #[source]
        source: anyhow::Error,
    },
}

impl Error {
    /// Whether this error was raised while validating or binding configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::InvalidConfig(_) | Error::UnresolvedType { .. })
    }

    pub fn is_deserialization(&self) -> bool {
        matches!(self, Error::Deserialization { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
