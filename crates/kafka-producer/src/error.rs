use rdkafka::error::KafkaError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Kafka error: {0}")]
    Kafka(#[from] KafkaError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Producer is closed")]
    Closed,

    #[error("Delivery canceled before the record was acknowledged")]
    Canceled,
}

impl Error {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::InvalidConfig(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
