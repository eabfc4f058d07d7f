use crate::codec::{JsonEnvelopeSerializer, StringSerializer};
use crate::config::ProducerConfig;
use crate::error::{Error, Result};
use crate::transport::{DeliveryHandle, KafkaTransport, OutboundRecord, Transport};
use envelope_types::{Envelope, Headers};
use serde::Serialize;
use std::marker::PhantomData;
use tracing::{info, warn};

/// Sends values of type `V` wrapped in JSON envelopes.
///
/// Every send returns immediately with a [`DeliveryHandle`]; this layer adds
/// no buffering, batching or retry. After [`ProducerClient::close`] every
/// send resolves to [`Error::Closed`].
pub struct ProducerClient<V, T = KafkaTransport> {
    transport: Option<T>,
    _payload: PhantomData<fn(V)>,
}

impl<V: Serialize> ProducerClient<V, KafkaTransport> {
    /// Create a client backed by a Kafka producer.
    pub fn new(config: &ProducerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_transport(KafkaTransport::new(config)?))
    }
}

impl<V: Serialize, T: Transport> ProducerClient<V, T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport: Some(transport),
            _payload: PhantomData,
        }
    }

    /// Wrap `value` in an envelope without headers and send it.
    pub fn send(&self, topic: &str, value: V) -> DeliveryHandle {
        self.send_envelope(topic, Envelope::of(value))
    }

    pub fn send_with_headers(&self, topic: &str, value: V, headers: Headers) -> DeliveryHandle {
        self.send_envelope(topic, Envelope::with_headers(value, headers))
    }

    /// Send an envelope as-is.
    pub fn send_envelope(&self, topic: &str, envelope: Envelope<V>) -> DeliveryHandle {
        self.dispatch(topic, None, &envelope)
    }

    /// Like [`ProducerClient::send`], with a record key for partitioning.
    pub fn send_keyed(&self, topic: &str, key: &str, value: V) -> DeliveryHandle {
        let key = StringSerializer.serialize(key);
        self.dispatch(topic, Some(key), &Envelope::of(value))
    }

    fn dispatch(&self, topic: &str, key: Option<Vec<u8>>, envelope: &Envelope<V>) -> DeliveryHandle {
        let Some(transport) = &self.transport else {
            return DeliveryHandle::ready(Err(Error::Closed));
        };

        match JsonEnvelopeSerializer.serialize(envelope) {
            Ok(payload) => transport.send(OutboundRecord {
                topic: topic.to_string(),
                key,
                payload,
            }),
            Err(e) => DeliveryHandle::ready(Err(e)),
        }
    }

    /// Release the transport, flushing outstanding deliveries. Idempotent.
    pub fn close(&mut self) {
        if let Some(transport) = self.transport.take() {
            match transport.close() {
                Ok(()) => info!("Producer closed"),
                Err(e) => warn!("Producer closed with error: {e}"),
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.transport.is_none()
    }

    /// The transport, until the client is closed.
    pub fn transport(&self) -> Option<&T> {
        self.transport.as_ref()
    }
}
