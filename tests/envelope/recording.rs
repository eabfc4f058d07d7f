use kafka_envelope_producer::{
    DeliveryHandle, OutboundRecord, RecordMetadata, Result, Transport,
};
use std::sync::{Arc, Mutex};

/// In-memory transport acknowledging each record at the next offset of
/// partition 0.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    records: Arc<Mutex<Vec<OutboundRecord>>>,
}

impl RecordingTransport {
    pub fn records(&self) -> Vec<OutboundRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, record: OutboundRecord) -> DeliveryHandle {
        let mut records = self.records.lock().unwrap();
        let metadata = RecordMetadata {
            topic: record.topic.clone(),
            partition: 0,
            offset: records.len() as i64,
        };
        records.push(record);
        DeliveryHandle::ready(Ok(metadata))
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}
