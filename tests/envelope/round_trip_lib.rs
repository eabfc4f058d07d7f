use crate::recording::RecordingTransport;
use kafka_envelope::consumer::{ConsumerRecord, RecordDecoder, RecordValue};
use kafka_envelope::{
    ConsumerConfig, Envelope, Headers, KeyCodec, ProducerClient, TypeRegistry, ValueCodec,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Shipment {
    id: String,
    weight_grams: u32,
    fragile: bool,
    tags: Vec<String>,
}

fn shipment(n: u32) -> Shipment {
    Shipment {
        id: format!("s-{n}"),
        weight_grams: 250 * n,
        fragile: n % 2 == 0,
        tags: (0..n).map(|i| format!("tag-{i}")).collect(),
    }
}

fn decode_all(decoder: &RecordDecoder, transport: &RecordingTransport) -> Vec<ConsumerRecord> {
    transport
        .records()
        .iter()
        .enumerate()
        .map(|(offset, record)| {
            decoder
                .decode(
                    &record.topic,
                    0,
                    offset as i64,
                    None,
                    record.key.as_deref(),
                    Some(&record.payload),
                )
                .unwrap()
        })
        .collect()
}

#[tokio::test]
async fn test_producer_to_typed_consumer_round_trip() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let mut registry = TypeRegistry::new();
    let shipment_type = registry.register::<Shipment>("logistics.Shipment").unwrap();
    let registry = Arc::new(registry);

    let transport = RecordingTransport::default();
    let producer = ProducerClient::<Shipment, _>::with_transport(transport.clone());

    let mut headers = Headers::new();
    headers.insert("trace-id".to_string(), "abc".to_string());
    headers.insert("origin".to_string(), "warehouse-3".to_string());

    producer.send("shipments", shipment(1)).await.unwrap();
    producer
        .send_with_headers("shipments", shipment(2), headers.clone())
        .await
        .unwrap();
    producer
        .send_envelope("shipments", Envelope::with_headers(shipment(3), Headers::new()))
        .await
        .unwrap();
    let metadata = producer.send_keyed("shipments", "s-4", shipment(4)).await.unwrap();
    assert_eq!(metadata.offset, 3);

    let config = ConsumerConfig::builder()
        .with_servers(["localhost:9092"])
        .with_group_id("shipments-group")
        .with_topics(["shipments"])
        .with_key_deserializer(KeyCodec::String)
        .with_value_deserializer(ValueCodec::TypedJson(shipment_type))
        .with_message_handler(|_record: ConsumerRecord| async { Ok::<_, anyhow::Error>(()) })
        .build()
        .unwrap();
    let decoder = RecordDecoder::from_properties(config.properties(), Some(&registry)).unwrap();

    let mut records = decode_all(&decoder, &transport).into_iter();

    let first = records.next().unwrap();
    assert!(first.key.is_none());
    let envelope = first.value.unwrap().into_envelope::<Shipment>().unwrap();
    assert_eq!(envelope, Envelope::of(shipment(1)));

    let second = records.next().unwrap();
    let envelope = second.value.unwrap().into_envelope::<Shipment>().unwrap();
    assert_eq!(envelope.headers(), &headers);
    assert_eq!(envelope.header("origin"), Some("warehouse-3"));
    assert_eq!(envelope.into_payload(), shipment(2));

    let third = records.next().unwrap();
    let envelope = third.value.unwrap().into_envelope::<Shipment>().unwrap();
    assert!(envelope.headers().is_empty());

    let fourth = records.next().unwrap();
    assert_eq!(fourth.offset, 3);
    assert_eq!(fourth.key.as_ref().and_then(RecordValue::as_str), Some("s-4"));
    let envelope = fourth.value.unwrap().into_envelope::<Shipment>().unwrap();
    assert_eq!(envelope.payload(), &shipment(4));

    assert!(records.next().is_none());
}

#[tokio::test]
async fn test_global_registry_resolves_payload_type() {
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Parcel {
        code: String,
    }

    let parcel_type = kafka_envelope::registry::register::<Parcel>("tests.round_trip.Parcel").unwrap();

    let transport = RecordingTransport::default();
    let producer = ProducerClient::<Parcel, _>::with_transport(transport.clone());
    producer
        .send(
            "parcels",
            Parcel {
                code: "P-1".to_string(),
            },
        )
        .await
        .unwrap();

    let config = ConsumerConfig::builder()
        .with_servers(["localhost:9092"])
        .with_topics(["parcels"])
        .with_deserializer_type(parcel_type)
        .with_message_handler(|_record: ConsumerRecord| async { Ok::<_, anyhow::Error>(()) })
        .build()
        .unwrap();
    let decoder = RecordDecoder::from_properties(config.properties(), None).unwrap();

    let record = decode_all(&decoder, &transport).pop().unwrap();
    let parcel = record.value.unwrap().into_envelope::<Parcel>().unwrap().into_payload();
    assert_eq!(parcel.code, "P-1");
}

#[tokio::test]
async fn test_payload_of_another_type_is_a_deserialization_error() {
    let mut registry = TypeRegistry::new();
    let shipment_type = registry.register::<Shipment>("logistics.Shipment").unwrap();
    let registry = Arc::new(registry);

    let transport = RecordingTransport::default();
    let producer = ProducerClient::<&str, _>::with_transport(transport.clone());
    producer.send("shipments", "not a shipment").await.unwrap();

    let config = ConsumerConfig::builder()
        .with_servers(["localhost:9092"])
        .with_topics(["shipments"])
        .with_value_deserializer(ValueCodec::TypedJson(shipment_type))
        .with_message_handler(|_record: ConsumerRecord| async { Ok::<_, anyhow::Error>(()) })
        .build()
        .unwrap();
    let decoder = RecordDecoder::from_properties(config.properties(), Some(&registry)).unwrap();

    let records = transport.records();
    let record = &records[0];
    let err = decoder
        .decode(&record.topic, 0, 0, None, None, Some(&record.payload))
        .unwrap_err();
    assert!(err.is_deserialization());
}
