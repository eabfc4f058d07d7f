use kafka_envelope::consumer::ConsumerRecord;
use kafka_envelope::types::keys;
use kafka_envelope::{
    Acks, CommitMode, ConsumerConfig, OffsetReset, PayloadType, ProducerConfig, ValueCodec,
};
use std::time::Duration;

async fn ignore(_record: ConsumerRecord) -> anyhow::Result<()> {
    Ok(())
}

#[test]
fn test_consumer_transport_entries_exclude_client_side_keys() {
    let config = ConsumerConfig::builder()
        .with_servers(["a:9092", "b:9092"])
        .with_group_id("billing")
        .with_topics(["invoices"])
        .with_auto_offset_reset(OffsetReset::Latest)
        .with_session_timeout(Duration::from_millis(6000))
        .with_enable_auto_commit(false)
        .with_max_poll_records(100)
        .with_commit_sync()
        .with_value_deserializer(ValueCodec::TypedJson(PayloadType::of::<u32>("numbers.U32")))
        .with_message_handler(ignore)
        .build()
        .unwrap();

    assert_eq!(config.commit_mode(), CommitMode::Sync);
    assert!(config.properties().contains_key(keys::DESERIALIZER_CLASS));
    assert!(config.properties().contains_key(keys::MAX_POLL_RECORDS));

    let entries: Vec<(&str, String)> = config.properties().transport_entries().collect();
    assert_eq!(
        entries,
        vec![
            ("auto.offset.reset", "latest".to_string()),
            ("bootstrap.servers", "a:9092,b:9092".to_string()),
            ("enable.auto.commit", "false".to_string()),
            ("group.id", "billing".to_string()),
            ("session.timeout.ms", "6000".to_string()),
        ]
    );
}

#[test]
fn test_producer_transport_entries_exclude_serializers() {
    let config = ProducerConfig::builder()
        .with_servers(["localhost:9092"])
        .with_acks(Acks::Leader)
        .build()
        .unwrap();

    assert!(config.properties().contains_key(keys::KEY_SERIALIZER));
    assert!(config.properties().contains_key(keys::VALUE_SERIALIZER));

    let entries: Vec<(&str, String)> = config.properties().transport_entries().collect();
    assert_eq!(
        entries,
        vec![
            ("acks", "1".to_string()),
            ("bootstrap.servers", "localhost:9092".to_string()),
        ]
    );
}

#[test]
fn test_configuration_errors_surface_before_any_client() {
    let no_handler = ConsumerConfig::builder()
        .with_servers(["localhost:9092"])
        .with_topics(["invoices"])
        .build()
        .unwrap_err();
    assert!(no_handler.is_configuration());

    let no_topics = ConsumerConfig::builder()
        .with_servers(["localhost:9092"])
        .with_message_handler(ignore)
        .build()
        .unwrap_err();
    assert!(no_topics.is_configuration());

    let no_servers = ProducerConfig::builder().build().unwrap_err();
    assert!(no_servers.is_configuration());
}
