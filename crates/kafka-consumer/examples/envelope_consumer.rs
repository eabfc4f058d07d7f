use clap::Parser;
use kafka_envelope_consumer::{
    Client, ConsumerArgs, ConsumerRecord, RebalanceListener, TopicPartition, ValueCodec,
};
use serde::Deserialize;

/// Example consuming JSON envelopes of `OrderPlaced`
///
/// This example shows how to:
/// 1. Register a payload type under a name
/// 2. Build a validated consumer configuration from CLI arguments
/// 3. Observe partition rebalances
/// 4. Spawn multiple consumers in the same consumer group
///
/// To run this example:
/// 1. Start Kafka with Docker
///   docker run -d --name kafka -p 9092:9092 apache/kafka:latest
/// 2. Run the example
///   cargo run --example envelope_consumer -- --group-id orders --topics orders --commit-mode sync

#[derive(Debug, Deserialize)]
struct OrderPlaced {
    order_id: String,
    amount_cents: u64,
}

#[derive(Parser)]
struct Cli {
    #[command(flatten)]
    consumer: ConsumerArgs,

    /// Number of consumers in the group
    #[arg(long, default_value = "2")]
    consumers: usize,
}

struct LoggingListener;

impl RebalanceListener for LoggingListener {
    fn on_partitions_revoked(&self, partitions: &[TopicPartition]) {
        tracing::info!("Revoked {} partition(s)", partitions.len());
    }

    fn on_partitions_assigned(&self, partitions: &[TopicPartition]) {
        tracing::info!("Assigned {} partition(s)", partitions.len());
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    match run_main().await {
        Ok(_) => {}
        Err(e) => {
            eprintln!("Error: {e:?}");
            std::process::exit(1);
        }
    }
}

async fn run_main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let order_type = envelope_types::registry::register::<OrderPlaced>("shop.OrderPlaced")?;

    let config = cli
        .consumer
        .into_builder()?
        .with_value_deserializer(ValueCodec::TypedJson(order_type))
        .with_rebalance_listener(LoggingListener)
        .with_message_handler(|record: ConsumerRecord| async move {
            let envelope = record
                .value
                .and_then(|value| value.into_envelope::<OrderPlaced>())
                .ok_or_else(|| anyhow::anyhow!("offset {} is not an OrderPlaced", record.offset))?;
            let trace_id = envelope.header("trace-id").unwrap_or("-").to_string();
            let order = envelope.into_payload();
            println!(
                "order {} for {} cents (trace {trace_id})",
                order.order_id, order.amount_cents
            );
            Ok::<_, anyhow::Error>(())
        })
        .build()?;

    let client = Client::new(config);
    let handles = client.spawn_consumer_group(cli.consumers)?;
    println!("Spawned {} consumers", handles.len());

    for handle in handles {
        handle.await??;
    }
    Ok(())
}
