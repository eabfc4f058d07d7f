use clap::Parser;
use envelope_types::Headers;
use kafka_envelope_producer::{create_topic_if_not_exists, ProducerArgs, ProducerClient};
use serde::Serialize;

/// Example publishing `OrderPlaced` envelopes to Kafka
///
/// This example shows how to:
/// 1. Build a producer configuration from CLI arguments
/// 2. Create a Kafka topic if it doesn't exist
/// 3. Send values with and without headers
/// 4. Await delivery acknowledgements
///
/// To run this producer:
/// 1. Start Kafka with Docker:
///    docker run -d --name kafka -p 9092:9092 apache/kafka:latest
/// 2. Run the producer:
///    cargo run -p kafka-envelope-producer --example envelope_producer
/// 3. Run the consumer in another terminal:
///    cargo run -p kafka-envelope-consumer --example envelope_consumer -- --group-id orders --topics orders

#[derive(Debug, Serialize)]
struct OrderPlaced {
    order_id: String,
    amount_cents: u64,
}

#[derive(Parser)]
struct Cli {
    #[command(flatten)]
    producer: ProducerArgs,

    /// Topic to publish to
    #[arg(long, default_value = "orders")]
    topic: String,

    /// Number of orders to publish
    #[arg(long, default_value = "10")]
    count: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    match run_main().await {
        Ok(_) => println!("Producer finished successfully"),
        Err(e) => {
            eprintln!("Error: {e:?}");
            std::process::exit(1);
        }
    }
}

async fn run_main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.producer.into_builder().build()?;

    println!("Creating topic '{}' if it doesn't exist...", cli.topic);
    create_topic_if_not_exists(&config, &cli.topic, 3).await?;

    let mut producer = ProducerClient::<OrderPlaced>::new(&config)?;

    let mut handles = Vec::new();
    for i in 0..cli.count {
        let order = OrderPlaced {
            order_id: format!("order-{i:04}"),
            amount_cents: 100 * (i + 1),
        };
        let handle = if i % 2 == 0 {
            producer.send(&cli.topic, order)
        } else {
            let mut headers = Headers::new();
            headers.insert("trace-id".to_string(), format!("trace-{i}"));
            producer.send_with_headers(&cli.topic, order, headers)
        };
        handles.push(handle);
    }

    for handle in handles {
        let metadata = handle.await?;
        println!(
            "Delivered to {}[{}]@{}",
            metadata.topic, metadata.partition, metadata.offset
        );
    }

    producer.close();
    Ok(())
}
