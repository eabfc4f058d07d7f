//! CLI argument definitions for the envelope consumer.

use crate::config::{CommitMode, ConsumerConfig, ConsumerConfigBuilder, OffsetReset};
use crate::error::{Error, Result};
use clap::Args;
use regex::Regex;
use std::time::Duration;

/// Kafka consumer arguments.
///
/// Only options given on the command line are written to the option set;
/// everything else keeps the client default.
#[derive(Args, Clone, Debug)]
pub struct ConsumerArgs {
    /// Kafka brokers (comma-separated, e.g., "localhost:9092")
    #[arg(long, env = "KAFKA_BROKERS", default_value = "localhost:9092", value_delimiter = ',')]
    pub kafka_brokers: Vec<String>,

    /// Consumer group ID
    #[arg(long, env = "KAFKA_GROUP_ID")]
    pub group_id: Option<String>,

    /// Topics to subscribe to (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub topics: Vec<String>,

    /// Regular expression selecting the topics to subscribe to
    #[arg(long, conflicts_with = "topics")]
    pub topic_pattern: Option<String>,

    /// Where to start when the group has no committed offset
    #[arg(long, value_enum)]
    pub auto_offset_reset: Option<OffsetReset>,

    /// Session timeout in milliseconds
    #[arg(long)]
    pub session_timeout_ms: Option<u64>,

    /// Enable the client's periodic auto commit
    #[arg(long, action = clap::ArgAction::Set)]
    pub enable_auto_commit: Option<bool>,

    /// Commit after each handled poll
    #[arg(long, value_enum, default_value = "none")]
    pub commit_mode: CommitMode,

    /// Maximum records handed out per poll
    #[arg(long)]
    pub max_poll_records: Option<usize>,

    /// Client ID reported to the brokers
    #[arg(long)]
    pub client_id: Option<String>,
}

impl ConsumerArgs {
    /// Start a [`ConsumerConfigBuilder`] from these arguments.
    ///
    /// The caller still chooses codecs and the message handler.
    pub fn into_builder(self) -> Result<ConsumerConfigBuilder> {
        let mut builder = ConsumerConfig::builder()
            .with_servers(&self.kafka_brokers)
            .with_commit_mode(self.commit_mode);

        if !self.topics.is_empty() {
            builder = builder.with_topics(self.topics);
        }
        if let Some(pattern) = self.topic_pattern {
            let pattern = Regex::new(&pattern)
                .map_err(|e| Error::InvalidConfig(format!("Invalid topic pattern '{pattern}': {e}")))?;
            builder = builder.with_topic_pattern(pattern);
        }
        if let Some(group_id) = self.group_id {
            builder = builder.with_group_id(group_id);
        }
        if let Some(offset_reset) = self.auto_offset_reset {
            builder = builder.with_auto_offset_reset(offset_reset);
        }
        if let Some(ms) = self.session_timeout_ms {
            builder = builder.with_session_timeout(Duration::from_millis(ms));
        }
        if let Some(enable_auto_commit) = self.enable_auto_commit {
            builder = builder.with_enable_auto_commit(enable_auto_commit);
        }
        if let Some(max_poll_records) = self.max_poll_records {
            builder = builder.with_max_poll_records(max_poll_records);
        }
        if let Some(client_id) = self.client_id {
            builder = builder.with_client_id(client_id);
        }
        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::ConsumerRecord;
    use clap::Parser;
    use envelope_types::keys;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        consumer: ConsumerArgs,
    }

    fn parse(args: &[&str]) -> ConsumerArgs {
        Cli::try_parse_from(std::iter::once("consumer").chain(args.iter().copied()))
            .unwrap()
            .consumer
    }

    #[test]
    fn test_args_to_config() {
        let args = parse(&[
            "--kafka-brokers",
            "a:9092,b:9092",
            "--group-id",
            "orders-group",
            "--topics",
            "orders,refunds",
            "--auto-offset-reset",
            "earliest",
            "--enable-auto-commit",
            "false",
            "--commit-mode",
            "sync",
            "--max-poll-records",
            "20",
        ]);

        let config = args
            .into_builder()
            .unwrap()
            .with_message_handler(|_record: ConsumerRecord| async { Ok::<_, anyhow::Error>(()) })
            .build()
            .unwrap();

        let properties = config.properties();
        assert_eq!(properties.get_str(keys::BOOTSTRAP_SERVERS), Some("a:9092,b:9092"));
        assert_eq!(properties.get_str(keys::AUTO_OFFSET_RESET), Some("earliest"));
        assert_eq!(config.group_id(), Some("orders-group"));
        assert_eq!(config.topics(), ["orders".to_string(), "refunds".to_string()]);
        assert!(config.is_commit_sync());
        assert!(!config.is_enable_auto_commit());
        assert_eq!(config.max_poll_records(), 20);
    }

    #[test]
    fn test_topics_and_pattern_conflict() {
        let result = Cli::try_parse_from([
            "consumer",
            "--topics",
            "orders",
            "--topic-pattern",
            "orders-.*",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let err = parse(&["--topic-pattern", "orders-("])
            .into_builder()
            .err()
            .unwrap();
        assert!(err.is_configuration());
    }
}
