//! Rebalance listener capability.

use std::fmt;

/// A topic partition whose ownership changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopicPartition {
    pub topic: String,
    pub partition: i32,
}

impl TopicPartition {
    pub fn new(topic: impl Into<String>, partition: i32) -> Self {
        Self {
            topic: topic.into(),
            partition,
        }
    }
}

impl fmt::Display for TopicPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.topic, self.partition)
    }
}

/// Invoked by the consumer-group runtime when partition ownership changes.
///
/// Revocations are reported before the rebalance is applied, assignments
/// after. Both run on the client's rebalance callback, so implementations
/// should return quickly.
pub trait RebalanceListener: Send + Sync {
    fn on_partitions_revoked(&self, _partitions: &[TopicPartition]) {}

    fn on_partitions_assigned(&self, _partitions: &[TopicPartition]) {}
}

/// Ignores every rebalance. The default listener.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpRebalanceListener;

impl RebalanceListener for NoOpRebalanceListener {}
