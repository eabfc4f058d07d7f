//! librdkafka context forwarding group events to the [`RebalanceListener`].

use crate::listener::{RebalanceListener, TopicPartition};
use rdkafka::client::ClientContext;
use rdkafka::consumer::{ConsumerContext, Rebalance};
use rdkafka::error::KafkaResult;
use rdkafka::TopicPartitionList;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct ListenerContext {
    listener: Arc<dyn RebalanceListener>,
}

impl ListenerContext {
    pub fn new(listener: Arc<dyn RebalanceListener>) -> Self {
        Self { listener }
    }
}

impl ClientContext for ListenerContext {}

impl ConsumerContext for ListenerContext {
    fn pre_rebalance(&self, rebalance: &Rebalance<'_>) {
        match rebalance {
            Rebalance::Revoke(tpl) => {
                let partitions = partitions_of(tpl);
                debug!("Partitions revoked: {}", join(&partitions));
                self.listener.on_partitions_revoked(&partitions);
            }
            Rebalance::Assign(_) => {}
            Rebalance::Error(e) => warn!("Rebalance failed: {e}"),
        }
    }

    fn post_rebalance(&self, rebalance: &Rebalance<'_>) {
        if let Rebalance::Assign(tpl) = rebalance {
            let partitions = partitions_of(tpl);
            debug!("Partitions assigned: {}", join(&partitions));
            self.listener.on_partitions_assigned(&partitions);
        }
    }

    fn commit_callback(&self, result: KafkaResult<()>, offsets: &TopicPartitionList) {
        if let Err(e) = result {
            warn!("Offset commit failed for {} partition(s): {e}", offsets.count());
        }
    }
}

pub(crate) fn partitions_of(tpl: &TopicPartitionList) -> Vec<TopicPartition> {
    tpl.elements()
        .iter()
        .map(|elem| TopicPartition::new(elem.topic(), elem.partition()))
        .collect()
}

fn join(partitions: &[TopicPartition]) -> String {
    partitions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
