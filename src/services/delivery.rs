//! Background consumer of delivery reports.
//!
//! One loop runs per producer handle. It is the sole reader of the delivery
//! event channel and ends when the channel closes, which only happens after
//! shutdown has flushed and dropped the transport.
//!
//! Outcomes are observed, never acted upon: no retry, no dead-letter queue.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::metrics;
use crate::producer::{DeliveryEvent, DeliveryStats};

/// Drains [`DeliveryEvent`]s and logs each one.
pub struct DeliveryReportLoop {
    events: mpsc::UnboundedReceiver<DeliveryEvent>,
    stats: Arc<DeliveryStats>,
}

impl DeliveryReportLoop {
    pub fn new(events: mpsc::UnboundedReceiver<DeliveryEvent>, stats: Arc<DeliveryStats>) -> Self {
        Self { events, stats }
    }

    /// Run until the event channel is closed.
    pub async fn run(mut self) {
        debug!("Delivery report loop running");

        while let Some(event) = self.events.recv().await {
            self.handle(event);
        }

        debug!("Delivery event channel closed, report loop exiting");
    }

    fn handle(&self, event: DeliveryEvent) {
        match event {
            DeliveryEvent::Delivered {
                topic,
                partition,
                offset,
                value,
            } => {
                self.stats.record_delivered();
                metrics::record_delivery(&topic, "delivered");
                info!(
                    topic = %topic,
                    partition,
                    offset,
                    value = %value,
                    "Produced event to topic"
                );
            }
            DeliveryEvent::Failed { topic, reason } => {
                self.stats.record_failed();
                metrics::record_delivery(&topic, "failed");
                error!(topic = %topic, reason = %reason, "Failed to deliver message");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_loop_counts_each_event_once_and_exits_on_close() {
        let (tx, rx) = mpsc::unbounded_channel();
        let stats = Arc::new(DeliveryStats::new());
        let handle = tokio::spawn(DeliveryReportLoop::new(rx, stats.clone()).run());

        tx.send(DeliveryEvent::Delivered {
            topic: "fio".to_string(),
            partition: 0,
            offset: 1,
            value: "{}".to_string(),
        })
        .unwrap();
        tx.send(DeliveryEvent::Failed {
            topic: "fio".to_string(),
            reason: "Message timed out".to_string(),
        })
        .unwrap();
        drop(tx);

        handle.await.unwrap();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.delivered, 1);
        assert_eq!(snapshot.failed, 1);
    }

    #[tokio::test]
    async fn test_loop_exits_immediately_on_empty_closed_channel() {
        let (tx, rx) = mpsc::unbounded_channel::<DeliveryEvent>();
        drop(tx);

        let stats = Arc::new(DeliveryStats::new());
        DeliveryReportLoop::new(rx, stats.clone()).run().await;
        assert_eq!(stats.snapshot().reported(), 0);
    }
}
