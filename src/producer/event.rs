//! Delivery outcomes and the channel that carries them.

use std::fmt;

use tokio::sync::mpsc;
use tracing::warn;

/// Outcome of one accepted send, reported out of band by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryEvent {
    /// The broker acknowledged the message.
    Delivered {
        topic: String,
        partition: i32,
        offset: i64,
        value: String,
    },
    /// The broker client gave up on the message.
    Failed { topic: String, reason: String },
}

impl DeliveryEvent {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryEvent::Delivered { .. })
    }

    pub fn topic(&self) -> &str {
        match self {
            DeliveryEvent::Delivered { topic, .. } | DeliveryEvent::Failed { topic, .. } => topic,
        }
    }
}

impl fmt::Display for DeliveryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryEvent::Delivered {
                topic,
                partition,
                offset,
                ..
            } => write!(f, "delivered to {topic}[{partition}]@{offset}"),
            DeliveryEvent::Failed { topic, reason } => {
                write!(f, "delivery to {topic} failed: {reason}")
            }
        }
    }
}

/// Sending end of the delivery event channel.
///
/// There is exactly one sink per producer handle and it is owned by the
/// transport. The delivery report loop exits once the sink is dropped, so a
/// transport must release it when it is dropped itself.
#[derive(Debug)]
pub struct DeliverySink {
    tx: mpsc::UnboundedSender<DeliveryEvent>,
}

impl DeliverySink {
    /// Hand an outcome to the delivery report loop.
    ///
    /// Never blocks; safe to call from the broker client's callback thread.
    pub fn report(&self, event: DeliveryEvent) {
        if let Err(mpsc::error::SendError(event)) = self.tx.send(event) {
            warn!(%event, "Delivery report dropped, report loop is gone");
        }
    }
}

/// Create the event channel shared by a transport and its report loop.
pub(crate) fn delivery_channel() -> (DeliverySink, mpsc::UnboundedReceiver<DeliveryEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (DeliverySink { tx }, rx)
}
