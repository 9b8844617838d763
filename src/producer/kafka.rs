//! rdkafka-backed transport.
//!
//! Uses a `ThreadedProducer`, whose internal thread polls librdkafka and
//! invokes [`DeliveryContext::delivery`] once per message. The context owns
//! the [`DeliverySink`], so the event channel closes when the producer is
//! dropped. On drop librdkafka purges anything still queued and reports each
//! purged message as a failed delivery first.

use std::time::Duration;

use rdkafka::ClientConfig;
use rdkafka::client::ClientContext;
use rdkafka::config::RDKafkaLogLevel;
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use rdkafka::message::Message;
use rdkafka::producer::{BaseRecord, DeliveryResult, Producer, ProducerContext, ThreadedProducer};
use tracing::{debug, error, info, trace, warn};

use super::{DeliveryEvent, DeliverySink, Transport};
use crate::broker_config::ConfigMap;
use crate::error::{AppError, AppResult};

/// Client context forwarding delivery reports and librdkafka logs.
pub struct DeliveryContext {
    sink: DeliverySink,
}

impl ClientContext for DeliveryContext {
    fn log(&self, level: RDKafkaLogLevel, fac: &str, log_message: &str) {
        match level {
            RDKafkaLogLevel::Emerg
            | RDKafkaLogLevel::Alert
            | RDKafkaLogLevel::Critical
            | RDKafkaLogLevel::Error => error!(target: "librdkafka", fac, "{log_message}"),
            RDKafkaLogLevel::Warning => warn!(target: "librdkafka", fac, "{log_message}"),
            RDKafkaLogLevel::Notice | RDKafkaLogLevel::Info => {
                info!(target: "librdkafka", fac, "{log_message}")
            }
            RDKafkaLogLevel::Debug => debug!(target: "librdkafka", fac, "{log_message}"),
        }
    }

    fn error(&self, error: KafkaError, reason: &str) {
        error!(target: "librdkafka", error = %error, "{reason}");
    }
}

impl ProducerContext for DeliveryContext {
    type DeliveryOpaque = ();

    fn delivery(&self, delivery_result: &DeliveryResult<'_>, _delivery_opaque: Self::DeliveryOpaque) {
        let event = match delivery_result {
            Ok(message) => DeliveryEvent::Delivered {
                topic: message.topic().to_string(),
                partition: message.partition(),
                offset: message.offset(),
                value: message
                    .payload()
                    .map(|p| String::from_utf8_lossy(p).into_owned())
                    .unwrap_or_default(),
            },
            Err((err, message)) => DeliveryEvent::Failed {
                topic: message.topic().to_string(),
                reason: err.to_string(),
            },
        };
        trace!(%event, "Delivery callback");
        self.sink.report(event);
    }
}

/// Transport over a librdkafka producer.
pub struct KafkaTransport {
    producer: ThreadedProducer<DeliveryContext>,
}

impl KafkaTransport {
    /// Create the librdkafka client from pass-through options.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Connection` if librdkafka rejects the configuration
    /// (unknown property, malformed value).
    pub fn connect(config: &ConfigMap, sink: DeliverySink) -> AppResult<Self> {
        let mut client_config = ClientConfig::new();
        for (key, value) in config {
            client_config.set(key, value);
        }

        let producer: ThreadedProducer<DeliveryContext> = client_config
            .create_with_context(DeliveryContext { sink })
            .map_err(|e| AppError::Connection(e.to_string()))?;

        debug!(options = config.len(), "Kafka producer created");
        Ok(Self { producer })
    }
}

impl Transport for KafkaTransport {
    fn enqueue(&self, topic: &str, payload: Vec<u8>) -> AppResult<()> {
        // No key and no partition: librdkafka's partitioner picks one
        let record = BaseRecord::<(), Vec<u8>>::to(topic).payload(&payload);

        self.producer
            .send(record)
            .map_err(|(err, _record)| match err {
                KafkaError::MessageProduction(RDKafkaErrorCode::QueueFull) => {
                    AppError::Enqueue("local producer queue is full".to_string())
                }
                other => AppError::Enqueue(other.to_string()),
            })
    }

    fn flush(&self, timeout: Duration) -> AppResult<()> {
        self.producer
            .flush(timeout)
            .map_err(|e| AppError::Flush(e.to_string()))
    }
}
