//! Producer handle: one broker connection bound to one topic.
//!
//! # Architecture
//!
//! ```text
//!  handlers ──send()──▶ ProducerHandle ──enqueue()──▶ Transport (librdkafka queue)
//!                            │                              │
//!                            │ TaskTracker                  │ delivery callback
//!                            ▼                              ▼
//!                   DeliveryReportLoop ◀──── mpsc ──── DeliverySink
//! ```
//!
//! `send` is synchronous and returns as soon as the local queue accepts the
//! message. The delivery outcome shows up later in the report loop, which
//! only logs it. The HTTP caller never learns about it.
//!
//! # Module Structure
//!
//! - `event` - `DeliveryEvent` and the sink feeding the report loop
//! - `kafka` - `KafkaTransport` over an rdkafka `ThreadedProducer`
//! - `stats` - enqueue/delivery counters
//!
//! # Lifecycle
//!
//! ```rust,ignore
//! let producer = ProducerHandle::open("fio", &broker_config)?;
//! producer.send(&record)?;            // from any number of tasks
//! producer.shutdown().await;          // once, at teardown
//! ```

mod event;
mod kafka;
mod stats;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::broker_config::ConfigMap;
use crate::error::{AppError, AppResult};
use crate::metrics;
use crate::models::Record;
use crate::services::DeliveryReportLoop;

pub(crate) use event::delivery_channel;
pub use event::{DeliveryEvent, DeliverySink};
pub use kafka::{DeliveryContext, KafkaTransport};
pub use stats::{DeliveryStats, StatsSnapshot};

/// Flush deadline used by [`ProducerHandle::shutdown`].
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(15);

/// The outbound side of a broker connection.
///
/// Implementations own the [`DeliverySink`] they were connected with and
/// must emit exactly one [`DeliveryEvent`] for every successful `enqueue`,
/// at the latest when they are dropped. A failed `enqueue` emits nothing.
pub trait Transport: Send + Sync + 'static {
    /// Admit `payload` to the local outbound queue for `topic`.
    ///
    /// Must not block. Returns `AppError::Enqueue` when the queue is full.
    fn enqueue(&self, topic: &str, payload: Vec<u8>) -> AppResult<()>;

    /// Block until every queued message has been reported or `timeout`
    /// elapses.
    fn flush(&self, timeout: Duration) -> AppResult<()>;
}

/// Shared handle to the producer pipeline.
///
/// Cloning is cheap; all clones refer to the same connection. The handle is
/// created once at startup and [`shutdown`](Self::shutdown) is called once
/// at teardown. Later calls do no teardown of their own, but they still
/// return only after the delivery report loop has exited.
#[derive(Clone)]
pub struct ProducerHandle {
    inner: Arc<Inner>,
}

struct Inner {
    topic: String,
    /// `None` once shutdown has detached the transport.
    transport: RwLock<Option<Box<dyn Transport>>>,
    closed: AtomicBool,
    stats: Arc<DeliveryStats>,
    tracker: TaskTracker,
}

impl ProducerHandle {
    /// Connect to Kafka with pass-through client options and bind to `topic`.
    ///
    /// Must be called within a Tokio runtime: the delivery report loop is
    /// spawned before this returns.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Connection` if the client cannot be created from
    /// `config`.
    pub fn open(topic: impl Into<String>, config: &ConfigMap) -> AppResult<Self> {
        Self::with_transport(topic, |sink| KafkaTransport::connect(config, sink))
    }

    /// Build a handle over any transport.
    ///
    /// `connect` receives the only [`DeliverySink`] for this handle.
    pub fn with_transport<T, F>(topic: impl Into<String>, connect: F) -> AppResult<Self>
    where
        T: Transport,
        F: FnOnce(DeliverySink) -> AppResult<T>,
    {
        let topic = topic.into();
        let (sink, events) = delivery_channel();
        let transport = connect(sink)?;

        let stats = Arc::new(DeliveryStats::new());
        let tracker = TaskTracker::new();
        tracker.spawn(DeliveryReportLoop::new(events, stats.clone()).run());

        info!(topic = %topic, "Producer opened, delivery report loop started");

        Ok(Self {
            inner: Arc::new(Inner {
                topic,
                transport: RwLock::new(Some(Box::new(transport))),
                closed: AtomicBool::new(false),
                stats,
                tracker,
            }),
        })
    }

    /// Serialize `record` and enqueue it for the bound topic.
    ///
    /// Returns as soon as the local queue has accepted the message.
    ///
    /// # Errors
    ///
    /// - `AppError::Serialization` if the record cannot be encoded
    /// - `AppError::Enqueue` if the local queue is full or the handle is shut down
    pub fn send(&self, record: &Record) -> AppResult<()> {
        let started = Instant::now();
        let topic = self.inner.topic.as_str();
        let payload = serde_json::to_vec(record)?;

        debug!(topic, %record, "Sending record");

        let slot = self
            .inner
            .transport
            .read()
            .map_err(|_| AppError::Enqueue("producer state lock poisoned".to_string()))?;

        let Some(transport) = slot.as_ref() else {
            metrics::record_enqueue(topic, "closed");
            return Err(AppError::Enqueue("producer is shut down".to_string()));
        };

        match transport.enqueue(topic, payload) {
            Ok(()) => {
                self.inner.stats.record_enqueued();
                metrics::record_enqueue(topic, "accepted");
                metrics::record_send_duration(topic, started.elapsed().as_secs_f64());
                Ok(())
            }
            Err(e) => {
                metrics::record_enqueue(topic, "rejected");
                Err(e)
            }
        }
    }

    /// Flush with [`DEFAULT_FLUSH_TIMEOUT`], close the connection and wait
    /// for the delivery report loop to exit.
    pub async fn shutdown(&self) {
        self.shutdown_with_timeout(DEFAULT_FLUSH_TIMEOUT).await;
    }

    /// Like [`shutdown`](Self::shutdown) with an explicit flush deadline.
    ///
    /// Order matters: sends are cut off first, then the queue is flushed,
    /// then the transport is dropped (closing the event channel), and only
    /// then is the loop awaited. Returns once the loop has exited.
    pub async fn shutdown_with_timeout(&self, timeout: Duration) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            // Another caller owns the teardown; resolves once it has closed
            // the tracker and the loop has exited
            debug!(topic = %self.inner.topic, "Producer already shutting down, waiting");
            self.inner.tracker.wait().await;
            return;
        }

        info!(
            topic = %self.inner.topic,
            timeout_ms = timeout.as_millis() as u64,
            "Shutting down producer"
        );

        // Waits for in-progress sends to release their read locks
        let transport = match self.inner.transport.write() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        if let Some(transport) = transport {
            let flushed = tokio::task::spawn_blocking(move || {
                let result = transport.flush(timeout);
                drop(transport);
                result
            })
            .await;

            match flushed {
                Ok(Ok(())) => debug!("Producer queue flushed"),
                Ok(Err(e)) => warn!(error = %e, "Flush deadline reached with messages outstanding"),
                Err(e) => error!(error = %e, "Flush task failed"),
            }
        }

        self.inner.tracker.close();
        self.inner.tracker.wait().await;

        let stats = self.inner.stats.snapshot();
        info!(
            topic = %self.inner.topic,
            enqueued = stats.enqueued,
            delivered = stats.delivered,
            failed = stats.failed,
            "Producer shut down"
        );
    }

    /// Topic every record is produced to.
    pub fn topic(&self) -> &str {
        &self.inner.topic
    }

    /// Whether shutdown has started.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Whether the delivery report loop is still running.
    pub fn delivery_loop_running(&self) -> bool {
        !self.inner.tracker.is_empty()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.inner.stats.snapshot()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Acknowledges every message right away from inside `enqueue`.
    struct EchoTransport {
        sink: DeliverySink,
    }

    impl Transport for EchoTransport {
        fn enqueue(&self, topic: &str, payload: Vec<u8>) -> AppResult<()> {
            self.sink.report(DeliveryEvent::Delivered {
                topic: topic.to_string(),
                partition: 0,
                offset: 0,
                value: String::from_utf8(payload).unwrap(),
            });
            Ok(())
        }

        fn flush(&self, _timeout: Duration) -> AppResult<()> {
            Ok(())
        }
    }

    /// Holds messages until flushed; reports leftovers as failed on drop.
    struct HoldingTransport {
        sink: DeliverySink,
        pending: Mutex<Vec<(String, Vec<u8>)>>,
        deliver_on_flush: bool,
    }

    impl Transport for HoldingTransport {
        fn enqueue(&self, topic: &str, payload: Vec<u8>) -> AppResult<()> {
            self.pending.lock().unwrap().push((topic.to_string(), payload));
            Ok(())
        }

        fn flush(&self, _timeout: Duration) -> AppResult<()> {
            if !self.deliver_on_flush {
                return Err(AppError::Flush("timed out".to_string()));
            }
            for (topic, payload) in self.pending.lock().unwrap().drain(..) {
                self.sink.report(DeliveryEvent::Delivered {
                    topic,
                    partition: 1,
                    offset: 7,
                    value: String::from_utf8(payload).unwrap(),
                });
            }
            Ok(())
        }
    }

    impl Drop for HoldingTransport {
        fn drop(&mut self) {
            for (topic, _) in self.pending.lock().unwrap().drain(..) {
                self.sink.report(DeliveryEvent::Failed {
                    topic,
                    reason: "purged".to_string(),
                });
            }
        }
    }

    fn holding(deliver_on_flush: bool) -> ProducerHandle {
        ProducerHandle::with_transport("fio", |sink| {
            Ok(HoldingTransport {
                sink,
                pending: Mutex::new(Vec::new()),
                deliver_on_flush,
            })
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_send_then_shutdown_reports_once() {
        let producer =
            ProducerHandle::with_transport("fio", |sink| Ok(EchoTransport { sink })).unwrap();

        producer.send(&Record::new("A", "B", "C")).unwrap();
        producer.shutdown().await;

        let stats = producer.stats();
        assert_eq!(stats.enqueued, 1);
        assert_eq!(stats.delivered, 1);
        assert_eq!(stats.failed, 0);
        assert!(!producer.delivery_loop_running());
    }

    #[tokio::test]
    async fn test_flush_delivers_pending() {
        let producer = holding(true);
        for _ in 0..3 {
            producer.send(&Record::default()).unwrap();
        }
        assert_eq!(producer.stats().reported(), 0);

        producer.shutdown().await;
        assert_eq!(producer.stats().delivered, 3);
    }

    #[tokio::test]
    async fn test_flush_timeout_reports_leftovers_as_failed() {
        let producer = holding(false);
        producer.send(&Record::default()).unwrap();
        producer.send(&Record::default()).unwrap();

        producer.shutdown_with_timeout(Duration::from_millis(10)).await;

        let stats = producer.stats();
        assert_eq!(stats.delivered, 0);
        assert_eq!(stats.failed, 2);
        assert!(!producer.delivery_loop_running());
    }

    #[tokio::test]
    async fn test_send_after_shutdown_is_enqueue_error() {
        let producer = holding(true);
        producer.shutdown().await;

        let result = producer.send(&Record::default());
        assert!(matches!(result, Err(AppError::Enqueue(_))));
        assert_eq!(producer.stats().enqueued, 0);
    }

    #[tokio::test]
    async fn test_shutdown_twice_is_noop() {
        let producer = holding(true);
        producer.send(&Record::default()).unwrap();

        producer.shutdown().await;
        assert!(producer.is_closed());
        producer.shutdown().await;

        assert_eq!(producer.stats().delivered, 1);
    }

    /// Flush blocks for a while before delivering.
    struct SlowFlushTransport {
        inner: HoldingTransport,
        delay: Duration,
    }

    impl Transport for SlowFlushTransport {
        fn enqueue(&self, topic: &str, payload: Vec<u8>) -> AppResult<()> {
            self.inner.enqueue(topic, payload)
        }

        fn flush(&self, timeout: Duration) -> AppResult<()> {
            std::thread::sleep(self.delay);
            self.inner.flush(timeout)
        }
    }

    #[tokio::test]
    async fn test_concurrent_shutdown_waits_for_loop_exit() {
        let producer = ProducerHandle::with_transport("fio", |sink| {
            Ok(SlowFlushTransport {
                inner: HoldingTransport {
                    sink,
                    pending: Mutex::new(Vec::new()),
                    deliver_on_flush: true,
                },
                delay: Duration::from_millis(300),
            })
        })
        .unwrap();
        producer.send(&Record::default()).unwrap();

        let first = tokio::spawn({
            let producer = producer.clone();
            async move { producer.shutdown().await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(producer.is_closed());

        producer.shutdown().await;
        assert!(!producer.delivery_loop_running());
        assert_eq!(producer.stats().delivered, 1);

        first.await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_failure_propagates() {
        let result = ProducerHandle::with_transport("fio", |_sink| {
            Err::<EchoTransport, _>(AppError::Connection("bad brokers".to_string()))
        });
        assert!(matches!(result, Err(AppError::Connection(_))));
    }
}
