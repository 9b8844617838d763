//! Shared helpers for integration tests.
//!
//! `ScriptedTransport` stands in for the Kafka client so tests can decide
//! when messages are acknowledged, when the local queue refuses them, and
//! what is left over at shutdown.
#![allow(dead_code)]

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fio_producer::producer::DeliverySink;
use fio_producer::{
    AppError, AppResult, AppState, Config, DeliveryEvent, ProducerHandle, Transport, build_router,
};
use tokio::net::TcpListener;
use tracing_subscriber::fmt::MakeWriter;

pub const TOPIC: &str = "fio";

/// When accepted messages get their delivery report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    /// Reported from inside `enqueue`.
    Immediate,
    /// Held until `flush`, then reported as delivered.
    OnFlush,
    /// Held; `flush` times out and the leftovers fail when the transport drops.
    Never,
}

/// Behaviour of a [`ScriptedTransport`].
#[derive(Debug, Clone, Copy)]
pub struct Script {
    pub ack: Ack,
    /// 1-based enqueue attempt that is refused, if any.
    pub fail_at: Option<usize>,
    /// Refuse every enqueue as if the local queue were full.
    pub saturated: bool,
}

impl Script {
    pub fn acking(ack: Ack) -> Self {
        Self {
            ack,
            fail_at: None,
            saturated: false,
        }
    }

    pub fn failing_at(k: usize) -> Self {
        Self {
            fail_at: Some(k),
            ..Self::acking(Ack::Immediate)
        }
    }

    pub fn saturated() -> Self {
        Self {
            saturated: true,
            ..Self::acking(Ack::Immediate)
        }
    }
}

/// What the transport saw, shared with the test.
#[derive(Clone, Default)]
pub struct Probe {
    /// Payloads accepted into the "queue", in order.
    pub accepted: Arc<Mutex<Vec<String>>>,
    /// Enqueue calls, accepted or not.
    pub attempts: Arc<AtomicUsize>,
}

impl Probe {
    pub fn accepted(&self) -> Vec<String> {
        self.accepted.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

pub struct ScriptedTransport {
    sink: DeliverySink,
    script: Script,
    probe: Probe,
    pending: Mutex<Vec<(String, String)>>,
    next_offset: AtomicI64,
}

impl ScriptedTransport {
    fn delivered(&self, topic: String, value: String) -> DeliveryEvent {
        DeliveryEvent::Delivered {
            topic,
            partition: 0,
            offset: self.next_offset.fetch_add(1, Ordering::SeqCst),
            value,
        }
    }
}

impl Transport for ScriptedTransport {
    fn enqueue(&self, topic: &str, payload: Vec<u8>) -> AppResult<()> {
        let attempt = self.probe.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.script.saturated || self.script.fail_at == Some(attempt) {
            return Err(AppError::Enqueue("local producer queue is full".to_string()));
        }

        let value = String::from_utf8(payload).unwrap();
        self.probe.accepted.lock().unwrap().push(value.clone());

        match self.script.ack {
            Ack::Immediate => self.sink.report(self.delivered(topic.to_string(), value)),
            Ack::OnFlush | Ack::Never => {
                self.pending.lock().unwrap().push((topic.to_string(), value));
            }
        }
        Ok(())
    }

    fn flush(&self, _timeout: Duration) -> AppResult<()> {
        if self.script.ack == Ack::Never {
            return Err(AppError::Flush("messages still in queue".to_string()));
        }
        let pending: Vec<_> = self.pending.lock().unwrap().drain(..).collect();
        for (topic, value) in pending {
            self.sink.report(self.delivered(topic, value));
        }
        Ok(())
    }
}

impl Drop for ScriptedTransport {
    fn drop(&mut self) {
        for (topic, _) in self.pending.lock().unwrap().drain(..) {
            self.sink.report(DeliveryEvent::Failed {
                topic,
                reason: "purged at shutdown".to_string(),
            });
        }
    }
}

/// Open a producer over a scripted transport. Needs a Tokio runtime.
pub fn scripted_producer(script: Script) -> (ProducerHandle, Probe) {
    let probe = Probe::default();
    let transport_probe = probe.clone();

    let producer = ProducerHandle::with_transport(TOPIC, move |sink| {
        Ok(ScriptedTransport {
            sink,
            script,
            probe: transport_probe,
            pending: Mutex::new(Vec::new()),
            next_offset: AtomicI64::new(0),
        })
    })
    .unwrap();

    (producer, probe)
}

/// A running HTTP server over a scripted producer.
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
    pub probe: Probe,
}

impl TestServer {
    pub async fn start(script: Script) -> Self {
        Self::start_with_config(script, test_config()).await
    }

    pub async fn start_with_config(script: Script, config: Config) -> Self {
        let (producer, probe) = scripted_producer(script);
        let state = AppState::new(producer, config);
        let app = build_router(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state, probe }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        metrics_port: 0,
        ..Config::default()
    }
}

/// In-memory log sink for `tracing_subscriber::fmt().with_writer(..)`.
#[derive(Clone, Default)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
