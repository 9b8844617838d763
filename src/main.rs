use std::net::SocketAddr;
use std::process::ExitCode;

use tokio::net::TcpListener;
use tracing::{error, info};

use fio_producer::config::LogFormat;
use fio_producer::{
    AppState, Config, ProducerHandle, build_router, load_broker_config, logging, metrics, utils,
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::from(exitcode::OK as u8),
        Err(exit_code) => ExitCode::from(exit_code as u8),
    }
}

/// Run the application, returning an exit code on error.
async fn run() -> Result<(), exitcode::ExitCode> {
    // Configuration comes first; the logger depends on it
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            let _ = logging::init_logging("info", LogFormat::Json);
            error!("Configuration error: {e}");
            return Err(exitcode::CONFIG);
        }
    };

    logging::init_logging(&config.log_level, config.log_format).map_err(|e| {
        eprintln!("{e}");
        exitcode::CONFIG
    })?;

    info!("Starting FIO producer v{}", env!("CARGO_PKG_VERSION"));
    info!(
        host = %config.host,
        port = %config.port,
        topic = %config.kafka_topic,
        broker_config = %config.kafka_config_path.display(),
        "Configuration loaded"
    );

    if let Some(addr) = config.metrics_addr() {
        metrics::try_init_metrics(addr);
    }

    let broker = load_broker_config(&config.kafka_config_path).map_err(|e| {
        error!("Failed to load broker configuration: {e}");
        exitcode::CONFIG
    })?;
    info!(properties = broker.len(), "Broker configuration loaded");

    let producer = ProducerHandle::open(&config.kafka_topic, &broker).map_err(|e| {
        error!("Failed to create Kafka producer: {e}");
        exitcode::UNAVAILABLE
    })?;
    info!(topic = %config.kafka_topic, "Kafka producer ready");

    let state = AppState::new(producer, config.clone());
    let app = build_router(state.clone());

    let addr: SocketAddr = match config.server_addr().parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Invalid server address: {e}");
            state.shutdown().await;
            return Err(exitcode::CONFIG);
        }
    };
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {addr}: {e}");
            state.shutdown().await;
            return Err(exitcode::UNAVAILABLE);
        }
    };

    info!("Server listening on http://{addr}");
    info!("API endpoints:");
    info!("  GET  /                    - Welcome");
    info!("  POST /send-fio            - Send one record");
    info!("  POST /send-fio/list       - Send a list of records");
    info!("  GET  /health              - Producer status");
    info!("  GET  /swagger/index.html  - API documentation");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(utils::shutdown_signal())
        .await;

    // Flush whatever the server accepted, even if it stopped on an error
    info!("HTTP server stopped, flushing producer...");
    state.shutdown().await;

    served.map_err(|e| {
        error!("Server error: {e}");
        exitcode::SOFTWARE
    })?;

    info!("Server shutdown complete");
    Ok(())
}
