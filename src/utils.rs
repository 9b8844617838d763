use tokio::signal;
use tracing::{error, warn};

/// Resolve once the process receives SIGINT (Ctrl+C) or SIGTERM.
///
/// A handler that cannot be installed is logged and its branch never fires;
/// the other signal still triggers shutdown.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, stopping HTTP server and flushing producer...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, stopping HTTP server and flushing producer...");
        }
    }
}
