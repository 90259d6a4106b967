use std::future;

/// Resolves on CTRL+C or, on unix, SIGTERM.
pub async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(target: "server", error = %err, "failed to listen for CTRL+C");
            future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::warn!(target: "server", error = %err, "failed to listen for SIGTERM");
                future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!(target: "server", "CTRL+C received, shutting down"),
        _ = terminate => tracing::info!(target: "server", "SIGTERM received, shutting down"),
    }
}
