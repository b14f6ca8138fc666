use tokio::signal;

/// Resolves on Ctrl+C or SIGTERM. `component` only labels the log line.
pub(crate) async fn shutdown_signal(component: &'static str) {
    tokio::select! {
        _ = ctrl_c(component) => {},
        _ = terminate(component) => {},
    }

    tracing::info!(component, "Shutdown signal received");
}

async fn ctrl_c(component: &'static str) {
    if let Err(err) = signal::ctrl_c().await {
        tracing::error!(error = %err, component, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn terminate(component: &'static str) {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(err) => {
            tracing::error!(error = %err, component, "Failed to install SIGTERM handler");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate(_component: &'static str) {
    std::future::pending::<()>().await;
}
