use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancels `cancel` on Ctrl-C, and on SIGTERM where that exists. The handlers are
/// registered before this returns.
pub fn spawn_shutdown_listener(cancel: CancellationToken) -> std::io::Result<JoinHandle<()>> {
    #[cfg(unix)]
    let mut terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    Ok(tokio::spawn(async move {
        #[cfg(unix)]
        let signal = tokio::select! {
            _ = ctrl_c() => "SIGINT",
            _ = terminate.recv() => "SIGTERM",
        };
        #[cfg(not(unix))]
        let signal = {
            ctrl_c().await;
            "Ctrl-C"
        };

        tracing::info!(signal, "Shutdown requested");
        cancel.cancel();
    }))
}

async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No handler could be installed; leave it to the other signals.
        std::future::pending::<()>().await;
    }
}
