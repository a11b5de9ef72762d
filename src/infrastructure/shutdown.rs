use tokio_util::sync::CancellationToken;

/// Builds the process-wide cancellation token and wires CTRL+C / SIGTERM
/// to it. Every long-lived task takes a child token from the returned one.
pub fn install_signal_handlers() -> CancellationToken {
    let root = CancellationToken::new();

    let ctrlc = root.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("received CTRL+C, shutting down");
            ctrlc.cancel();
        }
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let term = root.clone();
        tokio::spawn(async move {
            if let Ok(mut sig) = signal(SignalKind::terminate()) {
                sig.recv().await;
                tracing::info!("received SIGTERM, shutting down");
                term.cancel();
            }
        });
    }

    root
}
