use futures_util::stream::StreamExt;
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook_tokio::{Handle, Signals};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

/// Set the shutdown flag on the first SIGINT or SIGTERM.
///
/// Closing the returned handle ends the listener task without signalling.
pub fn spawn_signal_listener(
    shutdown: Arc<watch::Sender<bool>>,
) -> std::io::Result<(Handle, JoinHandle<()>)> {
    let mut signals = Signals::new([SIGTERM, SIGINT])?;
    let handle = signals.handle();

    let task = tokio::spawn(async move {
        if let Some(signal) = signals.next().await {
            info!(signal, "Received shutdown signal, stopping...");
            let _ = shutdown.send(true);
        }
    });

    Ok((handle, task))
}

/// Resolves once the flag is `true` or every sender is gone
pub async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}
