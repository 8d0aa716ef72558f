//! Serve command handler.

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use shadowme_axum::{ServerConfig, start_server};

/// Run the server until Ctrl-C.
///
/// Shutdown stops the sweeper and waits for pending voice deletions.
pub async fn execute(config: ServerConfig) -> Result<()> {
    let cancel = CancellationToken::new();

    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Shutdown requested");
                    cancel.cancel();
                }
                Err(e) => warn!("Could not listen for Ctrl-C: {}", e),
            }
        }
    });

    start_server(config, cancel).await
}
