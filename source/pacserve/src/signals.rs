//! Signal wiring: `SIGHUP` reloads the catalogue; `SIGINT`/`SIGTERM`
//! trigger graceful shutdown, removing the PID file before the process
//! exits.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::signal::unix::{signal, SignalKind};

use crate::catalogue::store::CatalogueStore;

/// Runs forever, reloading the catalogue on every `SIGHUP` and
/// returning once a `SIGINT` or `SIGTERM` is received so the caller can
/// begin its own graceful-shutdown sequence.
pub async fn run(store: Arc<CatalogueStore>, pid_file: Option<PathBuf>) -> std::io::Result<()> {
    let mut hangup = signal(SignalKind::hangup())?;
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    loop {
        tokio::select! {
            _ = hangup.recv() => {
                tracing::info!("SIGHUP received, reloading catalogue");
                let problems = store.reload().await;
                if problems > 0 {
                    tracing::warn!(problems, "catalogue reload completed with minor problems");
                }
            }
            _ = interrupt.recv() => {
                tracing::info!("SIGINT received, shutting down");
                break;
            }
            _ = terminate.recv() => {
                tracing::info!("SIGTERM received, shutting down");
                break;
            }
        }
    }

    if let Some(path) = pid_file {
        if let Err(e) = std::fs::remove_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove PID file");
        }
    }

    Ok(())
}
