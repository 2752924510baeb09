//! File watcher: debounces filesystem events under the zone file's
//! parent directory and the template root, then triggers a catalogue
//! reload. Mirrors the teacher stack's `ConfigWatcher::watch` debounce
//! loop, driving `CatalogueStore::reload()` instead of proxy config.

use std::convert::Infallible;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use notify::{Event, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::catalogue::store::CatalogueStore;

const DEBOUNCE: Duration = Duration::from_millis(250);

pub async fn watch(
    store: Arc<CatalogueStore>,
    zone_dir: &Path,
    template_dir: &Path,
) -> Result<Infallible, notify::Error> {
    tracing::info!(zone_dir = %zone_dir.display(), template_dir = %template_dir.display(), "starting catalogue file watcher");

    let (tx, mut rx) = mpsc::channel(100);

    let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
        if let Ok(event) = res {
            if event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove() {
                let _ = tx.blocking_send(event);
            }
        }
    })?;

    watcher.watch(zone_dir, RecursiveMode::NonRecursive)?;
    watcher.watch(template_dir, RecursiveMode::Recursive)?;

    loop {
        if rx.recv().await.is_some() {
            tokio::time::sleep(DEBOUNCE).await;
            while rx.try_recv().is_ok() {}

            let problems = store.reload().await;
            if problems > 0 {
                tracing::warn!(problems, "catalogue reload completed with minor problems");
            } else {
                tracing::info!("catalogue reloaded after filesystem change");
            }
        }
    }
}
