mod app_context;
mod catalogue;
mod error;
mod http;
mod ip;
mod metrics;
mod pathnorm;
mod render;
mod signals;
mod template;
mod watcher;
mod zone;

use std::path::Path;
use std::process;
use std::time::Duration;

use tokio::runtime::Runtime;
use tracing_subscriber::prelude::*;

use crate::app_context::AppContext;

/// Sets up `tracing`: a `fmt` layer to stdout for everything, plus,
/// when `access_log_file` is configured, a second `fmt` layer writing
/// only the `http::ACCESS_LOG_TARGET` events to that file. Mirrors the
/// teacher's `tracing_subscriber::fmt().with_thread_ids(true).init()`
/// convention, split across layers instead of a single subscriber.
fn init_tracing(access_log_file: Option<&Path>) {
    let stdout_layer = tracing_subscriber::fmt::layer().with_thread_ids(true).with_filter(
        tracing_subscriber::filter::filter_fn(|meta| meta.target() != http::ACCESS_LOG_TARGET),
    );
    let registry = tracing_subscriber::registry().with(stdout_layer);

    let Some(path) = access_log_file else {
        registry.init();
        return;
    };

    let (dir, file_name) = match (path.parent(), path.file_name()) {
        (Some(dir), Some(name)) => (dir, name),
        _ => {
            registry.init();
            tracing::warn!(path = %path.display(), "access_log_file has no parent/file name, access log will go to stdout");
            return;
        }
    };

    let appender = tracing_appender::rolling::never(dir, file_name);
    let access_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_ansi(false)
        .with_writer(appender)
        .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
            meta.target() == http::ACCESS_LOG_TARGET
        }));

    registry.with(access_layer).init();
}

fn main() -> miette::Result<()> {
    let rt = Runtime::new().expect("Failed to build Tokio runtime");

    let (cli, config) = rt.block_on(AppContext::load_cli_and_config())?;
    init_tracing(config.access_log_file.as_deref());

    let ctx = rt.block_on(AppContext::bootstrap(cli, config))?;
    let services = ctx.build_services();

    tracing::info!("Server running (PID: {})", process::id());

    let (mut server, store, config) = ctx.ready();

    server.bootstrap();
    server.add_services(services);

    let zone_dir = config
        .zone_file
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| ".".into());
    let template_dir = config.pac_root.clone();
    let watch_store = store.clone();
    rt.spawn(async move {
        if let Err(e) = watcher::watch(watch_store, &zone_dir, &template_dir).await {
            tracing::error!(error = %e, "catalogue file watcher stopped unexpectedly");
        }
    });

    if config.max_cache_age_secs > 0 {
        let periodic_store = store.clone();
        let interval = Duration::from_secs(config.max_cache_age_secs);
        rt.spawn(catalogue::store::spawn_periodic_reload(
            periodic_store,
            interval,
        ));
    }

    let pid_file = config.pid_file.clone();
    rt.spawn(signals::run(store, pid_file));

    tracing::info!("Starting Pingora Server...");

    server.run_forever();
}
