//! The catalogue store: the single mutable, process-wide cell holding
//! the currently-published prefix tree.
//!
//! Readers (`lookup`) never block on a rebuild: the tree is swapped in
//! atomically via `ArcSwap`, and a lookup only ever touches the
//! snapshot it loaded at the start of the call. The rebuild critical
//! section itself is serialised by a `tokio::sync::Mutex` so two
//! concurrent triggers (watcher + SIGHUP, say) don't race each other's
//! cache reads.

use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwap;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::catalogue::builder::{build_catalogue, NoRebuild};
use crate::catalogue::element::LookupElement;
use crate::catalogue::tree::Tree;
use crate::ip::IpNet;
use crate::render::{self, RenderParams};
use crate::template::Template;
use crate::zone::ZoneRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} minor problems were found while building the catalogue (strict mode)")]
    MinorProblemsInStrictMode(usize),
}

pub struct StoreConfig {
    pub zone_file: PathBuf,
    pub template_dir: PathBuf,
    pub contact_info: String,
    pub default_pac_text: String,
    /// Root-relative, normalised filename of the WPAD template, served
    /// directly at `/wpad.dat` without going through the tree.
    pub wpad_filename: Option<String>,
}

struct RebuildInputs {
    zones: Vec<ZoneRecord>,
    templates: Vec<Template>,
}

pub struct CatalogueStore {
    config: StoreConfig,
    current: ArcSwap<Tree>,
    wpad: ArcSwap<String>,
    inputs: Mutex<RebuildInputs>,
}

impl CatalogueStore {
    /// Builds an initial, empty-input tree so the store has something
    /// to serve from before the first successful `init`/`reload`.
    pub fn new(config: StoreConfig) -> Self {
        let empty = Tree::build(
            Vec::new(),
            LookupElement::synthetic_root(config.default_pac_text.clone()),
        );
        Self {
            config,
            current: ArcSwap::new(Arc::new(empty)),
            wpad: ArcSwap::new(Arc::new(String::new())),
            inputs: Mutex::new(RebuildInputs {
                zones: Vec::new(),
                templates: Vec::new(),
            }),
        }
    }

    /// Performs the first build. In strict mode (`ignore_minors = false`)
    /// a non-zero minor-problem count aborts without installing a tree.
    /// A hard failure (both readers unreadable) counts as one minor
    /// problem too, whether or not a rebuild actually happened; the
    /// store already has something to serve from `new`'s empty/synthetic
    /// tree, so lenient mode starts up serving that rather than failing.
    pub async fn init(&self, ignore_minors: bool) -> Result<usize, StoreError> {
        match self.rebuild().await {
            Ok(problems) if problems > 0 && !ignore_minors => {
                Err(StoreError::MinorProblemsInStrictMode(problems))
            }
            Ok(problems) => Ok(problems),
            Err(NoRebuild) if ignore_minors => {
                tracing::warn!("both zone file and template directory failed to read; starting with the empty/synthetic catalogue");
                Ok(1)
            }
            Err(NoRebuild) => Err(StoreError::MinorProblemsInStrictMode(1)),
        }
    }

    /// Performs a rebuild and installs the result unconditionally
    /// (modulo the hard-failure fallback, which keeps serving the
    /// existing tree and reports a no-op). Used for periodic, watcher,
    /// and signal-driven reloads, none of which abort the server.
    pub async fn reload(&self) -> usize {
        match self.rebuild().await {
            Ok(problems) => problems,
            Err(NoRebuild) => {
                tracing::error!("both zone file and template directory failed to read; keeping previous catalogue");
                1
            }
        }
    }

    async fn rebuild(&self) -> Result<usize, NoRebuild> {
        let mut inputs = self.inputs.lock().await;

        let outcome = build_catalogue(
            &self.config.zone_file,
            &self.config.template_dir,
            &self.config.contact_info,
            &self.config.default_pac_text,
            &inputs.zones,
            &inputs.templates,
        )
        .await?;

        if let Some(wpad_filename) = &self.config.wpad_filename {
            if let Some(template) = outcome.templates.iter().find(|t| &t.filename == wpad_filename) {
                let params = RenderParams {
                    filename: &template.filename,
                    contact: &self.config.contact_info,
                };
                match render::render(&template.filename, &template.content, &params) {
                    Ok(rendered) => self.wpad.store(Arc::new(rendered)),
                    Err(e) => tracing::warn!(error = %e, "failed to render wpad template, keeping previous"),
                }
            } else {
                tracing::warn!(%wpad_filename, "configured wpad template not found");
            }
        }

        inputs.zones = outcome.zones;
        inputs.templates = outcome.templates;
        drop(inputs);

        self.current.store(Arc::new(outcome.tree));
        Ok(outcome.minor_problems)
    }

    /// Loads the current tree snapshot and performs a lookup against it.
    /// No lock is held across the traversal; a concurrent reload cannot
    /// block or be blocked by this call.
    pub fn lookup(&self, query: IpNet) -> (LookupElement, Vec<LookupElement>) {
        let tree = self.current.load();
        tree.lookup(query)
    }

    pub fn stringify(&self) -> String {
        self.current.load().stringify()
    }

    /// The WPAD body wrapped as a [`LookupElement`] so `/wpad.dat?debug`
    /// can go through the same debug-rendering path as the tree-backed
    /// routes, rather than being a special case that ignores `debug`.
    pub fn wpad_element(&self) -> LookupElement {
        let filename = self
            .config
            .wpad_filename
            .clone()
            .unwrap_or_else(|| "wpad.dat".to_string());
        LookupElement::standard(IpNet::root(), filename, (*self.wpad.load_full()).clone())
    }
}

/// Rebuilds the catalogue on a fixed interval, as a backstop for zones
/// whose storage doesn't raise filesystem events (network shares, some
/// overlay filesystems). The `notify`-driven [`crate::watcher::watch`]
/// task and SIGHUP handling in [`crate::signals::run`] cover the common
/// cases; this just guarantees an upper bound on staleness.
pub async fn spawn_periodic_reload(
    store: Arc<CatalogueStore>,
    interval: std::time::Duration,
) -> std::convert::Infallible {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let problems = store.reload().await;
        if problems > 0 {
            tracing::warn!(problems, "periodic catalogue rebuild found minor problems");
        } else {
            tracing::debug!("periodic catalogue rebuild complete");
        }
    }
}
