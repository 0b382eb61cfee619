//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::access::AccessPolicy;
use crate::config::loader::load_config;
use crate::observability::metrics;

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<AccessPolicy>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver of freshly compiled policies, suitable
    /// for [`SharedPolicy::follow`](crate::access::SharedPolicy::follow).
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<AccessPolicy>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned handle must be kept alive; dropping it stops the watch.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!("Config file change detected, reloading...");
                        match reload(&path) {
                            Ok(policy) => {
                                metrics::record_reload(true);
                                let _ = tx.send(policy);
                            }
                            Err(e) => {
                                metrics::record_reload(false);
                                tracing::error!(
                                    "Failed to reload config: {}. Keeping current policy.",
                                    e
                                );
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

/// Load, validate and compile the policy at `path`.
///
/// An empty file is refused: writers truncate before the new content lands, and
/// reloading that state would swap in the defaults with an empty blocklist.
pub fn reload(path: &Path) -> Result<AccessPolicy, Box<dyn std::error::Error + Send + Sync>> {
    if std::fs::metadata(path)?.len() == 0 {
        return Err(format!("{} is empty", path.display()).into());
    }
    let config = load_config(path)?;
    Ok(AccessPolicy::from_config(&config.filter)?)
}
