//! Live dataset reloading.

use crate::schema::DataSet;
use crate::toml_loader;
use crate::validation;
use crate::watcher::ConfigWatcher;
use glow_common::ConfigError;
use std::path::PathBuf;
use tokio::sync::{broadcast, watch};
use tracing::{error, info, warn};

/// Watches a dataset file and publishes every valid revision on a
/// [`tokio::sync::watch`] channel. Invalid revisions are logged and
/// skipped, leaving the last good dataset in place.
pub struct ReloadManager {
    config_path: PathBuf,
}

impl ReloadManager {
    /// Load the initial dataset and start watching for changes.
    ///
    /// A missing or unreadable file yields the default dataset. The
    /// watcher runs as a background task; it stops once every receiver
    /// has been dropped.
    pub async fn start(config_path: PathBuf) -> (DataSet, watch::Receiver<DataSet>) {
        let initial = match toml_loader::load_from_path(&config_path) {
            Ok(ds) => ds,
            Err(e) => {
                warn!("failed to load glow config: {e}, using defaults");
                DataSet::default()
            }
        };

        let (config_tx, config_rx) = watch::channel(initial.clone());

        tokio::spawn(async move {
            let manager = ReloadManager { config_path };
            manager.run_watch_loop(config_tx).await;
        });

        (initial, config_rx)
    }

    async fn run_watch_loop(&self, config_tx: watch::Sender<DataSet>) {
        let watcher = match ConfigWatcher::new(self.config_path.clone()) {
            Ok(w) => w,
            Err(e) => {
                error!("failed to create config watcher: {e}");
                return;
            }
        };

        let (change_tx, mut change_rx) = broadcast::channel::<()>(16);

        tokio::spawn(async move {
            if let Err(e) = watcher.watch(change_tx).await {
                error!("config watcher error: {e}");
            }
        });

        loop {
            match change_rx.recv().await {
                Ok(()) => {
                    info!("reloading glow config from {}", self.config_path.display());
                    match self.reload() {
                        Ok(ds) => {
                            if config_tx.send(ds).is_err() {
                                info!("all config receivers dropped, stopping reload manager");
                                break;
                            }
                        }
                        Err(e) => warn!("config reload failed: {e}"),
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("config watcher lagged by {n} events");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    info!("config watcher channel closed");
                    break;
                }
            }
        }
    }

    fn reload(&self) -> Result<DataSet, ConfigError> {
        let ds = toml_loader::load_from_path(&self.config_path)?;
        validation::validate(&ds)?;
        Ok(ds)
    }
}
