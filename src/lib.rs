pub mod config;
pub mod curves;
pub mod detect;
pub mod error;
pub mod extract;
pub mod fetchers;
pub mod modes;
pub mod monitor;
pub mod page;
pub mod parsers;
pub mod results;
pub mod scheduler;
pub mod settings;
pub mod store;

// Re-export commonly used types for convenience
pub use error::{ScanError, StoreError};
pub use page::{ContentMode, Page, PageFolder, PageSettings, ScanStatus, Snapshot};
pub use results::{FetchedDocument, Notification};

use config::MonitorConfig;
use fetchers::Fetcher;
use scheduler::Scheduler;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Main builder wiring configuration, a fetcher and the scheduler
pub struct Watcher {
    config: MonitorConfig,
}

/// A running scheduler loop
pub struct WatcherHandle<F: Fetcher> {
    pub scheduler: Arc<Scheduler<F>>,
    pub notifications: mpsc::Receiver<Notification>,
    shutdown_tx: watch::Sender<()>,
    task: JoinHandle<()>,
}

impl Default for Watcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Watcher {
    pub fn new() -> Self {
        Self {
            config: MonitorConfig::default(),
        }
    }

    /// Set the maximum number of concurrent fetches
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.max_concurrency = max_concurrency;
        self
    }

    /// Set how often due scans are checked for
    pub fn with_tick_interval(mut self, seconds: u64) -> Self {
        self.config.tick_interval_secs = seconds;
        self
    }

    pub fn with_config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a file
    pub fn with_config_file(
        self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let config = MonitorConfig::from_file(path)?;
        Ok(self.with_config(config))
    }

    /// Load configuration from a string
    pub fn with_config_str(self, config_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config = MonitorConfig::from_json(config_str)?;
        Ok(self.with_config(config))
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Build a scheduler for `pages` without starting its loop
    pub async fn build<F: Fetcher>(
        &self,
        fetcher: F,
        pages: impl IntoIterator<Item = Page>,
    ) -> (Scheduler<F>, mpsc::Receiver<Notification>) {
        let (scheduler, notifications) = Scheduler::new(fetcher, self.config.max_concurrency);
        for page in pages {
            scheduler.add_page(page).await;
        }
        (scheduler, notifications)
    }

    /// Start monitoring `pages`, ticking in the background
    pub async fn start<F: Fetcher>(
        self,
        fetcher: F,
        pages: impl IntoIterator<Item = Page>,
    ) -> WatcherHandle<F> {
        let (scheduler, notifications) = self.build(fetcher, pages).await;
        let scheduler = Arc::new(scheduler);
        let (shutdown_tx, shutdown_rx) = watch::channel(());
        let interval = Duration::from_secs(self.config.tick_interval_secs.max(1));

        ::log::info!(
            "Starting scheduler: tick every {:?}, up to {} concurrent fetches",
            interval,
            self.config.max_concurrency
        );
        let task = {
            let scheduler = Arc::clone(&scheduler);
            tokio::spawn(async move { scheduler.run(interval, shutdown_rx).await })
        };

        WatcherHandle {
            scheduler,
            notifications,
            shutdown_tx,
            task,
        }
    }
}

impl<F: Fetcher> WatcherHandle<F> {
    /// Stop ticking and wait for the scans the loop started
    pub async fn shutdown(self) -> Arc<Scheduler<F>> {
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.task.await {
            ::log::error!("Scheduler task failed: {}", e);
        }
        self.scheduler
    }
}
