use crate::error::ScanError;
use crate::fetchers::Fetcher;
use crate::monitor::{PageMonitor, ScanReport};
use crate::page::{Page, PageSettings};
use crate::results::Notification;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore, mpsc, watch};
use tokio::task::JoinHandle;

/// A monitored page plus its scheduling bookkeeping
struct Slot {
    monitor: PageMonitor,
    in_flight: bool,
    /// Distinguishes a page from a later re-add under the same URL
    generation: u64,
    /// Bumped on every settings change
    revision: u64,
}

#[derive(Default)]
struct Registry {
    slots: HashMap<String, Slot>,
    next_generation: u64,
}

/// Triggers due scans for every monitored page
///
/// At most one scan per page is in flight. A trigger for a busy page is
/// dropped; the page is picked up again by the next tick after its scan
/// completes. Scans of pages removed, moved or reconfigured meanwhile run
/// to completion and are discarded.
pub struct Scheduler<F: Fetcher> {
    fetcher: Arc<F>,
    registry: Arc<Mutex<Registry>>,
    fetch_semaphore: Arc<Semaphore>,
    notify_tx: mpsc::Sender<Notification>,
}

impl<F: Fetcher> Scheduler<F> {
    /// Create a scheduler and the receiver its notifications arrive on
    pub fn new(fetcher: F, max_concurrency: usize) -> (Self, mpsc::Receiver<Notification>) {
        let (notify_tx, notify_rx) = mpsc::channel(1000);
        let scheduler = Self {
            fetcher: Arc::new(fetcher),
            registry: Arc::new(Mutex::new(Registry::default())),
            fetch_semaphore: Arc::new(Semaphore::new(max_concurrency.max(1))),
            notify_tx,
        };
        (scheduler, notify_rx)
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Start monitoring a page, replacing any page with the same URL
    pub async fn add_page(&self, page: Page) {
        let mut registry = self.registry.lock().await;
        registry.next_generation += 1;
        let generation = registry.next_generation;
        ::log::info!("Monitoring {}", page.url);
        registry.slots.insert(
            page.url.clone(),
            Slot {
                monitor: PageMonitor::new(page),
                in_flight: false,
                generation,
                revision: 0,
            },
        );
    }

    /// Stop monitoring a page; an in-flight scan of it will be discarded
    pub async fn remove_page(&self, url: &str) -> Option<Page> {
        let mut registry = self.registry.lock().await;
        let slot = registry.slots.remove(url)?;
        if slot.in_flight {
            ::log::debug!("Removed {} with a scan in flight", url);
        }
        Some(slot.monitor.into_page())
    }

    /// Apply new settings to a page, moving it if its URL changed
    ///
    /// Returns false if the page is unknown or the new URL already belongs
    /// to another monitored page. A scan in flight when the settings change
    /// is discarded.
    pub async fn update_page(&self, url: &str, settings: PageSettings) -> bool {
        let mut registry = self.registry.lock().await;
        let new_url = settings.url.clone();
        if new_url != url && registry.slots.contains_key(&new_url) {
            ::log::warn!("Cannot move {} to {}: already monitored", url, new_url);
            return false;
        }
        let Some(mut slot) = registry.slots.remove(url) else {
            return false;
        };

        slot.monitor.update_config(settings);
        slot.revision += 1;
        if new_url != url {
            ::log::info!("Page {} moved to {}", url, new_url);
            // The old URL's scan can no longer find this slot
            registry.next_generation += 1;
            slot.generation = registry.next_generation;
            slot.in_flight = false;
        }
        registry.slots.insert(new_url, slot);
        true
    }

    /// Snapshot of all monitored pages, for persistence
    pub async fn pages(&self) -> Vec<Page> {
        let registry = self.registry.lock().await;
        let mut pages = registry
            .slots
            .values()
            .map(|slot| slot.monitor.page().clone())
            .collect::<Vec<_>>();
        pages.sort_by(|a, b| a.url.cmp(&b.url));
        pages
    }

    pub async fn page(&self, url: &str) -> Option<Page> {
        let registry = self.registry.lock().await;
        registry.slots.get(url).map(|slot| slot.monitor.page().clone())
    }

    pub async fn is_in_flight(&self, url: &str) -> bool {
        let registry = self.registry.lock().await;
        registry.slots.get(url).is_some_and(|slot| slot.in_flight)
    }

    /// Start scans for every page due at `now`
    pub async fn tick(&self, now: DateTime<Utc>) -> Vec<JoinHandle<()>> {
        let mut registry = self.registry.lock().await;
        let mut handles = Vec::new();

        for (url, slot) in registry.slots.iter_mut() {
            if !slot.monitor.next_scan_due_at(now).is_due(now) {
                continue;
            }
            if slot.in_flight {
                ::log::debug!("Scan of {} still running, deferring", url);
                continue;
            }
            slot.in_flight = true;
            handles.push(self.spawn_scan(url.clone(), slot.generation));
        }

        if !handles.is_empty() {
            ::log::debug!("Started {} scans", handles.len());
        }
        handles
    }

    /// Scan one page now, regardless of its schedule
    ///
    /// Returns `None` if the page is unknown or already being scanned.
    pub async fn scan_now(&self, url: &str) -> Option<JoinHandle<()>> {
        let mut registry = self.registry.lock().await;
        let slot = registry.slots.get_mut(url)?;
        if slot.in_flight {
            ::log::debug!("Scan of {} already running", url);
            return None;
        }
        slot.in_flight = true;
        Some(self.spawn_scan(url.to_string(), slot.generation))
    }

    /// Scan every page now that isn't already being scanned
    pub async fn scan_all(&self) -> Vec<JoinHandle<()>> {
        let mut registry = self.registry.lock().await;
        registry
            .slots
            .iter_mut()
            .filter(|(_, slot)| !slot.in_flight)
            .map(|(url, slot)| {
                slot.in_flight = true;
                self.spawn_scan(url.clone(), slot.generation)
            })
            .collect()
    }

    /// Tick every `interval` until `shutdown` fires
    ///
    /// Scans started by the loop are waited for before it returns.
    pub async fn run(&self, interval: Duration, mut shutdown: watch::Receiver<()>) {
        let mut ticker = tokio::time::interval(interval);
        let mut scans: Vec<JoinHandle<()>> = Vec::new();
        loop {
            tokio::select! {
                biased;

                _ = shutdown.changed() => {
                    ::log::info!("Shutdown signal received, stopping scheduler");
                    break;
                }

                _ = ticker.tick() => {
                    scans.retain(|scan| !scan.is_finished());
                    scans.extend(self.tick(Utc::now()).await);
                }
            }
        }

        if !scans.is_empty() {
            ::log::info!("Waiting for {} scans to finish", scans.len());
        }
        for scan in scans {
            if let Err(e) = scan.await {
                ::log::error!("Scan task failed: {}", e);
            }
        }
    }

    fn spawn_scan(&self, url: String, generation: u64) -> JoinHandle<()> {
        let fetcher = Arc::clone(&self.fetcher);
        let registry = Arc::clone(&self.registry);
        let semaphore = Arc::clone(&self.fetch_semaphore);
        let notify_tx = self.notify_tx.clone();

        tokio::spawn(async move {
            let fetched = match semaphore.acquire_owned().await {
                Ok(_permit) => fetcher.fetch(&url).await,
                Err(_) => Err(ScanError::fetch(&url, "scheduler is shutting down")),
            };

            // Work on a copy so parsing and diffing run without the lock
            let claimed = {
                let registry = registry.lock().await;
                registry
                    .slots
                    .get(&url)
                    .filter(|slot| slot.generation == generation)
                    .map(|slot| (slot.monitor.clone(), slot.revision))
            };
            let Some((mut monitor, revision)) = claimed else {
                ::log::debug!("Discarding scan of removed page {}", url);
                return;
            };

            let scanned = tokio::task::spawn_blocking(move || {
                let report: ScanReport = monitor.scan_once(fetched, Utc::now());
                (monitor, report)
            })
            .await;

            let notification = {
                let mut registry = registry.lock().await;
                let Some(slot) = registry
                    .slots
                    .get_mut(&url)
                    .filter(|slot| slot.generation == generation)
                else {
                    ::log::debug!("Discarding scan of removed page {}", url);
                    return;
                };
                slot.in_flight = false;

                match scanned {
                    Ok((monitor, report)) if slot.revision == revision => {
                        slot.monitor = monitor;
                        report.notification(&slot.monitor.page().title)
                    }
                    Ok(_) => {
                        ::log::debug!("Settings of {} changed during scan, discarding", url);
                        None
                    }
                    Err(e) => {
                        ::log::error!("Scan of {} failed to complete: {}", url, e);
                        None
                    }
                }
            };

            if let Some(notification) = notification {
                if let Err(e) = notify_tx.send(notification).await {
                    ::log::warn!("Failed to deliver notification for {}: {}", url, e);
                }
            }
        })
    }
}
