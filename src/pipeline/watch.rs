// src/pipeline/watch.rs

//! Catalog watch loop: refresh, publish, diff, announce.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::Result;
use crate::models::{CatalogSnapshot, ChangeSet, Config};
use crate::pipeline::diff::CatalogDiffer;
use crate::pipeline::dispatch::{DispatchSettings, DispatchStats, DispatcherHandle, NotificationDispatcher};
use crate::pipeline::refresh::CatalogRefresher;
use crate::services::{IdempotencyCache, MemoryCache, NotificationSink, WebhookClient, render_jobs};
use crate::utils::http::create_async_client;

/// Latest published catalog, if any.
pub type SnapshotReceiver = watch::Receiver<Option<Arc<CatalogSnapshot>>>;

/// Result of one refresh cycle.
#[derive(Debug, Clone, Default)]
pub struct TickOutcome {
    /// A new document was loaded and published
    pub refreshed: bool,
    pub changes: ChangeSet,
    /// Notification jobs handed to the dispatcher
    pub jobs: usize,
}

/// Periodic catalog refresh with change notifications.
pub struct WatchPipeline {
    config: Config,
    refresher: CatalogRefresher,
    differ: CatalogDiffer,
    publisher: watch::Sender<Option<Arc<CatalogSnapshot>>>,
    dispatcher: Option<DispatcherHandle>,
    dispatcher_task: Option<JoinHandle<DispatchStats>>,
}

impl WatchPipeline {
    /// Build the pipeline from configuration.
    ///
    /// When a webhook is configured the dispatcher task is spawned, so this
    /// must run inside a tokio runtime.
    pub fn new(config: Config) -> Result<Self> {
        let client = create_async_client(&config.http)?;
        let refresher = CatalogRefresher::new(client.clone(), config.catalog.source.clone());

        let mut pipeline = Self::with_refresher(config, refresher);
        if pipeline.config.notifications.webhook_url.is_some() {
            pipeline.attach_notifier(Arc::new(WebhookClient::new(client)), Arc::new(MemoryCache::new()));
        }
        Ok(pipeline)
    }

    /// Pipeline without notifications.
    pub fn with_refresher(config: Config, refresher: CatalogRefresher) -> Self {
        let (publisher, _) = watch::channel(None);
        Self {
            config,
            refresher,
            differ: CatalogDiffer::new(),
            publisher,
            dispatcher: None,
            dispatcher_task: None,
        }
    }

    /// Spawn a dispatcher delivering through `sink`, replacing any previous one.
    pub fn attach_notifier(&mut self, sink: Arc<dyn NotificationSink>, cache: Arc<dyn IdempotencyCache>) {
        let settings = DispatchSettings::from(&self.config.notifications);
        let (handle, task) = NotificationDispatcher::new(sink, cache, settings).spawn();

        if let Some(previous) = self.dispatcher.replace(handle) {
            previous.close();
        }
        self.dispatcher_task = Some(task);
    }

    /// Receiver observing every published snapshot.
    pub fn subscribe(&self) -> SnapshotReceiver {
        self.publisher.subscribe()
    }

    /// Most recently published snapshot.
    pub fn current(&self) -> Option<Arc<CatalogSnapshot>> {
        self.publisher.borrow().clone()
    }

    /// Run one refresh cycle.
    pub async fn tick(&mut self) -> Result<TickOutcome> {
        let Some(snapshot) = self.refresher.fetch().await? else {
            return Ok(TickOutcome::default());
        };

        let snapshot = Arc::new(snapshot);
        self.publisher.send_replace(Some(Arc::clone(&snapshot)));

        let changes = self.differ.observe(&snapshot);
        if !changes.has_changes() {
            return Ok(TickOutcome {
                refreshed: true,
                ..TickOutcome::default()
            });
        }

        log::info!(
            "Catalog additions: {} items, {} effects, {} paint kits",
            changes.new_items.len(),
            changes.new_effects.len(),
            changes.new_paint_kits.len()
        );

        let jobs = match (&self.dispatcher, &self.config.notifications.webhook_url) {
            (Some(handle), Some(url)) => {
                handle.enqueue_all(render_jobs(&changes, &self.config.notifications, url))?
            }
            _ => {
                log::info!("No webhook configured, {} additions not announced", changes.change_count());
                0
            }
        };

        Ok(TickOutcome {
            refreshed: true,
            changes,
            jobs,
        })
    }

    /// Tick every `catalog.refresh_interval_secs` until Ctrl-C, then shut down.
    pub async fn run(mut self) -> Result<DispatchStats> {
        let period = Duration::from_secs(self.config.catalog.refresh_interval_secs.max(1));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        log::info!(
            "Watching {} every {}s",
            self.refresher.source(),
            period.as_secs()
        );

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.tick().await {
                        log::error!("Catalog refresh failed: {e}");
                    }
                }
                result = &mut shutdown => {
                    if let Err(e) = result {
                        log::warn!("Signal handler failed: {e}");
                    }
                    log::info!("Shutdown requested");
                    break;
                }
            }
        }

        self.shutdown().await
    }

    /// Close the dispatcher and wait for queued notifications.
    pub async fn shutdown(mut self) -> Result<DispatchStats> {
        if let Some(handle) = self.dispatcher.take() {
            handle.close();
        }

        match self.dispatcher_task.take() {
            Some(task) => Ok(task.await?),
            None => Ok(DispatchStats::default()),
        }
    }
}
