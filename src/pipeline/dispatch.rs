//! Serialized notification delivery.
//!
//! One job is in flight at a time and the queue is strictly FIFO. A job
//! arriving at an idle dispatcher waits a base delay first. Rate-limited
//! jobs stay at the head of the queue and are retried after a backoff;
//! every other failure drops the job.
//!
//! Before each attempt the idempotency cache is consulted, so the same
//! page announced by another process sharing the cache is dropped.

use std::collections::VecDeque;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{AppError, DeliveryError, Result};
use crate::models::NotificationConfig;
use crate::services::{IdempotencyCache, NotificationJob, NotificationSink};

/// Timing and cache parameters of a dispatcher.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// Courtesy pause before the first send out of idle
    pub base_delay: Duration,
    /// Backoff after a 429 without a server-provided delay; doubles per consecutive 429
    pub fallback_retry: Duration,
    /// Upper bound of the fallback backoff
    pub max_backoff: Duration,
    /// Lifetime of the "already notified" mark
    pub suppression_ttl: Duration,
    pub cache_prefix: String,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self::from(&NotificationConfig::default())
    }
}

impl From<&NotificationConfig> for DispatchSettings {
    fn from(config: &NotificationConfig) -> Self {
        Self {
            base_delay: Duration::from_millis(config.base_delay_ms),
            fallback_retry: Duration::from_millis(config.fallback_retry_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
            suppression_ttl: Duration::from_secs(config.suppression_ttl_secs),
            cache_prefix: config.cache_prefix.clone(),
        }
    }
}

impl DispatchSettings {
    /// Idempotency key of a job: `<prefix>:<domain>:<page>`.
    pub fn key_for(&self, job: &NotificationJob) -> String {
        format!("{}:{}:{}", self.cache_prefix, job.domain, job.page)
    }

    /// Fallback backoff after `attempt` consecutive rate limits (1-based).
    pub fn fallback_backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.fallback_retry
            .checked_mul(factor)
            .map_or(self.max_backoff, |d| d.min(self.max_backoff))
    }
}

/// What the dispatcher is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    Sleeping(Duration),
    Sending,
}

/// Outcome counters, returned when a dispatcher finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    pub delivered: usize,
    /// Dropped because the cache already held the job's key
    pub suppressed: usize,
    /// Dropped after a non-rate-limit failure
    pub failed: usize,
    /// 429 responses seen (each retried)
    pub rate_limited: usize,
}

/// FIFO job queue with idempotency checks and rate-limit backoff.
pub struct NotificationDispatcher<S, C> {
    sink: S,
    cache: C,
    settings: DispatchSettings,
    queue: VecDeque<NotificationJob>,
    state: DispatchState,
    consecutive_rate_limits: u32,
    stats: DispatchStats,
}

impl<S, C> NotificationDispatcher<S, C>
where
    S: NotificationSink,
    C: IdempotencyCache,
{
    pub fn new(sink: S, cache: C, settings: DispatchSettings) -> Self {
        Self {
            sink,
            cache,
            settings,
            queue: VecDeque::new(),
            state: DispatchState::Idle,
            consecutive_rate_limits: 0,
            stats: DispatchStats::default(),
        }
    }

    pub fn enqueue(&mut self, job: NotificationJob) {
        self.queue.push_back(job);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Process queued jobs until the queue is empty.
    pub async fn drain(&mut self) -> DispatchStats {
        while !self.queue.is_empty() {
            if self.state == DispatchState::Idle {
                self.pause(self.settings.base_delay).await;
            }
            self.attempt_head().await;
        }
        self.state = DispatchState::Idle;
        self.stats
    }

    /// One attempt at the job at the head of the queue.
    async fn attempt_head(&mut self) {
        let Some(job) = self.queue.front() else {
            return;
        };
        let key = self.settings.key_for(job);

        match self.cache.get(&key).await {
            Ok(Some(_)) => {
                log::debug!("Notification {key} already sent, dropping");
                self.stats.suppressed += 1;
                self.queue.pop_front();
                return;
            }
            Ok(None) => {}
            Err(e) => log::warn!("Idempotency check for {key} failed: {e}"),
        }

        self.state = DispatchState::Sending;
        let outcome = self.sink.deliver(job).await;

        match outcome {
            Ok(()) => {
                log::info!("Notification {key} delivered");
                self.stats.delivered += 1;
                self.consecutive_rate_limits = 0;
                self.queue.pop_front();

                if let Err(e) = self
                    .cache
                    .set_with_expiry(&key, self.settings.suppression_ttl, "1")
                    .await
                {
                    log::warn!("Could not mark {key} as sent: {e}");
                }
            }
            Err(DeliveryError::RateLimited { retry_after }) => {
                self.stats.rate_limited += 1;
                self.consecutive_rate_limits += 1;
                let delay = retry_after
                    .unwrap_or_else(|| self.settings.fallback_backoff(self.consecutive_rate_limits));
                log::warn!("Notification {key} rate limited, retrying in {delay:?}");
                self.pause(delay).await;
            }
            Err(DeliveryError::Permanent(reason)) => {
                log::error!("Notification {key} failed, dropping: {reason}");
                self.stats.failed += 1;
                self.consecutive_rate_limits = 0;
                self.queue.pop_front();
            }
        }
    }

    async fn pause(&mut self, delay: Duration) {
        self.state = DispatchState::Sleeping(delay);
        tokio::time::sleep(delay).await;
    }
}

impl<S, C> NotificationDispatcher<S, C>
where
    S: NotificationSink + 'static,
    C: IdempotencyCache + 'static,
{
    /// Run the dispatcher as a background task.
    ///
    /// The task ends once the returned handle is closed (or dropped) and
    /// every queued job has reached a terminal outcome.
    pub fn spawn(mut self) -> (DispatcherHandle, JoinHandle<DispatchStats>) {
        let (sender, mut receiver) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
            loop {
                while let Ok(job) = receiver.try_recv() {
                    self.enqueue(job);
                }

                if self.queue.is_empty() {
                    self.state = DispatchState::Idle;
                    match receiver.recv().await {
                        Some(job) => self.enqueue(job),
                        None => break,
                    }
                    continue;
                }

                if self.state == DispatchState::Idle {
                    self.pause(self.settings.base_delay).await;
                }
                self.attempt_head().await;
            }

            log::info!(
                "Dispatcher stopped: {} delivered, {} suppressed, {} failed, {} rate limited",
                self.stats.delivered,
                self.stats.suppressed,
                self.stats.failed,
                self.stats.rate_limited
            );
            self.stats
        });

        (DispatcherHandle { sender }, task)
    }
}

/// Sending side of a spawned dispatcher.
#[derive(Debug, Clone)]
pub struct DispatcherHandle {
    sender: mpsc::UnboundedSender<NotificationJob>,
}

impl DispatcherHandle {
    pub fn enqueue(&self, job: NotificationJob) -> Result<()> {
        self.sender
            .send(job)
            .map_err(|_| AppError::validation("notification dispatcher has stopped"))
    }

    pub fn enqueue_all(&self, jobs: impl IntoIterator<Item = NotificationJob>) -> Result<usize> {
        let mut count = 0;
        for job in jobs {
            self.enqueue(job)?;
            count += 1;
        }
        Ok(count)
    }

    /// Stop accepting jobs; the task drains what is queued and exits.
    pub fn close(self) {
        drop(self.sender);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use tokio::time::Instant;

    use super::*;
    use crate::models::Domain;
    use crate::services::MemoryCache;
    use crate::services::webhook::{WebhookPayload, render_jobs};

    /// Sink replaying scripted responses (then `Ok`) and recording attempts.
    #[derive(Default)]
    struct ScriptedSink {
        responses: Mutex<VecDeque<std::result::Result<(), DeliveryError>>>,
        attempts: Mutex<Vec<(Domain, usize, Instant)>>,
    }

    impl ScriptedSink {
        fn with_responses(responses: Vec<std::result::Result<(), DeliveryError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                ..Self::default()
            })
        }

        fn attempts(&self) -> Vec<(Domain, usize, Instant)> {
            self.attempts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NotificationSink for ScriptedSink {
        async fn deliver(&self, job: &NotificationJob) -> std::result::Result<(), DeliveryError> {
            self.attempts
                .lock()
                .unwrap()
                .push((job.domain, job.page, Instant::now()));
            self.responses.lock().unwrap().pop_front().unwrap_or(Ok(()))
        }
    }

    struct BrokenCache;

    #[async_trait]
    impl IdempotencyCache for BrokenCache {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(AppError::cache("connection refused"))
        }

        async fn set_with_expiry(&self, _key: &str, _ttl: Duration, _value: &str) -> Result<()> {
            Err(AppError::cache("connection refused"))
        }
    }

    fn job(domain: Domain, page: usize) -> NotificationJob {
        NotificationJob {
            target_url: "https://hooks.example/x".to_string(),
            domain,
            page,
            payload: WebhookPayload {
                username: "Schema Watcher".to_string(),
                avatar_url: None,
                embeds: Vec::new(),
            },
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_domain_delivered_once() {
        let sink = ScriptedSink::with_responses(Vec::new());
        let cache = Arc::new(MemoryCache::new());
        let mut dispatcher =
            NotificationDispatcher::new(Arc::clone(&sink), Arc::clone(&cache), DispatchSettings::default());

        dispatcher.enqueue(job(Domain::Items, 0));
        dispatcher.enqueue(job(Domain::Items, 0));
        let stats = dispatcher.drain().await;

        assert_eq!(sink.attempts().len(), 1);
        assert_eq!(stats.delivered, 1);
        assert_eq!(stats.suppressed, 1);
        assert!(cache.get("schema_notified:items:0").await.unwrap().is_some());
        assert_eq!(dispatcher.state(), DispatchState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pages_are_distinct_jobs() {
        let sink = ScriptedSink::with_responses(Vec::new());
        let mut dispatcher =
            NotificationDispatcher::new(Arc::clone(&sink), MemoryCache::new(), DispatchSettings::default());

        let changes = crate::models::ChangeSet {
            new_items: (0..30)
                .map(|i| crate::models::NewItem {
                    defindex: i,
                    name: format!("Item {i}"),
                })
                .collect(),
            ..Default::default()
        };
        for job in render_jobs(&changes, &NotificationConfig::default(), "https://hooks.example/x") {
            dispatcher.enqueue(job);
        }

        let stats = dispatcher.drain().await;
        assert_eq!(stats.delivered, 2);
        assert_eq!(stats.suppressed, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_refresh_within_ttl_reuses_key() {
        let config = crate::models::Config::default();
        let refresh = Duration::from_secs(config.catalog.refresh_interval_secs);
        let settings = DispatchSettings::from(&config.notifications);
        assert!(settings.suppression_ttl > refresh);

        let sink = ScriptedSink::with_responses(Vec::new());
        let mut dispatcher = NotificationDispatcher::new(Arc::clone(&sink), MemoryCache::new(), settings);

        dispatcher.enqueue(job(Domain::Items, 0));
        dispatcher.drain().await;

        // A different addition one refresh later lands on the same key
        tokio::time::advance(refresh).await;
        dispatcher.enqueue(job(Domain::Items, 0));
        let stats = dispatcher.drain().await;
        assert_eq!((stats.delivered, stats.suppressed), (1, 1));

        // Two refreshes later the key has expired
        tokio::time::advance(refresh).await;
        dispatcher.enqueue(job(Domain::Items, 0));
        let stats = dispatcher.drain().await;
        assert_eq!((stats.delivered, stats.suppressed), (2, 1));
        assert_eq!(sink.attempts().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_honours_retry_after() {
        let sink = ScriptedSink::with_responses(vec![Err(DeliveryError::RateLimited {
            retry_after: Some(Duration::from_secs(3)),
        })]);
        let mut dispatcher =
            NotificationDispatcher::new(Arc::clone(&sink), MemoryCache::new(), DispatchSettings::default());

        let start = Instant::now();
        dispatcher.enqueue(job(Domain::Effects, 0));
        let stats = dispatcher.drain().await;

        let attempts = sink.attempts();
        assert_eq!(attempts.len(), 2);
        // Base delay before the first send
        assert_eq!(attempts[0].2 - start, Duration::from_secs(1));
        assert_eq!(attempts[1].2 - attempts[0].2, Duration::from_secs(3));
        assert_eq!(attempts[1].0, Domain::Effects);
        assert_eq!(stats.rate_limited, 1);
        assert_eq!(stats.delivered, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_job_blocks_queue_head() {
        let sink = ScriptedSink::with_responses(vec![Err(DeliveryError::RateLimited {
            retry_after: Some(Duration::from_secs(2)),
        })]);
        let mut dispatcher =
            NotificationDispatcher::new(Arc::clone(&sink), MemoryCache::new(), DispatchSettings::default());

        dispatcher.enqueue(job(Domain::Items, 0));
        dispatcher.enqueue(job(Domain::Effects, 0));
        dispatcher.drain().await;

        let order: Vec<Domain> = sink.attempts().iter().map(|a| a.0).collect();
        assert_eq!(order, vec![Domain::Items, Domain::Items, Domain::Effects]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_backoff_doubles_up_to_cap() {
        let sink = ScriptedSink::with_responses(vec![
            Err(DeliveryError::RateLimited { retry_after: None }),
            Err(DeliveryError::RateLimited { retry_after: None }),
            Err(DeliveryError::RateLimited { retry_after: None }),
        ]);
        let settings = DispatchSettings {
            max_backoff: Duration::from_secs(12),
            ..DispatchSettings::default()
        };
        let mut dispatcher = NotificationDispatcher::new(Arc::clone(&sink), MemoryCache::new(), settings);

        dispatcher.enqueue(job(Domain::PaintKits, 0));
        let stats = dispatcher.drain().await;

        let times: Vec<Instant> = sink.attempts().iter().map(|a| a.2).collect();
        assert_eq!(times.len(), 4);
        assert_eq!(times[1] - times[0], Duration::from_secs(5));
        assert_eq!(times[2] - times[1], Duration::from_secs(10));
        assert_eq!(times[3] - times[2], Duration::from_secs(12));
        assert_eq!(stats.rate_limited, 3);
    }

    #[test]
    fn test_fallback_backoff_values() {
        let settings = DispatchSettings::default();
        assert_eq!(settings.fallback_backoff(1), Duration::from_secs(5));
        assert_eq!(settings.fallback_backoff(2), Duration::from_secs(10));
        assert_eq!(settings.fallback_backoff(5), Duration::from_secs(60));
        assert_eq!(settings.fallback_backoff(40), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_failure_does_not_block() {
        let sink = ScriptedSink::with_responses(vec![Err(DeliveryError::permanent("400 Bad Request"))]);
        let cache = Arc::new(MemoryCache::new());
        let mut dispatcher =
            NotificationDispatcher::new(Arc::clone(&sink), Arc::clone(&cache), DispatchSettings::default());

        dispatcher.enqueue(job(Domain::Items, 0));
        dispatcher.enqueue(job(Domain::Effects, 0));
        let stats = dispatcher.drain().await;

        assert_eq!(stats.failed, 1);
        assert_eq!(stats.delivered, 1);
        assert_eq!(sink.attempts().len(), 2);
        // Failed job is not marked as sent
        assert!(cache.get("schema_notified:items:0").await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shared_cache_suppresses_other_instance() {
        let cache = Arc::new(MemoryCache::new());
        let first_sink = ScriptedSink::with_responses(Vec::new());
        let second_sink = ScriptedSink::with_responses(Vec::new());

        let mut first =
            NotificationDispatcher::new(Arc::clone(&first_sink), Arc::clone(&cache), DispatchSettings::default());
        let mut second =
            NotificationDispatcher::new(Arc::clone(&second_sink), Arc::clone(&cache), DispatchSettings::default());

        first.enqueue(job(Domain::Items, 0));
        second.enqueue(job(Domain::Items, 0));
        first.drain().await;
        let stats = second.drain().await;

        assert_eq!(first_sink.attempts().len(), 1);
        assert!(second_sink.attempts().is_empty());
        assert_eq!(stats.suppressed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_failure_does_not_stall() {
        let sink = ScriptedSink::with_responses(Vec::new());
        let mut dispatcher = NotificationDispatcher::new(Arc::clone(&sink), BrokenCache, DispatchSettings::default());

        dispatcher.enqueue(job(Domain::Items, 0));
        dispatcher.enqueue(job(Domain::Items, 1));
        let stats = dispatcher.drain().await;

        assert_eq!(stats.delivered, 2);
        assert_eq!(dispatcher.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_dispatcher_drains_on_close() {
        let sink = ScriptedSink::with_responses(vec![Err(DeliveryError::RateLimited {
            retry_after: Some(Duration::from_millis(1500)),
        })]);
        let dispatcher =
            NotificationDispatcher::new(Arc::clone(&sink), MemoryCache::new(), DispatchSettings::default());
        let (handle, task) = dispatcher.spawn();

        let queued = handle
            .enqueue_all([job(Domain::Items, 0), job(Domain::Items, 0), job(Domain::Effects, 0)])
            .unwrap();
        assert_eq!(queued, 3);
        handle.close();

        let stats = task.await.unwrap();
        assert_eq!(
            stats,
            DispatchStats {
                delivered: 2,
                suppressed: 1,
                failed: 0,
                rate_limited: 1,
            }
        );
    }
}
