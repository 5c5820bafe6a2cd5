//! Idempotency cache used to suppress duplicate notifications.
//!
//! Several watcher processes may share one cache; a key set by any of them
//! suppresses the same page everywhere until it expires.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::{AppError, Result};

/// Key/value store with per-key expiry.
#[async_trait]
pub trait IdempotencyCache: Send + Sync {
    /// Value stored under `key`, if present and not expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key` for `ttl`.
    async fn set_with_expiry(&self, key: &str, ttl: Duration, value: &str) -> Result<()>;
}

#[async_trait]
impl<T: IdempotencyCache + ?Sized> IdempotencyCache for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key).await
    }

    async fn set_with_expiry(&self, key: &str, ttl: Duration, value: &str) -> Result<()> {
        (**self).set_with_expiry(key, ttl, value).await
    }
}

/// In-process cache; expiry follows the tokio clock.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .map(|entries| entries.values().filter(|(_, expires)| *expires > now).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl IdempotencyCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| AppError::cache("memory cache lock poisoned"))?;

        match entries.get(key) {
            Some((value, expires)) if *expires > Instant::now() => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_with_expiry(&self, key: &str, ttl: Duration, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| AppError::cache("memory cache lock poisoned"))?;
        entries.insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }
}
