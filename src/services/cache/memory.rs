//! In-process token cache with per-entry expiry.
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::debug;

use crate::services::cache::token_cache::TokenCache;

/// Tokens with their expiry deadline.
///
/// Entries past their deadline are never reported by `contains`; they are
/// physically removed lazily on lookup or by the sweeper task.
#[derive(Clone, Debug)]
pub struct MemoryTokenCache {
    entries: Arc<DashMap<String, Instant>>,
    ttl: Duration,
}

impl MemoryTokenCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every expired entry, returning how many were dropped.
    pub fn sweep(&self) -> usize {
        sweep_entries(&self.entries)
    }

    /// Periodically sweep expired entries.
    ///
    /// The task holds only a weak reference and exits once every clone of
    /// the cache has been dropped. `period` must be non-zero.
    pub fn spawn_sweeper(&self, period: Duration) -> JoinHandle<()> {
        let entries = Arc::downgrade(&self.entries);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let Some(entries) = entries.upgrade() else {
                    debug!("token cache dropped, sweeper exiting");
                    break;
                };

                let removed = sweep_entries(&entries);
                if removed > 0 {
                    debug!(removed, remaining = entries.len(), "swept expired tokens");
                }
            }
        })
    }
}

fn sweep_entries(entries: &DashMap<String, Instant>) -> usize {
    let now = Instant::now();
    let before = entries.len();
    entries.retain(|_, deadline| *deadline > now);
    before.saturating_sub(entries.len())
}

#[async_trait]
impl TokenCache for MemoryTokenCache {
    async fn put(&self, token: &str) {
        self.entries
            .insert(token.to_string(), Instant::now() + self.ttl);
    }

    async fn expire(&self, token: &str) {
        self.entries.remove(token);
    }

    async fn contains(&self, token: &str) -> bool {
        let now = Instant::now();

        // The read guard must be released before removing the entry.
        let live = match self.entries.get(token) {
            Some(deadline) => *deadline.value() > now,
            None => return false,
        };

        if !live {
            self.entries.remove_if(token, |_, deadline| *deadline <= now);
        }

        live
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_contains() {
        let cache = MemoryTokenCache::new(Duration::from_secs(60));

        assert!(!cache.contains("abc123").await);
        cache.put("abc123").await;
        assert!(cache.contains("abc123").await);
        assert!(!cache.contains("other").await);
    }

    #[tokio::test]
    async fn put_is_idempotent() {
        let cache = MemoryTokenCache::new(Duration::from_secs(60));

        cache.put("abc123").await;
        cache.put("abc123").await;

        assert_eq!(cache.len(), 1);
        assert!(cache.contains("abc123").await);
    }

    #[tokio::test]
    async fn expire_removes_and_tolerates_absent_tokens() {
        let cache = MemoryTokenCache::new(Duration::from_secs(60));

        cache.expire("never-seen").await;
        assert!(cache.is_empty());

        cache.put("abc123").await;
        cache.expire("abc123").await;
        cache.expire("abc123").await;

        assert!(!cache.contains("abc123").await);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn entries_stop_matching_after_ttl() {
        let cache = MemoryTokenCache::new(Duration::from_millis(20));

        cache.put("abc123").await;
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(!cache.contains("abc123").await);
        // lazily removed on lookup
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn sweep_drops_only_expired_entries() {
        let short = MemoryTokenCache::new(Duration::from_millis(20));
        short.put("old").await;
        tokio::time::sleep(Duration::from_millis(60)).await;

        // Same map, longer ttl for the second entry.
        let long = MemoryTokenCache {
            entries: short.entries.clone(),
            ttl: Duration::from_secs(60),
        };
        long.put("fresh").await;

        assert_eq!(short.sweep(), 1);
        assert_eq!(short.len(), 1);
        assert!(long.contains("fresh").await);
    }

    #[tokio::test]
    async fn sweeper_exits_when_cache_is_dropped() {
        let cache = MemoryTokenCache::new(Duration::from_secs(60));
        let handle = cache.spawn_sweeper(Duration::from_millis(10));

        drop(cache);

        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("sweeper should stop")
            .unwrap();
    }
}
