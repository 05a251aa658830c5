//! The narrow cache contract the caching gate depends on.
use async_trait::async_trait;

/// Set of tokens currently known to be valid.
///
/// Implementations must be safe to share across request tasks: `put`,
/// `expire` and `contains` can run concurrently for the same token.
/// None of the operations fail at this surface; a backend that can fail
/// logs the error and degrades (a failed lookup is a miss).
#[async_trait]
pub trait TokenCache: Send + Sync + 'static {
    // Record `token` as valid. Idempotent; may refresh the entry's lifetime.
    async fn put(&self, token: &str);

    // Forget `token`. Expiring an absent token is a no-op.
    async fn expire(&self, token: &str);

    // Whether `token` is currently recorded as valid.
    async fn contains(&self, token: &str) -> bool;
}
