use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tracing::warn;

use crate::services::cache::{
    client::{CacheClient, CacheError},
    token_cache::TokenCache,
    valkey::ValkeyClient,
};

/// Token cache shared between processes through a key/value backend.
///
/// Degrade policy: backend errors are logged and swallowed. A failed lookup
/// reports a miss, so the gate falls back to the remote authority.
#[derive(Clone)]
pub struct SharedTokenCache<C: CacheClient> {
    cache: Arc<C>,
    // Key prefix to avoid collisions across environments
    prefix: String,
    ttl: Duration,
}

impl SharedTokenCache<ValkeyClient> {
    pub async fn connect(
        redis_url: &str,
        prefix: impl Into<String>,
        ttl: Duration,
    ) -> Result<Self, CacheError> {
        let client = ValkeyClient::new(redis_url).await?;

        Ok(Self::new_with_cache(Arc::new(client), prefix, ttl))
    }
}

impl<C: CacheClient> SharedTokenCache<C> {
    pub fn new_with_cache(cache: Arc<C>, prefix: impl Into<String>, ttl: Duration) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
            ttl,
        }
    }

    pub fn key(&self, token: &str) -> String {
        format!("{}:{}", self.prefix, token)
    }
}

#[async_trait]
impl<C: CacheClient> TokenCache for SharedTokenCache<C> {
    async fn put(&self, token: &str) {
        if let Err(err) = self.cache.set_with_ttl(&self.key(token), "1", self.ttl).await {
            warn!(backend = self.cache.backend_name(), error = %err, "token cache put failed");
        }
    }

    async fn expire(&self, token: &str) {
        if let Err(err) = self.cache.del(&self.key(token)).await {
            warn!(backend = self.cache.backend_name(), error = %err, "token cache expire failed");
        }
    }

    async fn contains(&self, token: &str) -> bool {
        match self.cache.exists(&self.key(token)).await {
            Ok(found) => found,
            Err(err) => {
                warn!(backend = self.cache.backend_name(), error = %err, "token cache lookup failed");
                false
            }
        }
    }
}
