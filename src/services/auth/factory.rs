/// Factory: build the token cache and gate from application `Config`.
use std::sync::Arc;

use tracing::info;

use crate::config::{CacheBackend, Config};
use crate::error::GateError;
use crate::services::auth::{AuthGate, CachingAuthGate, RemoteValidator, ValidatorOptions};
use crate::services::cache::{CacheError, MemoryTokenCache, SharedTokenCache, TokenCache};

/// The gate variant selected by configuration.
#[derive(Clone)]
pub enum ConfiguredGate {
    Plain(AuthGate),
    Caching(CachingAuthGate),
}

pub async fn build_token_cache(
    config: &Config,
) -> Result<Option<Arc<dyn TokenCache>>, CacheError> {
    match &config.auth_cache {
        CacheBackend::None => Ok(None),
        CacheBackend::Memory => {
            let cache = MemoryTokenCache::new(config.auth_cache_ttl);
            cache.spawn_sweeper(config.auth_cache_sweep_interval);
            info!(ttl = ?config.auth_cache_ttl, "using in-memory token cache");
            Ok(Some(Arc::new(cache)))
        }
        CacheBackend::Valkey { url, prefix } => {
            let cache =
                SharedTokenCache::connect(url, prefix.clone(), config.auth_cache_ttl).await?;
            info!(ttl = ?config.auth_cache_ttl, prefix = %prefix, "using valkey token cache");
            Ok(Some(Arc::new(cache)))
        }
    }
}

pub fn build_gate(
    config: &Config,
    cache: Option<Arc<dyn TokenCache>>,
) -> Result<ConfiguredGate, GateError> {
    let validator = RemoteValidator::new(
        &config.auth_api_endpoint,
        ValidatorOptions {
            encoding: config.auth_token_encoding,
            timeout: config.auth_request_timeout,
        },
    )?;

    let builder = AuthGate::builder(validator);

    // A configured backend must end up in a caching gate.
    let gate = match config.auth_cache {
        CacheBackend::None => ConfiguredGate::Plain(builder.build()),
        _ => ConfiguredGate::Caching(builder.maybe_token_cache(cache).build_caching()?),
    };

    Ok(gate)
}
