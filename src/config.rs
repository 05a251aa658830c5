/*
 * Responsibility
 * - 環境変数からの設定読み込み (PORT, AUTH_API_ENDPOINT, cache 設定など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::services::auth::TokenEncoding;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Where validated tokens are remembered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheBackend {
    // Plain gate: every request goes to the authority.
    None,
    Memory,
    Valkey { url: String, prefix: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub auth_api_endpoint: String,
    pub auth_token_encoding: TokenEncoding,
    pub auth_request_timeout: Option<Duration>,

    pub auth_cache: CacheBackend,
    pub auth_cache_ttl: Duration,
    pub auth_cache_sweep_interval: Duration,

    pub http_request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = lookup("APP_ENV")
            .map(|raw| AppEnv::parse(&raw))
            .unwrap_or(AppEnv::Development);

        let auth_api_endpoint = lookup("AUTH_API_ENDPOINT")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("AUTH_API_ENDPOINT"))?;

        let auth_token_encoding = match lookup("AUTH_TOKEN_ENCODING")
            .unwrap_or_else(|| "percent".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "percent" => TokenEncoding::PercentEncoded,
            "verbatim" => TokenEncoding::Verbatim,
            _ => return Err(ConfigError::Invalid("AUTH_TOKEN_ENCODING")),
        };

        let auth_request_timeout = lookup("AUTH_REQUEST_TIMEOUT_SECONDS")
            .map(|raw| parse_seconds(&raw, "AUTH_REQUEST_TIMEOUT_SECONDS"))
            .transpose()?;

        let auth_cache = match lookup("AUTH_CACHE")
            .unwrap_or_else(|| "none".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "none" | "" => CacheBackend::None,
            "memory" => CacheBackend::Memory,
            "valkey" | "redis" => CacheBackend::Valkey {
                url: lookup("VALKEY_URL").ok_or(ConfigError::Missing("VALKEY_URL"))?,
                prefix: lookup("AUTH_CACHE_PREFIX").unwrap_or_else(|| "auth:token".to_string()),
            },
            _ => return Err(ConfigError::Invalid("AUTH_CACHE")),
        };

        let auth_cache_ttl = match lookup("AUTH_CACHE_TTL_SECONDS") {
            Some(raw) => parse_seconds(&raw, "AUTH_CACHE_TTL_SECONDS")?,
            None => Duration::from_secs(300),
        };

        let auth_cache_sweep_interval = match lookup("AUTH_CACHE_SWEEP_SECONDS") {
            Some(raw) => parse_seconds(&raw, "AUTH_CACHE_SWEEP_SECONDS")?,
            None => Duration::from_secs(60),
        };

        let http_request_timeout = match lookup("HTTP_REQUEST_TIMEOUT_SECONDS") {
            Some(raw) => parse_seconds(&raw, "HTTP_REQUEST_TIMEOUT_SECONDS")?,
            None => Duration::from_secs(30),
        };

        Ok(Self {
            addr,
            app_env,
            auth_api_endpoint,
            auth_token_encoding,
            auth_request_timeout,
            auth_cache,
            auth_cache_ttl,
            auth_cache_sweep_interval,
            http_request_timeout,
        })
    }
}

// Positive whole seconds.
fn parse_seconds(raw: &str, key: &'static str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::Invalid(key)),
    }
}
