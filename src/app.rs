/*
 * Responsibility
 * - tracing / panic hook 初期化
 * - Config読み込み → TokenCache / gate 生成 → Router 組み立て
 * - axum::serve() で起動
 */
use std::{panic, process};

use anyhow::Result;
use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::{self, v1::handlers::health::health};
use crate::config::Config;
use crate::middleware;
use crate::services::auth::factory::{ConfiguredGate, build_gate, build_token_cache};
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,token_gate=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // In development, fail fast: crash the whole process so we notice immediately.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        endpoint = %config.auth_api_endpoint,
        cache = ?config.auth_cache,
        "starting token gate in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let token_cache = build_token_cache(&config).await?;
    let gate = build_gate(&config, token_cache.clone())?;
    let state = AppState::new(token_cache);

    let app = build_router(state, gate, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState, gate: ConfiguredGate, config: &Config) -> Router {
    let v1 = api::v1::routes();
    let v1 = match gate {
        ConfiguredGate::Plain(gate) => middleware::auth::gate::apply(v1, gate),
        ConfiguredGate::Caching(gate) => middleware::auth::gate::apply(v1, gate),
    };

    let router = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", v1)
        .with_state(state);

    middleware::http::apply(router, config.http_request_timeout)
}
