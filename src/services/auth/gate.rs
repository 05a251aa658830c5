/*
 * Responsibility
 * - 認証 gate (AuthGate / CachingAuthGate) の判定ロジック
 * - token 抽出 → (cache) → remote 検証 → 転送 or UnauthorizedHandler
 * - 構築時の前提チェック (caching gate には TokenCache が必須)
 */
use std::{future::Future, sync::Arc};

use async_trait::async_trait;
use axum::{extract::Request, response::Response};
use tracing::{debug, warn};

use crate::error::{AuthFailure, GateError};
use crate::services::auth::{
    token::extract_token,
    unauthorized::{UnauthorizedHandler, default_unauthorized_handler},
    validator::RemoteValidator,
};
use crate::services::cache::TokenCache;

/// Authentication decision shared by both gate variants.
#[async_trait]
pub trait Gate: Clone + Send + Sync + 'static {
    async fn authenticate(&self, token: &str) -> Result<(), AuthFailure>;

    fn unauthorized_handler(&self) -> &dyn UnauthorizedHandler;
}

/// Run `req` through `gate`: forward to `protected` on success, otherwise
/// hand the request to the gate's `UnauthorizedHandler`.
///
/// The request is forwarded unchanged; the gate never writes a response of
/// its own.
pub async fn guard<G, F, Fut>(gate: &G, req: Request, protected: F) -> Response
where
    G: Gate,
    F: FnOnce(Request) -> Fut,
    Fut: Future<Output = Response>,
{
    let token = extract_token(req.uri());

    match gate.authenticate(&token).await {
        Ok(()) => protected(req).await,
        Err(failure) => {
            warn!(
                kind = failure.kind(),
                error = %failure,
                path = %req.uri().path(),
                "authentication failed"
            );
            gate.unauthorized_handler().handle(req, failure)
        }
    }
}

/// Validates every request against the authority.
#[derive(Clone)]
pub struct AuthGate {
    validator: RemoteValidator,
    unauthorized: Arc<dyn UnauthorizedHandler>,
}

impl AuthGate {
    pub fn builder(validator: RemoteValidator) -> GateBuilder {
        GateBuilder::new(validator)
    }

    pub async fn handle<F, Fut>(&self, req: Request, protected: F) -> Response
    where
        F: FnOnce(Request) -> Fut,
        Fut: Future<Output = Response>,
    {
        guard(self, req, protected).await
    }
}

#[async_trait]
impl Gate for AuthGate {
    async fn authenticate(&self, token: &str) -> Result<(), AuthFailure> {
        self.validator.validate(token).await
    }

    fn unauthorized_handler(&self) -> &dyn UnauthorizedHandler {
        self.unauthorized.as_ref()
    }
}

/// Like `AuthGate`, but remembers tokens the authority accepted.
///
/// Only positives are cached and the gate never removes entries; revocation
/// reaches this gate once some other actor calls `TokenCache::expire`.
#[derive(Clone)]
pub struct CachingAuthGate {
    validator: RemoteValidator,
    unauthorized: Arc<dyn UnauthorizedHandler>,
    cache: Arc<dyn TokenCache>,
}

impl CachingAuthGate {
    pub fn builder(validator: RemoteValidator) -> GateBuilder {
        GateBuilder::new(validator)
    }

    pub fn cache(&self) -> &Arc<dyn TokenCache> {
        &self.cache
    }

    pub async fn handle<F, Fut>(&self, req: Request, protected: F) -> Response
    where
        F: FnOnce(Request) -> Fut,
        Fut: Future<Output = Response>,
    {
        guard(self, req, protected).await
    }
}

#[async_trait]
impl Gate for CachingAuthGate {
    async fn authenticate(&self, token: &str) -> Result<(), AuthFailure> {
        if token.is_empty() {
            return Err(AuthFailure::MissingToken);
        }

        if self.cache.contains(token).await {
            debug!("token cache hit");
            return Ok(());
        }

        self.validator.validate(token).await?;
        self.cache.put(token).await;
        debug!("token validated and cached");

        Ok(())
    }

    fn unauthorized_handler(&self) -> &dyn UnauthorizedHandler {
        self.unauthorized.as_ref()
    }
}

/// Collects gate configuration; immutable once built.
pub struct GateBuilder {
    validator: RemoteValidator,
    unauthorized: Option<Arc<dyn UnauthorizedHandler>>,
    cache: Option<Arc<dyn TokenCache>>,
}

impl GateBuilder {
    pub fn new(validator: RemoteValidator) -> Self {
        Self {
            validator,
            unauthorized: None,
            cache: None,
        }
    }

    // Replace the default 401 responder.
    pub fn unauthorized_handler(mut self, handler: impl UnauthorizedHandler) -> Self {
        self.unauthorized = Some(Arc::new(handler));
        self
    }

    pub fn token_cache(mut self, cache: Arc<dyn TokenCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn maybe_token_cache(mut self, cache: Option<Arc<dyn TokenCache>>) -> Self {
        self.cache = cache;
        self
    }

    fn handler(&mut self) -> Arc<dyn UnauthorizedHandler> {
        match self.unauthorized.take() {
            Some(handler) => handler,
            None => Arc::new(default_unauthorized_handler),
        }
    }

    /// Build the non-caching gate. A configured cache is not consulted.
    pub fn build(mut self) -> AuthGate {
        let unauthorized = self.handler();
        AuthGate {
            validator: self.validator,
            unauthorized,
        }
    }

    /// Build the caching gate; fails when no cache was supplied.
    pub fn build_caching(mut self) -> Result<CachingAuthGate, GateError> {
        let cache = self.cache.take().ok_or(GateError::MissingTokenCache)?;
        let unauthorized = self.handler();

        Ok(CachingAuthGate {
            validator: self.validator,
            unauthorized,
            cache,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::validator::ValidatorOptions;
    use crate::services::cache::MemoryTokenCache;
    use axum::{
        body::{Body, to_bytes},
        http::StatusCode,
        response::IntoResponse,
    };
    use std::{
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn validator(endpoint: &str) -> RemoteValidator {
        RemoteValidator::new(endpoint, ValidatorOptions::default()).unwrap()
    }

    fn request(uri: &str) -> Request {
        axum::http::Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn authority(token: &str, status: u16, calls: u64) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/machine/token/user/{token}")))
            .respond_with(ResponseTemplate::new(status))
            .expect(calls)
            .mount(&server)
            .await;
        server
    }

    #[test]
    fn caching_gate_requires_a_cache() {
        let result = CachingAuthGate::builder(validator("http://authority")).build_caching();

        assert!(matches!(result, Err(GateError::MissingTokenCache)));
    }

    #[tokio::test]
    async fn forwards_request_untouched_on_success() {
        let server = authority("abc123", 200, 1).await;
        let gate = AuthGate::builder(validator(&server.uri())).build();

        let response = gate
            .handle(request("/resource?token=abc123"), |req| async move {
                assert_eq!(req.uri(), "/resource?token=abc123");
                StatusCode::OK.into_response()
            })
            .await;

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn custom_handler_sees_request_and_failure_once() {
        let server = authority("bad", 403, 1).await;
        let seen: Arc<Mutex<Vec<(String, &'static str)>>> = Arc::default();
        let forwarded = Arc::new(AtomicUsize::new(0));

        let recorder = seen.clone();
        let gate = AuthGate::builder(validator(&server.uri()))
            .unauthorized_handler(move |req: Request, failure: AuthFailure| {
                recorder
                    .lock()
                    .unwrap()
                    .push((req.uri().to_string(), failure.kind()));
                StatusCode::FORBIDDEN.into_response()
            })
            .build();

        let counter = forwarded.clone();
        let response = gate
            .handle(request("/resource?token=bad"), |_req| async move {
                counter.fetch_add(1, Ordering::SeqCst);
                StatusCode::OK.into_response()
            })
            .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(forwarded.load(Ordering::SeqCst), 0);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![("/resource?token=bad".to_string(), "invalid_token")]
        );
    }

    #[tokio::test]
    async fn caching_gate_skips_authority_on_hit() {
        let server = authority("abc123", 200, 1).await;
        let cache = Arc::new(MemoryTokenCache::new(Duration::from_secs(60)));
        let gate = CachingAuthGate::builder(validator(&server.uri()))
            .token_cache(cache.clone())
            .build_caching()
            .unwrap();

        for _ in 0..3 {
            let response = gate
                .handle(request("/resource?token=abc123"), |_req| async {
                    StatusCode::OK.into_response()
                })
                .await;
            assert_eq!(response.status(), StatusCode::OK);
        }

        assert!(cache.contains("abc123").await);
    }

    #[tokio::test]
    async fn caching_gate_never_caches_rejections() {
        let server = authority("bad", 401, 2).await;
        let cache = Arc::new(MemoryTokenCache::new(Duration::from_secs(60)));
        let gate = CachingAuthGate::builder(validator(&server.uri()))
            .token_cache(cache.clone())
            .build_caching()
            .unwrap();

        for _ in 0..2 {
            let response = gate
                .handle(request("/resource?token=bad"), |_req| async {
                    StatusCode::OK.into_response()
                })
                .await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert!(body_text(response).await.contains("bad"));
        }

        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn caching_gate_revalidates_after_expire() {
        let server = authority("abc123", 200, 2).await;
        let cache = Arc::new(MemoryTokenCache::new(Duration::from_secs(60)));
        let gate = CachingAuthGate::builder(validator(&server.uri()))
            .token_cache(cache.clone())
            .build_caching()
            .unwrap();

        let ok = |_req: Request| async { StatusCode::OK.into_response() };

        gate.handle(request("/r?token=abc123"), ok).await;
        cache.expire("abc123").await;
        let response = gate.handle(request("/r?token=abc123"), ok).await;

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn caching_gate_rejects_missing_token_before_cache() {
        let cache = Arc::new(MemoryTokenCache::new(Duration::from_secs(60)));
        // An empty key must not turn into an accepted token.
        cache.put("").await;

        let gate = CachingAuthGate::builder(validator("http://127.0.0.1:1"))
            .token_cache(cache)
            .build_caching()
            .unwrap();

        let response = gate
            .handle(request("/resource"), |_req| async {
                StatusCode::OK.into_response()
            })
            .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_text(response).await;
        assert!(body.contains("missing"));
        assert!(body.contains("token"));
    }
}
