//! token 検証 gate を Router に適用する middleware
//!
//! - query `token` を取り出して gate (AuthGate / CachingAuthGate) で検証
//! - 成功時はリクエストをそのまま次へ渡す
//! - 失敗時のレスポンスは gate の UnauthorizedHandler が作る

use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
};

use crate::services::auth::gate::{Gate, guard};

/// Put every route of `router` behind `gate`.
///
/// ```ignore
/// let v1 = api::v1::routes();
/// let v1 = middleware::auth::gate::apply(v1, gate);
/// app = app.nest("/api/v1", v1);
/// ```
pub fn apply<S, G>(router: Router<S>, gate: G) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    G: Gate,
{
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に gate を渡す
    router.layer(middleware::from_fn_with_state(gate, gate_middleware::<G>))
}

async fn gate_middleware<G: Gate>(State(gate): State<G>, req: Request, next: Next) -> Response {
    guard(&gate, req, |req| next.run(req)).await
}
