/*
 * Responsibility
 * - DELETE /api/v1/session (logout)
 * - 呼び出し元の token を TokenCache から Expire する
 *   (caching gate は自分ではエントリを削除しないため、ここが失効の入口)
 */
use axum::{
    extract::State,
    http::{StatusCode, Uri},
};
use tracing::info;

use crate::services::auth::token::extract_token;
use crate::state::AppState;

pub async fn logout(State(state): State<AppState>, uri: Uri) -> StatusCode {
    let token = extract_token(&uri);

    if let Some(cache) = state.token_cache.as_ref() {
        cache.expire(&token).await;
        info!("token expired from cache");
    }

    StatusCode::NO_CONTENT
}
