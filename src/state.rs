/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - token_cache: logout 時の Expire に使う (cache 未設定なら None)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::cache::TokenCache;

#[derive(Clone, Default)]
pub struct AppState {
    pub token_cache: Option<Arc<dyn TokenCache>>,
}

impl AppState {
    pub fn new(token_cache: Option<Arc<dyn TokenCache>>) -> Self {
        Self { token_cache }
    }
}
