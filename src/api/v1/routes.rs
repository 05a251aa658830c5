/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - ここに載る route はすべて token gate の内側 (app.rs で gate を適用)
 */
use axum::{
    Router,
    routing::{delete, get},
};

use crate::api::v1::handlers::{session::logout, status::status};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(status))
        .route("/session", delete(logout))
}
