/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth::gate::apply (token gate), http::apply (横断的な HTTP 層)
 */
pub mod auth;
pub mod http;
