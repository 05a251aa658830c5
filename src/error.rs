/*
 * Responsibility
 * - 認証失敗 (AuthFailure) と gate 構築エラー (GateError) の定義
 * - AuthFailure の IntoResponse 実装 (401 / plain text)
 */
use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Why a request was refused by the gate.
///
/// Every variant is reported as HTTP 401; the variant only changes the message.
#[derive(Debug, Error)]
pub enum AuthFailure {
    #[error("Authentication failed: missing 'token' query parameter")]
    MissingToken,
    #[error("Authentication failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Authentication failed, token: {token} is invalid")]
    // `status` is None when the token was refused before calling the authority.
    InvalidToken { token: String, status: Option<u16> },
    #[error("Authentication failed: {0}")]
    Endpoint(String),
}

impl AuthFailure {
    pub fn invalid_token(token: impl Into<String>, status: StatusCode) -> Self {
        Self::InvalidToken {
            token: token.into(),
            status: Some(status.as_u16()),
        }
    }

    // Token that cannot be placed in the authority path (`.` / `..`).
    pub fn unroutable_token(token: impl Into<String>) -> Self {
        Self::InvalidToken {
            token: token.into(),
            status: None,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    // Short machine-readable name (for logs).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingToken => "missing_token",
            Self::Transport(_) => "transport",
            Self::InvalidToken { .. } => "invalid_token",
            Self::Endpoint(_) => "endpoint",
        }
    }
}

impl IntoResponse for AuthFailure {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}

/// Programming/configuration errors detected while building a gate.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("a token cache is required to build a caching gate")]
    MissingTokenCache,
    #[error("invalid authority endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl GateError {
    pub fn invalid_endpoint(endpoint: &str, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: reason.into(),
        }
    }
}
