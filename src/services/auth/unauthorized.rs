//! Pluggable responder for refused requests.
use axum::{
    extract::Request,
    response::{IntoResponse, Response},
};

use crate::error::AuthFailure;

/// Produces the response for a request the gate refused.
///
/// Invoked exactly once per refused request, and never for a request that
/// was forwarded to the protected handler. Implemented for any
/// `Fn(Request, AuthFailure) -> Response`.
pub trait UnauthorizedHandler: Send + Sync + 'static {
    fn handle(&self, req: Request, failure: AuthFailure) -> Response;
}

impl<F> UnauthorizedHandler for F
where
    F: Fn(Request, AuthFailure) -> Response + Send + Sync + 'static,
{
    fn handle(&self, req: Request, failure: AuthFailure) -> Response {
        self(req, failure)
    }
}

/// 401 with the failure message as a plain-text body.
pub fn default_unauthorized_handler(_req: Request, failure: AuthFailure) -> Response {
    failure.into_response()
}
