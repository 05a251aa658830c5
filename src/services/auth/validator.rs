//! Remote token validation against the identity authority.
//!
//! Wire protocol:
//! - `GET {endpoint}/machine/token/user/{token}`
//! - `Authorization: {token}` (raw value, no scheme)
//! - success iff the status is exactly 200; the body is ignored
//!
//! One attempt per call, no retries. Without an explicit timeout a hung
//! authority stalls the calling request.
use std::time::Duration;

use axum::http::{StatusCode, header};
use tracing::debug;
use url::Url;

use crate::error::{AuthFailure, GateError};

const VALIDATION_PATH: [&str; 3] = ["machine", "token", "user"];

/// How the token is placed into the outbound path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenEncoding {
    /// Percent-encode the token as a single path segment.
    #[default]
    PercentEncoded,
    /// Concatenate the token unescaped (for older authorities).
    ///
    /// The result still goes through `Url::parse`, which resolves `.`/`..`
    /// segments inside the token (`a/../x` is sent as `x`). Only tokens
    /// without dot segments reach the authority byte-for-byte.
    Verbatim,
}

/// Outbound transport options.
#[derive(Debug, Clone, Default)]
pub struct ValidatorOptions {
    pub encoding: TokenEncoding,
    // None: whatever reqwest defaults to (no overall timeout).
    pub timeout: Option<Duration>,
}

/// Checks tokens against the authority over a shared connection pool.
///
/// Cloning is cheap; clones share the same `reqwest::Client` pool.
#[derive(Clone, Debug)]
pub struct RemoteValidator {
    client: reqwest::Client,
    endpoint: Url,
    encoding: TokenEncoding,
}

impl RemoteValidator {
    pub fn new(endpoint: &str, options: ValidatorOptions) -> Result<Self, GateError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }

        Self::with_client(endpoint, builder.build()?, options.encoding)
    }

    /// Reuse an existing client (and its connection pool).
    pub fn with_client(
        endpoint: &str,
        client: reqwest::Client,
        encoding: TokenEncoding,
    ) -> Result<Self, GateError> {
        let endpoint = parse_endpoint(endpoint)?;

        Ok(Self {
            client,
            endpoint,
            encoding,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn encoding(&self) -> TokenEncoding {
        self.encoding
    }

    pub async fn validate(&self, token: &str) -> Result<(), AuthFailure> {
        if token.is_empty() {
            return Err(AuthFailure::MissingToken);
        }

        let url = self.validation_url(token)?;

        let response = self
            .client
            .get(url)
            .header(header::AUTHORIZATION, token)
            .send()
            .await
            .map_err(|e| AuthFailure::Transport(e.without_url()))?;

        let status = response.status();
        debug!(status = status.as_u16(), "authority responded");

        if status != StatusCode::OK {
            return Err(AuthFailure::invalid_token(token, status));
        }

        Ok(())
    }

    pub(crate) fn validation_url(&self, token: &str) -> Result<Url, AuthFailure> {
        // URL parsing drops dot segments in either encoding, which would
        // send the request to the parent resource without the token.
        if matches!(token, "." | "..") {
            return Err(AuthFailure::unroutable_token(token));
        }

        match self.encoding {
            TokenEncoding::PercentEncoded => {
                let mut url = self.endpoint.clone();
                url.path_segments_mut()
                    .map_err(|_| AuthFailure::Endpoint("endpoint cannot be a base url".into()))?
                    .pop_if_empty()
                    .extend(VALIDATION_PATH)
                    .push(token);
                Ok(url)
            }
            TokenEncoding::Verbatim => {
                let raw = format!(
                    "{}/{}/{}",
                    self.endpoint.as_str().trim_end_matches('/'),
                    VALIDATION_PATH.join("/"),
                    token
                );
                Url::parse(&raw).map_err(|e| AuthFailure::Endpoint(e.to_string()))
            }
        }
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, GateError> {
    let url = Url::parse(endpoint.trim())
        .map_err(|e| GateError::invalid_endpoint(endpoint, e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(GateError::invalid_endpoint(
            endpoint,
            "scheme must be http or https",
        ));
    }
    if url.cannot_be_a_base() {
        return Err(GateError::invalid_endpoint(endpoint, "not a base url"));
    }

    Ok(url)
}
