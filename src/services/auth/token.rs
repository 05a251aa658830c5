//! Token extraction from the inbound request.
use axum::http::Uri;

/// Query parameter carrying the token.
pub const TOKEN_QUERY_PARAM: &str = "token";

/// Read the first `token` query parameter (form-url-decoded).
///
/// Absent and empty both yield an empty string; validation turns that into
/// `AuthFailure::MissingToken`.
pub fn extract_token(uri: &Uri) -> String {
    uri.query()
        .and_then(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key == TOKEN_QUERY_PARAM)
                .map(|(_, value)| value.into_owned())
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_of(uri: &str) -> String {
        extract_token(&uri.parse::<Uri>().unwrap())
    }

    #[test]
    fn reads_token_parameter() {
        assert_eq!(token_of("/resource?token=abc123"), "abc123");
        assert_eq!(token_of("/resource?a=1&token=abc123&b=2"), "abc123");
    }

    #[test]
    fn missing_or_empty_is_empty_string() {
        assert_eq!(token_of("/resource"), "");
        assert_eq!(token_of("/resource?other=1"), "");
        assert_eq!(token_of("/resource?token="), "");
    }

    #[test]
    fn first_occurrence_wins_and_is_decoded() {
        assert_eq!(token_of("/r?token=first&token=second"), "first");
        assert_eq!(token_of("/r?token=a%2Fb+c"), "a/b c");
    }
}
