use thiserror::Error;

/// Errors surfaced by the gateway to calling services.
///
/// Each failure mode is distinguishable so the calling layer can present an
/// appropriate message; the gateway itself performs no user-visible handling.
#[derive(Error, Debug)]
pub enum ApiError {
    /// An authenticated operation was attempted with no stored credential
    /// pair. Raised before any network call is made.
    #[error("Not authenticated - no stored credentials")]
    Unauthenticated,

    /// The access token was rejected and the refresh cycle failed. The
    /// session layer is expected to clear credentials and re-authenticate.
    #[error("Session expired - token refresh failed")]
    SessionExpired,

    /// The server answered with a non-success status, on either the initial
    /// attempt or the single retry after a refresh.
    #[error("Request failed with status {status}")]
    RequestFailed { status: u16 },

    /// Transport-level failure (DNS, connection refused, timeout). Never
    /// retried by the gateway.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered 2xx but the body could not be decoded.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The request body could not be JSON-encoded.
    #[error("Failed to encode request body: {0}")]
    InvalidRequestBody(#[source] serde_json::Error),
}

/// Maximum length for response bodies quoted in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid dragging excessive data into logs.
    /// The cut is backed off to a char boundary so multibyte text cannot
    /// panic the slice.
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!(
            "{}... (truncated, {} total bytes)",
            &body[..end],
            body.len()
        )
    }

    /// Build an `InvalidResponse` from a decode failure and the offending body
    pub(crate) fn decode(err: serde_json::Error, body: &str) -> Self {
        ApiError::InvalidResponse(format!("{}: {}", err, Self::truncate_body(body)))
    }
}
