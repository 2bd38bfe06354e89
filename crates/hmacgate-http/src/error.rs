//! HTTP-level errors and their status codes.

use hmacgate_auth::AuthError;

/// Detail returned for every authentication failure.
///
/// One fixed text for all reasons, so the response never reveals which step
/// rejected the request.
pub const FORBIDDEN_DETAIL: &str = "Incorrect authentication credentials.";

/// Errors surfaced to HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Authentication failed, for any reason.
    #[error("{FORBIDDEN_DETAIL}")]
    Forbidden,

    /// The request body exceeds the configured limit.
    #[error("Request body exceeds {limit} bytes.")]
    PayloadTooLarge {
        /// The configured limit in bytes.
        limit: usize,
    },

    /// The credential directory could not be queried.
    #[error("Service temporarily unavailable.")]
    ServiceUnavailable,

    /// The request could not be read.
    #[error("{0}")]
    BadRequest(String),

    /// An unexpected server-side failure.
    #[error("{0}")]
    Internal(String),
}

impl GatewayError {
    /// The HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> http::StatusCode {
        match self {
            Self::Forbidden => http::StatusCode::FORBIDDEN,
            Self::PayloadTooLarge { .. } => http::StatusCode::PAYLOAD_TOO_LARGE,
            Self::ServiceUnavailable => http::StatusCode::SERVICE_UNAVAILABLE,
            Self::BadRequest(_) => http::StatusCode::BAD_REQUEST,
            Self::Internal(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthError> for GatewayError {
    fn from(err: AuthError) -> Self {
        match err {
            // A body that cannot be canonicalized is only detected after the
            // key and signature headers passed, so it must look the same.
            AuthError::AuthenticationFailed(_) | AuthError::Encoding(_) => Self::Forbidden,
            AuthError::DirectoryUnavailable(_) => Self::ServiceUnavailable,
        }
    }
}
