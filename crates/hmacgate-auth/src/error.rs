//! Error types for request authentication.
//!
//! Every client-caused rejection is an [`AuthError::AuthenticationFailed`]
//! carrying a [`FailureReason`]. Directory infrastructure faults and body
//! encoding failures have their own variants.

use std::fmt;

use crate::authenticator::AuthStage;

/// Why a request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    /// The `Key` header is absent.
    MissingKey,
    /// The `Key` header does not identify any credential.
    InvalidKey,
    /// The `Signature` header is absent.
    MissingSignature,
    /// The `Signature` header is not a byte sequence.
    InvalidSignatureEncoding,
    /// The supplied signature differs from the recomputed one.
    SignatureMismatch,
}

impl FailureReason {
    /// Stable reason code.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingKey => "missing key",
            Self::InvalidKey => "invalid key",
            Self::MissingSignature => "missing signature",
            Self::InvalidSignatureEncoding => "invalid signature encoding",
            Self::SignatureMismatch => "signature mismatch",
        }
    }

    /// The last stage the request reached before it was rejected.
    #[must_use]
    pub fn stage(self) -> AuthStage {
        match self {
            Self::MissingKey => AuthStage::Start,
            Self::InvalidKey => AuthStage::KeyExtracted,
            Self::MissingSignature | Self::InvalidSignatureEncoding => {
                AuthStage::PrincipalResolved
            }
            Self::SignatureMismatch => AuthStage::SignatureExtracted,
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while signing or authenticating a request.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The request failed authentication. Terminal and not retryable.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(FailureReason),

    /// The request body cannot be turned into a canonical message.
    #[error("request body is not canonically encodable: {0}")]
    Encoding(String),

    /// The credential directory could not be queried.
    #[error("credential directory unavailable: {0}")]
    DirectoryUnavailable(String),
}

impl AuthError {
    /// The failure reason, if this is an authentication failure.
    #[must_use]
    pub fn reason(&self) -> Option<FailureReason> {
        match self {
            Self::AuthenticationFailed(reason) => Some(*reason),
            Self::Encoding(_) | Self::DirectoryUnavailable(_) => None,
        }
    }
}

impl From<FailureReason> for AuthError {
    fn from(reason: FailureReason) -> Self {
        Self::AuthenticationFailed(reason)
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encoding(err.to_string())
    }
}
