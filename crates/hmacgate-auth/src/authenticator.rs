//! Principal resolution and signature verification.
//!
//! Each request moves linearly through the stages below; any stage may reject
//! it with a [`FailureReason`]. No state survives the call.
//!
//! ```text
//! Start ─► KeyExtracted ─► PrincipalResolved ─► SignatureExtracted ─► SignatureVerified
//!   │           │                  │                     │
//!   └───────────┴──────────────────┴─────────────────────┴──► Rejected(reason)
//! ```

use std::fmt;
use std::sync::Arc;

use hmacgate_core::{Credential, Principal};
use tracing::{debug, warn};

use crate::directory::Directory;
use crate::error::{AuthError, FailureReason};
use crate::request::{BodySource, HeaderField, HeaderSource};
use crate::signer::{Signature, Signer};

/// Header carrying the public key identifier.
pub const KEY_HEADER: &str = "Key";

/// Header carrying the raw signature bytes.
pub const SIGNATURE_HEADER: &str = "Signature";

/// Progress of a single authentication attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthStage {
    /// Nothing has been read yet.
    Start,
    /// The `Key` header was read.
    KeyExtracted,
    /// The key resolved to a principal and its credential.
    PrincipalResolved,
    /// The `Signature` header was read as bytes.
    SignatureExtracted,
    /// The signature matched. Terminal success.
    SignatureVerified,
}

impl AuthStage {
    /// Stage name for logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::KeyExtracted => "KEY_EXTRACTED",
            Self::PrincipalResolved => "PRINCIPAL_RESOLVED",
            Self::SignatureExtracted => "SIGNATURE_EXTRACTED",
            Self::SignatureVerified => "SIGNATURE_VERIFIED",
        }
    }
}

impl fmt::Display for AuthStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticates requests against a credential directory.
///
/// The authenticator only holds a handle to the directory, so a single
/// instance can be shared across any number of concurrent requests.
#[derive(Clone)]
pub struct Authenticator {
    directory: Arc<dyn Directory>,
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("directory", &"...")
            .finish()
    }
}

impl Authenticator {
    /// Create an authenticator backed by `directory`.
    #[must_use]
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self { directory }
    }

    /// Resolve the principal named by the `Key` header.
    ///
    /// # Errors
    ///
    /// - [`FailureReason::MissingKey`] if the header is absent
    /// - [`FailureReason::InvalidKey`] if no credential matches, or the key is
    ///   not text
    /// - [`AuthError::DirectoryUnavailable`] if the lookup itself failed
    pub fn get_user<R: HeaderSource + ?Sized>(&self, request: &R) -> Result<Principal, AuthError> {
        self.resolve_credential(request).map(|credential| credential.owner)
    }

    /// Extract the raw bytes of the `Signature` header.
    ///
    /// No decoding is performed; the bytes are returned as received.
    ///
    /// # Errors
    ///
    /// - [`FailureReason::MissingSignature`] if the header is absent
    /// - [`FailureReason::InvalidSignatureEncoding`] if the value is text,
    ///   whatever its content
    pub fn get_signature<R: HeaderSource + ?Sized>(request: &R) -> Result<Signature, AuthError> {
        match request.header(SIGNATURE_HEADER) {
            None => Err(FailureReason::MissingSignature.into()),
            Some(HeaderField::Text(_)) => Err(FailureReason::InvalidSignatureEncoding.into()),
            Some(HeaderField::Binary(bytes)) => Ok(Signature::new(bytes)),
        }
    }

    /// Authenticate a request end to end.
    ///
    /// 1. Resolve the principal and its credential from the `Key` header
    /// 2. Extract the supplied signature
    /// 3. Recompute the expected signature over the canonical body
    /// 4. Compare both in constant time
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`Self::get_user`] and [`Self::get_signature`],
    /// returns [`AuthError::Encoding`] if the body cannot be canonicalized, and
    /// [`FailureReason::SignatureMismatch`] if the signatures differ.
    pub fn authenticate<R: HeaderSource + BodySource + ?Sized>(
        &self,
        request: &R,
    ) -> Result<Principal, AuthError> {
        let credential = self.resolve_credential(request)?;
        debug!(
            principal = %credential.owner,
            stage = %AuthStage::PrincipalResolved,
            "resolved principal"
        );

        let supplied = Self::get_signature(request)?;
        debug!(
            principal = %credential.owner,
            stage = %AuthStage::SignatureExtracted,
            len = supplied.len(),
            "extracted signature"
        );

        let (expected, _message) = Signer::new(credential.secret).calc_signature(request)?;

        if expected.verify(supplied.as_bytes()) {
            debug!(
                principal = %credential.owner,
                stage = %AuthStage::SignatureVerified,
                "signature verification succeeded"
            );
            Ok(credential.owner)
        } else {
            debug!(principal = %credential.owner, "signature mismatch");
            Err(FailureReason::SignatureMismatch.into())
        }
    }

    fn resolve_credential<R: HeaderSource + ?Sized>(
        &self,
        request: &R,
    ) -> Result<Credential, AuthError> {
        let key = match request.header(KEY_HEADER) {
            None => return Err(FailureReason::MissingKey.into()),
            Some(HeaderField::Text(key)) => key,
            Some(HeaderField::Binary(_)) => {
                debug!("key header is not text");
                return Err(FailureReason::InvalidKey.into());
            }
        };
        debug!(key, stage = %AuthStage::KeyExtracted, "extracted key");

        match self.directory.find_credential_by_key(key) {
            Ok(Some(credential)) => Ok(credential),
            Ok(None) => {
                debug!(key, "no credential for key");
                Err(FailureReason::InvalidKey.into())
            }
            Err(err) => {
                warn!(key, error = %err, "credential lookup failed");
                Err(AuthError::DirectoryUnavailable(err.to_string()))
            }
        }
    }
}
