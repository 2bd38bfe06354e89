//! HMAC-SHA256 signature computation.
//!
//! The signature of a request is `HMAC-SHA256(secret, message)`, where
//! `message` is the canonical form of the request body (see
//! [`crate::canonical`]). The digest is fixed; there is no negotiation.

use std::fmt;

use hmac::{Hmac, KeyInit, Mac};
use hmacgate_core::SecretKey;
use serde::Serialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::canonical::{canonicalize_body, canonicalize_serializable};
use crate::error::AuthError;
use crate::request::BodySource;

type HmacSha256 = Hmac<Sha256>;

/// A signature as raw bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature(Vec<u8>);

impl Signature {
    /// Wrap raw signature bytes.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Borrow the raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the signature, returning the raw bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the signature is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compare against supplied bytes without short-circuiting on the first
    /// differing byte.
    #[must_use]
    pub fn verify(&self, supplied: &[u8]) -> bool {
        self.0.as_slice().ct_eq(supplied).into()
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({} bytes)", self.0.len())
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Computes request signatures with one secret.
///
/// # Examples
///
/// ```
/// use hmacgate_auth::{AuthRequest, Signer};
///
/// let signer = Signer::new("secret");
/// let (signature, message) = signer
///     .calc_signature(&AuthRequest::new(br#"{"foo": "bar"}"#.to_vec()))
///     .unwrap();
///
/// assert_eq!(message, br#"{"foo":"bar"}"#);
/// assert_eq!(signature.len(), 32);
/// ```
#[derive(Clone)]
pub struct Signer {
    secret: SecretKey,
}

impl Signer {
    /// Create a signer for `secret`.
    #[must_use]
    pub fn new(secret: impl Into<SecretKey>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Sign a request body.
    ///
    /// Returns the signature and the exact canonical message that was signed.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Encoding`] if the body is not valid JSON.
    pub fn calc_signature<R: BodySource + ?Sized>(
        &self,
        request: &R,
    ) -> Result<(Signature, Vec<u8>), AuthError> {
        let message = canonicalize_body(request.body())?;
        Ok((self.sign_message(&message), message))
    }

    /// Sign a serializable payload the way its JSON body would be signed.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Encoding`] if the payload has no JSON form.
    pub fn sign_value<T: Serialize + ?Sized>(
        &self,
        value: &T,
    ) -> Result<(Signature, Vec<u8>), AuthError> {
        let message = canonicalize_serializable(value)?;
        Ok((self.sign_message(&message), message))
    }

    /// Compute the HMAC of an already canonical message.
    #[must_use]
    pub fn sign_message(&self, message: &[u8]) -> Signature {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose())
            .expect("HMAC can accept keys of any length");
        mac.update(message);
        Signature(mac.finalize().into_bytes().to_vec())
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer").finish_non_exhaustive()
    }
}
