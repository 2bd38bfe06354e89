//! Principal and credential types.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::RngExt;

/// Number of random bytes behind a generated access key (40 hex characters).
const GENERATED_KEY_BYTES: usize = 20;

/// Number of random bytes behind a generated secret (64 hex characters).
const GENERATED_SECRET_BYTES: usize = 32;

/// The authenticated identity returned on successful verification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Principal(String);

impl Principal {
    /// Create a principal from its name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the principal name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Public key identifier sent by clients in the `Key` header.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct AccessKey(String);

impl AccessKey {
    /// Create an access key from its text form.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Generate a random access key of 40 lowercase hex characters.
    #[must_use]
    pub fn generate() -> Self {
        Self(random_hex::<GENERATED_KEY_BYTES>())
    }

    /// Get the access key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Private signing secret. Never transmitted and never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    /// Create a secret from raw bytes.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Generate a random secret.
    ///
    /// The secret is the ASCII text of 64 lowercase hex characters, so it can be
    /// handed to clients as a plain string and used verbatim as HMAC key bytes.
    #[must_use]
    pub fn generate() -> Self {
        Self(random_hex::<GENERATED_SECRET_BYTES>().into_bytes())
    }

    /// Expose the secret bytes for signing.
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

impl From<&str> for SecretKey {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<String> for SecretKey {
    fn from(s: String) -> Self {
        Self(s.into_bytes())
    }
}

impl From<Vec<u8>> for SecretKey {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// The (key, secret) pair bound to exactly one principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// The principal that owns this credential.
    pub owner: Principal,
    /// Public key identifier, unique across principals.
    pub key: AccessKey,
    /// Private secret used to compute and verify signatures.
    pub secret: SecretKey,
    /// When the credential was provisioned.
    pub created_at: DateTime<Utc>,
}

impl Credential {
    /// Create a credential for `owner` with an explicit key and secret.
    #[must_use]
    pub fn new(owner: Principal, key: AccessKey, secret: SecretKey) -> Self {
        Self {
            owner,
            key,
            secret,
            created_at: Utc::now(),
        }
    }

    /// Create a credential for `owner` with a freshly generated key and secret.
    #[must_use]
    pub fn generate(owner: Principal) -> Self {
        Self::new(owner, AccessKey::generate(), SecretKey::generate())
    }
}

fn random_hex<const N: usize>() -> String {
    let mut rng = rand::rng();
    let mut buf = [0u8; N];
    rng.fill(&mut buf[..]);
    hex::encode(buf)
}
