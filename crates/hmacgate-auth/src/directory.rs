//! Credential directory trait.
//!
//! The authenticator depends on a single read operation: find the credential
//! bound to a public key. Implementations may back this with a database, a
//! configuration file, or the in-memory [`PrincipalStore`].

use hmacgate_core::{Credential, PrincipalStore};

/// Infrastructure failure while querying a directory.
///
/// A key that simply does not exist is not an error; it is `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    /// The backing store could not be reached or answered inconsistently.
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

/// Trait for looking up credentials by public key.
pub trait Directory: Send + Sync {
    /// Find the credential whose key is `key`.
    ///
    /// The returned key and secret must come from one consistent read.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Unavailable`] if the lookup itself failed.
    fn find_credential_by_key(&self, key: &str) -> Result<Option<Credential>, DirectoryError>;
}

impl Directory for PrincipalStore {
    fn find_credential_by_key(&self, key: &str) -> Result<Option<Credential>, DirectoryError> {
        Ok(self.lookup(key))
    }
}
