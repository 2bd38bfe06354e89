//! Concurrent principal and credential storage.
//!
//! [`PrincipalStore`] keeps two `DashMap` indexes: access key to credential
//! and principal to access key. Mutations always take the principal index
//! first and the key index second, so both indexes stay consistent without a
//! global lock.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::types::{AccessKey, Credential, Principal, SecretKey};

/// Thread-safe, in-memory credential directory.
///
/// Each principal owns at most one credential and each access key belongs to
/// at most one principal.
///
/// # Examples
///
/// ```
/// use hmacgate_core::{Principal, PrincipalStore};
///
/// let store = PrincipalStore::new();
/// let bob = Principal::new("bob");
/// let credential = store.provision(&bob);
///
/// let found = store.lookup(credential.key.as_str()).unwrap();
/// assert_eq!(found.owner, bob);
/// ```
#[derive(Debug, Default)]
pub struct PrincipalStore {
    by_key: DashMap<String, Credential>,
    by_principal: DashMap<Principal, AccessKey>,
}

impl PrincipalStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the credential for `principal`, generating one on first access.
    pub fn provision(&self, principal: &Principal) -> Credential {
        match self.by_principal.entry(principal.clone()) {
            Entry::Occupied(mut entry) => {
                if let Some(existing) = self.by_key.get(entry.get().as_str()) {
                    return existing.value().clone();
                }
                let credential = self.insert_generated(principal);
                entry.insert(credential.key.clone());
                credential
            }
            Entry::Vacant(entry) => {
                let credential = self.insert_generated(principal);
                entry.insert(credential.key.clone());
                credential
            }
        }
    }

    /// Install an explicit credential for `principal`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PrincipalExists`] if the principal already has a
    /// credential, or [`CoreError::DuplicateKey`] if the key is taken.
    pub fn register(
        &self,
        principal: Principal,
        key: AccessKey,
        secret: SecretKey,
    ) -> CoreResult<Credential> {
        let Entry::Vacant(principal_slot) = self.by_principal.entry(principal.clone()) else {
            return Err(CoreError::PrincipalExists(principal.to_string()));
        };

        match self.by_key.entry(key.as_str().to_owned()) {
            Entry::Occupied(_) => Err(CoreError::DuplicateKey(key.to_string())),
            Entry::Vacant(key_slot) => {
                let credential = Credential::new(principal, key, secret);
                key_slot.insert(credential.clone());
                principal_slot.insert(credential.key.clone());
                debug!(principal = %credential.owner, key = %credential.key, "registered credential");
                Ok(credential)
            }
        }
    }

    /// Find the credential bound to `key`.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<Credential> {
        self.by_key.get(key).map(|c| c.value().clone())
    }

    /// Find the credential owned by `principal`.
    #[must_use]
    pub fn credential_for(&self, principal: &Principal) -> Option<Credential> {
        let key = self.by_principal.get(principal)?.value().clone();
        self.lookup(key.as_str())
    }

    /// Remove the principal and its credential.
    pub fn remove(&self, principal: &Principal) -> Option<Credential> {
        let (_, key) = self.by_principal.remove(principal)?;
        self.by_key.remove(key.as_str()).map(|(_, c)| c)
    }

    /// Remove every principal and credential.
    pub fn reset(&self) {
        self.by_principal.clear();
        self.by_key.clear();
    }

    /// Number of stored credentials.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Generate a credential with a key not yet present in the key index.
    fn insert_generated(&self, principal: &Principal) -> Credential {
        loop {
            let credential = Credential::generate(principal.clone());
            if let Entry::Vacant(slot) = self.by_key.entry(credential.key.as_str().to_owned()) {
                slot.insert(credential.clone());
                debug!(principal = %credential.owner, key = %credential.key, "provisioned credential");
                return credential;
            }
        }
    }
}
