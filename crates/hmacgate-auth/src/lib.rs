//! HMAC request signing and principal authentication for hmacgate.
//!
//! This crate implements both sides of the protocol: a [`Signer`] that turns a
//! secret and a request body into an HMAC-SHA256 signature, and an
//! [`Authenticator`] that resolves the caller from the `Key` header, recomputes
//! the signature, and compares it against the `Signature` header in constant
//! time.
//!
//! # Overview
//!
//! ```text
//! get_user ──► Directory::find_credential_by_key
//!    │
//! get_signature ──► raw signature bytes
//!    │
//! Signer::calc_signature ──► canonical body ──► HMAC-SHA256(secret, message)
//!    │
//! constant-time compare ──► Ok(Principal) | Err(AuthError)
//! ```
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use hmacgate_auth::{AuthRequest, Authenticator, Signer};
//! use hmacgate_core::{Principal, PrincipalStore};
//!
//! let store = Arc::new(PrincipalStore::new());
//! let credential = store.provision(&Principal::new("bob"));
//!
//! let body = br#"{"foo": "bar"}"#.to_vec();
//! let (signature, _message) = Signer::new(credential.secret.clone())
//!     .calc_signature(&AuthRequest::new(body.clone()))
//!     .unwrap();
//!
//! let request = AuthRequest::new(body)
//!     .with_text_header("Key", credential.key.as_str())
//!     .with_binary_header("Signature", signature.into_bytes());
//!
//! let authenticator = Authenticator::new(store);
//! assert_eq!(authenticator.authenticate(&request).unwrap(), Principal::new("bob"));
//! ```
//!
//! # Modules
//!
//! - [`authenticator`] - Principal resolution and signature verification
//! - [`canonical`] - Canonical JSON message construction
//! - [`directory`] - Credential directory trait
//! - [`error`] - Authentication error types
//! - [`request`] - Header and body capability traits
//! - [`signer`] - HMAC-SHA256 signature computation

pub mod authenticator;
pub mod canonical;
pub mod directory;
pub mod error;
pub mod request;
pub mod signer;

pub use authenticator::{AuthStage, Authenticator, KEY_HEADER, SIGNATURE_HEADER};
pub use directory::{Directory, DirectoryError};
pub use error::{AuthError, FailureReason};
pub use request::{AuthRequest, BodySource, HeaderField, HeaderSource};
pub use signer::{Signature, Signer};
