//! Request capability traits.
//!
//! The authenticator never sees a concrete HTTP type. It reads headers through
//! [`HeaderSource`] and the signed body through [`BodySource`]; each request
//! abstraction implements both. [`AuthRequest`] is an owned in-memory request
//! for clients and tests.

use std::collections::HashMap;

/// A typed header value.
///
/// Text and byte sequences are kept apart so a signature can never be
/// compared in its textual form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField<'a> {
    /// A textual value, such as an access key.
    Text(&'a str),
    /// A raw byte sequence, such as a signature.
    Binary(&'a [u8]),
}

/// Read access to request headers.
pub trait HeaderSource {
    /// Look up a header by name. Names are matched case-insensitively.
    fn header(&self, name: &str) -> Option<HeaderField<'_>>;
}

/// Read access to the request body that is signed.
pub trait BodySource {
    /// The raw body bytes as received.
    fn body(&self) -> &[u8];
}

impl<T: HeaderSource + ?Sized> HeaderSource for &T {
    fn header(&self, name: &str) -> Option<HeaderField<'_>> {
        (**self).header(name)
    }
}

impl<T: BodySource + ?Sized> BodySource for &T {
    fn body(&self) -> &[u8] {
        (**self).body()
    }
}

impl BodySource for [u8] {
    fn body(&self) -> &[u8] {
        self
    }
}

impl BodySource for Vec<u8> {
    fn body(&self) -> &[u8] {
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum OwnedField {
    Text(String),
    Binary(Vec<u8>),
}

/// An owned request: a header map plus a body.
///
/// # Examples
///
/// ```
/// use hmacgate_auth::{AuthRequest, HeaderField, HeaderSource};
///
/// let request = AuthRequest::new(b"{}".to_vec())
///     .with_text_header("Key", "abc")
///     .with_binary_header("Signature", b"raw".to_vec());
///
/// assert_eq!(request.header("key"), Some(HeaderField::Text("abc")));
/// assert_eq!(request.header("SIGNATURE"), Some(HeaderField::Binary(b"raw")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthRequest {
    headers: HashMap<String, OwnedField>,
    body: Vec<u8>,
}

impl AuthRequest {
    /// Create a request with the given body and no headers.
    #[must_use]
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Add a textual header, replacing any header of the same name.
    #[must_use]
    pub fn with_text_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.to_ascii_lowercase(), OwnedField::Text(value.into()));
        self
    }

    /// Add a byte-sequence header, replacing any header of the same name.
    #[must_use]
    pub fn with_binary_header(mut self, name: &str, value: impl Into<Vec<u8>>) -> Self {
        self.headers
            .insert(name.to_ascii_lowercase(), OwnedField::Binary(value.into()));
        self
    }
}

impl HeaderSource for AuthRequest {
    fn header(&self, name: &str) -> Option<HeaderField<'_>> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|field| match field {
                OwnedField::Text(s) => HeaderField::Text(s),
                OwnedField::Binary(b) => HeaderField::Binary(b),
            })
    }
}

impl BodySource for AuthRequest {
    fn body(&self) -> &[u8] {
        &self.body
    }
}
