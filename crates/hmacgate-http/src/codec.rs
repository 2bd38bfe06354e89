//! Header transport encoding.
//!
//! HTTP header values are octet strings, but control bytes cannot appear in
//! them, so a raw HMAC cannot be sent verbatim. Byte sequences travel in the
//! RFC 8941 form:
//!
//! ```text
//! Signature: :3q2+7w==:
//! ```
//!
//! Decoding rules for an incoming header value:
//!
//! 1. `:<base64>:` with valid base64 is a byte sequence (the decoded bytes)
//! 2. visible ASCII text is text
//! 3. anything else (obs-text octets) is a byte sequence of the raw octets
//!
//! A plain-text `Signature` is thus surfaced as text and rejected by the
//! authenticator, whatever it contains.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmacgate_auth::{HeaderField, Signature};
use hmacgate_core::AccessKey;
use http::header::InvalidHeaderValue;
use http::{HeaderMap, HeaderName, HeaderValue};

/// Wire name of the access key header.
pub static KEY_HEADER_NAME: HeaderName = HeaderName::from_static("key");

/// Wire name of the signature header.
pub static SIGNATURE_HEADER_NAME: HeaderName = HeaderName::from_static("signature");

/// An owned, decoded header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireField {
    /// A textual value.
    Text(String),
    /// A byte sequence.
    Binary(Vec<u8>),
}

impl WireField {
    /// Borrow as the authenticator's header view.
    #[must_use]
    pub fn as_field(&self) -> HeaderField<'_> {
        match self {
            Self::Text(s) => HeaderField::Text(s),
            Self::Binary(b) => HeaderField::Binary(b),
        }
    }
}

/// Decode a header value into text or bytes.
#[must_use]
pub fn decode_header_value(value: &HeaderValue) -> WireField {
    let raw = value.as_bytes().trim_ascii();

    if let Some(inner) = raw
        .strip_prefix(b":")
        .and_then(|rest| rest.strip_suffix(b":"))
    {
        if let Ok(bytes) = BASE64.decode(inner) {
            return WireField::Binary(bytes);
        }
    }

    match value.to_str() {
        Ok(text) => WireField::Text(text.to_owned()),
        Err(_) => WireField::Binary(value.as_bytes().to_vec()),
    }
}

/// Encode a signature as an RFC 8941 byte sequence header value.
///
/// # Examples
///
/// ```
/// use hmacgate_auth::Signature;
/// use hmacgate_http::codec::encode_signature;
///
/// let value = encode_signature(&Signature::new(b"invalid".to_vec()));
/// assert_eq!(value, ":aW52YWxpZA==:");
/// ```
#[must_use]
pub fn encode_signature(signature: &Signature) -> HeaderValue {
    let encoded = format!(":{}:", BASE64.encode(signature.as_bytes()));
    HeaderValue::try_from(encoded).expect("base64 byte sequence is a valid header value")
}

/// Set the `Key` and `Signature` headers on an outgoing request.
///
/// # Errors
///
/// Returns [`InvalidHeaderValue`] if the access key contains characters that
/// cannot appear in a header.
pub fn sign_headers(
    headers: &mut HeaderMap,
    key: &AccessKey,
    signature: &Signature,
) -> Result<(), InvalidHeaderValue> {
    headers.insert(&KEY_HEADER_NAME, HeaderValue::from_str(key.as_str())?);
    headers.insert(&SIGNATURE_HEADER_NAME, encode_signature(signature));
    Ok(())
}
