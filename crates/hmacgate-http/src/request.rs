//! Authentication view over an HTTP request.

use std::collections::HashMap;

use hmacgate_auth::{BodySource, HeaderField, HeaderSource};
use http::HeaderMap;

use crate::codec::{WireField, decode_header_value};

/// Read-only view of an HTTP request for the authenticator.
///
/// Header values are decoded once at construction with
/// [`decode_header_value`]. When a header repeats, its first value is used.
#[derive(Debug)]
pub struct HttpAuthRequest<'a> {
    fields: HashMap<String, WireField>,
    body: &'a [u8],
}

impl<'a> HttpAuthRequest<'a> {
    /// Build the view from request headers and the collected body.
    #[must_use]
    pub fn new(headers: &HeaderMap, body: &'a [u8]) -> Self {
        let mut fields = HashMap::with_capacity(headers.keys_len());
        for (name, value) in headers {
            fields
                .entry(name.as_str().to_owned())
                .or_insert_with(|| decode_header_value(value));
        }
        Self { fields, body }
    }
}

impl HeaderSource for HttpAuthRequest<'_> {
    fn header(&self, name: &str) -> Option<HeaderField<'_>> {
        self.fields
            .get(&name.to_ascii_lowercase())
            .map(WireField::as_field)
    }
}

impl BodySource for HttpAuthRequest<'_> {
    fn body(&self) -> &[u8] {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;

    use super::*;

    #[test]
    fn test_should_expose_key_as_text_and_signature_as_bytes() {
        let mut headers = HeaderMap::new();
        headers.insert("key", HeaderValue::from_static("bob-key"));
        headers.insert("signature", HeaderValue::from_static(":aW52YWxpZA==:"));

        let request = HttpAuthRequest::new(&headers, b"{}");
        assert_eq!(request.header("Key"), Some(HeaderField::Text("bob-key")));
        assert_eq!(
            request.header("Signature"),
            Some(HeaderField::Binary(b"invalid"))
        );
        assert_eq!(request.body(), b"{}");
    }

    #[test]
    fn test_should_use_first_value_of_repeated_header() {
        let mut headers = HeaderMap::new();
        headers.append("key", HeaderValue::from_static("first"));
        headers.append("key", HeaderValue::from_static("second"));

        let request = HttpAuthRequest::new(&headers, b"");
        assert_eq!(request.header("key"), Some(HeaderField::Text("first")));
    }

    #[test]
    fn test_should_return_none_for_absent_header() {
        let request = HttpAuthRequest::new(&HeaderMap::new(), b"");
        assert!(request.header("Signature").is_none());
    }
}
