//! JSON response construction and error formatting.

use bytes::Bytes;
use http_body_util::Full;

use crate::error::GatewayError;

/// Body of every gateway response. Responses are small JSON documents that
/// are always fully buffered.
pub type GatewayBody = Full<Bytes>;

/// Content type for gateway JSON responses.
pub const CONTENT_TYPE: &str = "application/json";

/// Header carrying the per-request identifier.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Serialize a gateway error into a JSON response body.
///
/// ```json
/// {"detail":"Incorrect authentication credentials."}
/// ```
#[must_use]
pub fn error_to_json(error: &GatewayError) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({ "detail": error.to_string() }))
        .expect("JSON serialization of error cannot fail")
}

/// Convert a `GatewayError` into a complete HTTP error response.
#[must_use]
pub fn error_to_response(error: &GatewayError, request_id: &str) -> http::Response<GatewayBody> {
    let body = Full::new(Bytes::from(error_to_json(error)));

    http::Response::builder()
        .status(error.status_code())
        .header("content-type", CONTENT_TYPE)
        .header(REQUEST_ID_HEADER, request_id)
        .body(body)
        .expect("valid error response")
}

/// Build a success response from JSON bytes.
#[must_use]
pub fn json_response(json: Vec<u8>, request_id: &str) -> http::Response<GatewayBody> {
    http::Response::builder()
        .status(http::StatusCode::OK)
        .header("content-type", CONTENT_TYPE)
        .header(REQUEST_ID_HEADER, request_id)
        .body(Full::new(Bytes::from(json)))
        .expect("valid JSON response")
}
