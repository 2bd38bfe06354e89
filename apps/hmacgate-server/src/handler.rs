//! Echo handler behind the authentication gate.

use bytes::Bytes;

use hmacgate_core::Principal;
use hmacgate_http::GatewayError;
use hmacgate_http::dispatch::{HandlerFuture, ProtectedHandler};
use hmacgate_http::response::{REQUEST_ID_HEADER, json_response};

/// Header naming the principal that signed the request.
pub const PRINCIPAL_HEADER: &str = "x-authenticated-principal";

/// Handler that returns the authenticated JSON payload.
///
/// An empty body is answered with `{}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoHandler;

impl ProtectedHandler for EchoHandler {
    fn handle(
        &self,
        principal: Principal,
        parts: http::request::Parts,
        body: Bytes,
    ) -> HandlerFuture {
        Box::pin(async move {
            let request_id = parts
                .headers
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_owned();
            echo(&principal, &body, &request_id)
        })
    }
}

fn echo(
    principal: &Principal,
    body: &[u8],
    request_id: &str,
) -> Result<http::Response<hmacgate_http::GatewayBody>, GatewayError> {
    let data: serde_json::Value = if body.trim_ascii().is_empty() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        serde_json::from_slice(body)
            .map_err(|e| GatewayError::BadRequest(format!("Invalid JSON body: {e}")))?
    };
    let json = serde_json::to_vec(&data).map_err(|e| GatewayError::Internal(e.to_string()))?;

    let mut response = json_response(json, request_id);
    let principal_value = http::HeaderValue::from_str(principal.as_str())
        .map_err(|e| GatewayError::Internal(e.to_string()))?;
    response.headers_mut().insert(PRINCIPAL_HEADER, principal_value);
    Ok(response)
}
