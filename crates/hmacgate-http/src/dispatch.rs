//! Protected handler trait and dispatch.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use hmacgate_core::Principal;

use crate::error::GatewayError;
use crate::response::GatewayBody;

/// Boxed future returned by [`ProtectedHandler::handle`].
pub type HandlerFuture =
    Pin<Box<dyn Future<Output = Result<http::Response<GatewayBody>, GatewayError>> + Send>>;

/// Business logic behind the authentication gate.
///
/// The handler is only invoked for requests whose signature verified. It
/// receives the authenticated principal, the request head and the raw body,
/// and returns a complete HTTP response. The head carries the gateway's
/// `x-request-id`.
pub trait ProtectedHandler: Send + Sync + 'static {
    /// Handle an authenticated request.
    fn handle(
        &self,
        principal: Principal,
        parts: http::request::Parts,
        body: Bytes,
    ) -> HandlerFuture;
}

/// Dispatch an authenticated request to the handler.
pub async fn dispatch_request<H: ProtectedHandler>(
    handler: &H,
    principal: Principal,
    parts: http::request::Parts,
    body: Bytes,
) -> Result<http::Response<GatewayBody>, GatewayError> {
    tracing::debug!(
        %principal,
        method = %parts.method,
        path = %parts.uri.path(),
        "dispatching authenticated request"
    );
    handler.handle(principal, parts, body).await
}
