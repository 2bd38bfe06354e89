//! The gateway HTTP service implementing hyper's `Service` trait.
//!
//! [`GatewayHttpService`] runs every request through:
//!
//! 1. Health check interception (`GET /_health`, `GET /health`)
//! 2. Size-limited body collection
//! 3. HMAC authentication of the `Key` and `Signature` headers
//! 4. Dispatch to the [`ProtectedHandler`]
//! 5. Common response headers (`x-request-id`, `server`)

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http_body::Body;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use tracing::{info, warn};
use uuid::Uuid;

use hmacgate_auth::{Authenticator, Directory};
use hmacgate_core::Principal;

use crate::dispatch::{ProtectedHandler, dispatch_request};
use crate::error::GatewayError;
use crate::request::HttpAuthRequest;
use crate::response::{GatewayBody, REQUEST_ID_HEADER, error_to_response};

/// Default maximum request body size (1 MiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Configuration for the gateway HTTP service.
#[derive(Clone)]
pub struct GatewayHttpConfig {
    /// Maximum accepted request body size in bytes.
    pub max_body_size: usize,
    /// Directory used to resolve access keys.
    pub directory: Arc<dyn Directory>,
}

impl std::fmt::Debug for GatewayHttpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayHttpConfig")
            .field("max_body_size", &self.max_body_size)
            .field("directory", &"...")
            .finish()
    }
}

impl GatewayHttpConfig {
    /// Create a configuration with the default body limit.
    #[must_use]
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self {
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            directory,
        }
    }

    /// Override the body size limit.
    #[must_use]
    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }
}

/// Hyper `Service` implementation guarding a [`ProtectedHandler`].
#[derive(Debug)]
pub struct GatewayHttpService<H: ProtectedHandler> {
    handler: Arc<H>,
    authenticator: Authenticator,
    config: Arc<GatewayHttpConfig>,
}

impl<H: ProtectedHandler> GatewayHttpService<H> {
    /// Create a new `GatewayHttpService`.
    pub fn new(handler: Arc<H>, config: GatewayHttpConfig) -> Self {
        let authenticator = Authenticator::new(Arc::clone(&config.directory));
        Self {
            handler,
            authenticator,
            config: Arc::new(config),
        }
    }
}

impl<H: ProtectedHandler> Clone for GatewayHttpService<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            authenticator: self.authenticator.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<H, B> hyper::service::Service<http::Request<B>> for GatewayHttpService<H>
where
    H: ProtectedHandler,
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    type Response = http::Response<GatewayBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        let handler = Arc::clone(&self.handler);
        let authenticator = self.authenticator.clone();
        let config = Arc::clone(&self.config);
        let request_id = Uuid::new_v4().to_string();
        let request_id_value = http::HeaderValue::from_str(&request_id)
            .expect("a UUID is a valid header value");

        Box::pin(async move {
            let response = process_request(
                req,
                handler.as_ref(),
                &authenticator,
                &config,
                &request_id,
                &request_id_value,
            )
            .await;
            Ok(add_common_headers(response, request_id_value))
        })
    }
}

/// Process a single request through the full pipeline.
async fn process_request<H, B>(
    req: http::Request<B>,
    handler: &H,
    authenticator: &Authenticator,
    config: &GatewayHttpConfig,
    request_id: &str,
    request_id_value: &http::HeaderValue,
) -> http::Response<GatewayBody>
where
    H: ProtectedHandler,
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let (mut parts, incoming) = req.into_parts();

    if is_health_check(&parts.method, parts.uri.path()) {
        return health_check_response();
    }

    let body = match collect_body(incoming, config.max_body_size).await {
        Ok(body) => body,
        Err(err) => return error_to_response(&err, request_id),
    };

    let principal = match authenticate(authenticator, &parts.headers, &body, request_id) {
        Ok(principal) => principal,
        Err(err) => return error_to_response(&err, request_id),
    };

    info!(%principal, request_id, "request authenticated");

    parts
        .headers
        .insert(REQUEST_ID_HEADER, request_id_value.clone());

    match dispatch_request(handler, principal, parts, body).await {
        Ok(response) => response,
        Err(err) => error_to_response(&err, request_id),
    }
}

/// Run the authenticator over the request headers and body.
fn authenticate(
    authenticator: &Authenticator,
    headers: &http::HeaderMap,
    body: &[u8],
    request_id: &str,
) -> Result<Principal, GatewayError> {
    let request = HttpAuthRequest::new(headers, body);
    authenticator.authenticate(&request).map_err(|err| {
        match err.reason() {
            Some(reason) => warn!(
                %reason,
                stage = %reason.stage(),
                request_id,
                "authentication failed"
            ),
            None => warn!(error = %err, request_id, "authentication failed"),
        }
        GatewayError::from(err)
    })
}

/// Collect the body into a single buffer, enforcing the size limit.
async fn collect_body<B>(incoming: B, limit: usize) -> Result<Bytes, GatewayError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    Limited::new(incoming, limit)
        .collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .map_err(|e| {
            if e.is::<LengthLimitError>() {
                GatewayError::PayloadTooLarge { limit }
            } else {
                GatewayError::BadRequest(format!("Failed to read request body: {e}"))
            }
        })
}

/// Check if the request is a health check probe.
fn is_health_check(method: &http::Method, path: &str) -> bool {
    *method == http::Method::GET && (path == "/_health" || path == "/health")
}

/// Produce a health check response.
fn health_check_response() -> http::Response<GatewayBody> {
    http::Response::builder()
        .status(http::StatusCode::OK)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from_static(br#"{"status":"running"}"#)))
        .expect("static health response should be valid")
}

/// Add common response headers to every response.
fn add_common_headers(
    mut response: http::Response<GatewayBody>,
    request_id: http::HeaderValue,
) -> http::Response<GatewayBody> {
    let headers = response.headers_mut();
    headers.insert(REQUEST_ID_HEADER, request_id);
    headers.insert("server", http::HeaderValue::from_static("hmacgate"));

    response
}
