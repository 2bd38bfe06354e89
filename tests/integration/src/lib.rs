//! End-to-end tests for the hmacgate HTTP gateway.
//!
//! Each test spawns an in-process gateway on an ephemeral port and talks to
//! it over real HTTP with `reqwest`:
//!
//! ```text
//! cargo test -p hmacgate-integration
//! ```

use std::net::SocketAddr;
use std::sync::{Arc, Once};

use bytes::Bytes;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;

use hmacgate_auth::Signer;
use hmacgate_core::{AccessKey, Credential, Principal, PrincipalStore, SecretKey};
use hmacgate_http::dispatch::{HandlerFuture, ProtectedHandler};
use hmacgate_http::response::json_response;
use hmacgate_http::{GatewayError, GatewayHttpConfig, GatewayHttpService, sign_headers};

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Handler answering `{"principal": <name>, "data": <payload>}`.
#[derive(Debug)]
struct WhoAmIHandler;

impl ProtectedHandler for WhoAmIHandler {
    fn handle(
        &self,
        principal: Principal,
        _parts: http::request::Parts,
        body: Bytes,
    ) -> HandlerFuture {
        Box::pin(async move {
            let data: serde_json::Value = if body.is_empty() {
                serde_json::json!({})
            } else {
                match serde_json::from_slice(&body) {
                    Ok(data) => data,
                    Err(e) => {
                        return Err(GatewayError::BadRequest(format!("Invalid JSON body: {e}")));
                    }
                }
            };
            let json = serde_json::json!({ "principal": principal.as_str(), "data": data });
            Ok(json_response(json.to_string().into_bytes(), ""))
        })
    }
}

/// A gateway running in the background of the current test.
#[derive(Debug)]
pub struct TestGateway {
    /// Address the gateway listens on.
    pub addr: SocketAddr,
    /// Store backing the gateway's directory.
    pub store: Arc<PrincipalStore>,
}

impl TestGateway {
    /// URL for `path` on this gateway.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Register an explicit credential.
    pub fn register(&self, principal: &str, key: &str, secret: &str) -> Credential {
        self.store
            .register(
                Principal::new(principal),
                AccessKey::new(key),
                SecretKey::from(secret),
            )
            .unwrap_or_else(|e| panic!("failed to register {principal}: {e}"))
    }
}

/// Spawn a gateway on an ephemeral local port.
pub async fn spawn_gateway() -> TestGateway {
    init_tracing();

    let store = Arc::new(PrincipalStore::new());
    let config = GatewayHttpConfig::new(store.clone());
    let service = GatewayHttpService::new(Arc::new(WhoAmIHandler), config);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind ephemeral port");
    let addr = listener.local_addr().expect("listener has a local address");

    tokio::spawn(async move {
        let http = HttpConnBuilder::new(TokioExecutor::new());
        while let Ok((stream, _)) = listener.accept().await {
            let conn = http
                .serve_connection(TokioIo::new(stream), service.clone())
                .into_owned();
            tokio::spawn(async move {
                let _ = conn.await;
            });
        }
    });

    TestGateway { addr, store }
}

/// Build `Key` and `Signature` headers signing `body` with `secret`.
#[must_use]
pub fn signed_headers(key: &str, secret: &str, body: &[u8]) -> reqwest::header::HeaderMap {
    let (signature, _) = Signer::new(secret)
        .calc_signature(body)
        .expect("test payloads are valid JSON");
    let mut headers = reqwest::header::HeaderMap::new();
    sign_headers(&mut headers, &AccessKey::new(key), &signature).expect("valid access key");
    headers
}

mod test_auth;
mod test_transport;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_should_reject_unparseable_body_in_handler() {
        let (parts, ()) = http::Request::builder()
            .uri("/")
            .body(())
            .unwrap()
            .into_parts();

        let result = WhoAmIHandler
            .handle(Principal::new("bob"), parts, Bytes::from_static(b"not json"))
            .await;

        assert!(matches!(result, Err(GatewayError::BadRequest(_))));
    }
}
