//! hmacgate server - HMAC-authenticated JSON gateway.
//!
//! Every request must carry a `Key` header naming an access key and a
//! `Signature` header holding the HMAC-SHA256 of the canonical JSON body,
//! sent as an RFC 8941 byte sequence (`:<base64>:`). Authenticated requests
//! are echoed back; everything else is answered with `403 Forbidden`.
//!
//! # Usage
//!
//! ```text
//! ACCESS_KEY=bob-key SECRET_KEY=bob-secret PRINCIPAL=bob hmacgate-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GATEWAY_LISTEN` | `0.0.0.0:8000` | Bind address |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |
//! | `MAX_BODY_SIZE` | `1048576` | Maximum request body in bytes |
//! | `PRINCIPAL` | `admin` | Owner of the `ACCESS_KEY` / `SECRET_KEY` pair |
//! | `ACCESS_KEY` | *(unset)* | Access key to register at startup |
//! | `SECRET_KEY` | *(unset)* | Secret for `ACCESS_KEY` |
//! | `PROVISION_PRINCIPALS` | *(unset)* | Comma-separated principals given generated credentials |

mod handler;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use hmacgate_core::{AccessKey, GatewayConfig, Principal, PrincipalStore, SecretKey};
use hmacgate_http::{GatewayHttpConfig, GatewayHttpService, ProtectedHandler};

use crate::handler::EchoHandler;

/// Server version reported at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Populate the principal store from configuration.
///
/// The explicit `ACCESS_KEY` / `SECRET_KEY` pair is registered for
/// `PRINCIPAL`. Each entry of `PROVISION_PRINCIPALS` gets a generated
/// credential whose access key is logged; secrets are never logged.
fn seed_store(config: &GatewayConfig, store: &PrincipalStore) -> Result<()> {
    if let (Some(key), Some(secret)) = (&config.access_key, &config.secret_key) {
        let credential = store
            .register(
                Principal::new(config.principal.clone()),
                AccessKey::new(key.clone()),
                SecretKey::from(secret.as_str()),
            )
            .with_context(|| format!("failed to register access key {key}"))?;
        info!(
            principal = %credential.owner,
            access_key = %credential.key,
            "configured credential from environment"
        );
    }

    for name in &config.provision_principals {
        let credential = store.provision(&Principal::new(name.clone()));
        info!(
            principal = %credential.owner,
            access_key = %credential.key,
            "provisioned credential"
        );
    }

    if store.is_empty() {
        warn!("no credentials configured, every request will be rejected");
    }

    Ok(())
}

/// Build the [`GatewayHttpConfig`] from the application [`GatewayConfig`].
fn build_http_config(config: &GatewayConfig, store: Arc<PrincipalStore>) -> GatewayHttpConfig {
    GatewayHttpConfig::new(store).with_max_body_size(config.max_body_size)
}

/// Run the accept loop, serving connections until a shutdown signal is received.
async fn serve<H: ProtectedHandler>(
    listener: TcpListener,
    service: GatewayHttpService<H>,
) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let svc = service.clone();
                let conn = http.serve_connection(TokioIo::new(stream), svc);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}

/// Perform a health check by connecting to the gateway and requesting the health endpoint.
async fn run_health_check(addr: &str) -> Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;

    let (mut reader, mut writer) = stream.into_split();

    let request = format!("GET /_health HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    writer.write_all(request.as_bytes()).await?;
    writer.shutdown().await?;

    let mut response = String::new();
    reader.read_to_string(&mut response).await?;

    if response.contains("200 OK") && response.contains("\"status\":\"running\"") {
        Ok(())
    } else {
        anyhow::bail!("unhealthy response from {addr}")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Handle --health-check flag for Docker HEALTHCHECK.
    if std::env::args().any(|a| a == "--health-check") {
        let config = GatewayConfig::from_env();
        let addr = config.gateway_listen.replace("0.0.0.0", "127.0.0.1");
        let healthy = run_health_check(&addr).await.is_ok();
        std::process::exit(i32::from(!healthy));
    }

    let config = GatewayConfig::from_env();

    init_tracing(&config.log_level)?;
    config.validate().context("invalid configuration")?;

    info!(
        gateway_listen = %config.gateway_listen,
        max_body_size = config.max_body_size,
        version = VERSION,
        "starting hmacgate server",
    );

    let store = Arc::new(PrincipalStore::new());
    seed_store(&config, &store)?;

    let http_config = build_http_config(&config, Arc::clone(&store));
    let service = GatewayHttpService::new(Arc::new(EchoHandler), http_config);

    let addr: SocketAddr = config
        .gateway_listen
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.gateway_listen))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(%addr, "listening for connections");

    serve(listener, service).await
}
