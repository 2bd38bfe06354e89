//! HMAC-authenticated HTTP service for hmacgate.
//!
//! This crate is the HTTP collaborator of the authentication core. It turns
//! hyper requests into [`HeaderSource`](hmacgate_auth::HeaderSource) and
//! [`BodySource`](hmacgate_auth::BodySource) views, runs the
//! [`Authenticator`](hmacgate_auth::Authenticator), and maps the outcome to
//! wire behaviour:
//!
//! - success: the request is dispatched to a [`ProtectedHandler`]
//! - any authentication failure: `403 Forbidden` with one fixed body
//! - directory outage: `503 Service Unavailable`
//!
//! # Architecture
//!
//! ```text
//! HTTP Request
//!   -> GatewayHttpService (hyper Service)
//!     -> Health check interception
//!     -> Body collection (size limited)
//!     -> HttpAuthRequest (Key / Signature header decoding)
//!     -> Authenticator::authenticate
//!     -> dispatch_request (ProtectedHandler trait)
//!     -> Common response headers (x-request-id, server)
//!   <- HTTP Response
//! ```
//!
//! # Signature transport
//!
//! HMAC output is arbitrary bytes, which an HTTP header cannot carry as is.
//! The `Signature` header therefore uses the RFC 8941 byte sequence form
//! `:<base64>:`; see [`codec`].

pub mod codec;
pub mod dispatch;
pub mod error;
pub mod request;
pub mod response;
pub mod service;

pub use codec::{encode_signature, sign_headers};
pub use dispatch::{HandlerFuture, ProtectedHandler};
pub use error::GatewayError;
pub use request::HttpAuthRequest;
pub use response::GatewayBody;
pub use service::{GatewayHttpConfig, GatewayHttpService};
