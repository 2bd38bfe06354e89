//! Core types, configuration, and principal storage for hmacgate.
//!
//! This crate provides the building blocks shared by the authentication and
//! HTTP crates: the [`Principal`] and [`Credential`] model, environment-driven
//! [`GatewayConfig`], and [`PrincipalStore`], a concurrent in-memory directory
//! that maps public access keys to credentials.

mod config;
mod error;
mod store;
mod types;

pub use config::GatewayConfig;
pub use error::{CoreError, CoreResult};
pub use store::PrincipalStore;
pub use types::{AccessKey, Credential, Principal, SecretKey};
