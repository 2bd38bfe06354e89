//! Configuration management for hmacgate.
//!
//! All configuration is driven by environment variables. The signing
//! algorithm is fixed and has no setting.

use crate::error::{CoreError, CoreResult};

/// Global configuration for the gateway.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Bind address for the gateway.
    pub gateway_listen: String,
    /// Log level.
    pub log_level: String,
    /// Maximum accepted request body size in bytes.
    pub max_body_size: usize,
    /// Principal seeded with the explicit `ACCESS_KEY` / `SECRET_KEY` pair.
    pub principal: String,
    /// Explicit access key to seed, if any.
    pub access_key: Option<String>,
    /// Explicit secret to seed, if any. Skipped when serializing.
    #[serde(skip_serializing)]
    pub secret_key: Option<String>,
    /// Principals whose credentials are generated at startup.
    pub provision_principals: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            gateway_listen: "0.0.0.0:8000".to_owned(),
            log_level: "info".to_owned(),
            max_body_size: 1024 * 1024,
            principal: "admin".to_owned(),
            access_key: None,
            secret_key: None,
            provision_principals: Vec::new(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Unparseable numeric values keep their defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("GATEWAY_LISTEN") {
            config.gateway_listen = v;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Some(v) = lookup("MAX_BODY_SIZE") {
            if let Ok(size) = v.trim().parse() {
                config.max_body_size = size;
            } else {
                tracing::warn!(value = %v, "ignoring invalid MAX_BODY_SIZE");
            }
        }
        if let Some(v) = lookup("PRINCIPAL") {
            config.principal = v;
        }
        config.access_key = lookup("ACCESS_KEY").filter(|v| !v.is_empty());
        config.secret_key = lookup("SECRET_KEY").filter(|v| !v.is_empty());
        if let Some(v) = lookup("PROVISION_PRINCIPALS") {
            config.provision_principals = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToOwned::to_owned)
                .collect();
        }

        config
    }

    /// Check the configuration for values the server cannot start with.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`] when the body limit is zero, the seeded
    /// principal name is empty, or only one of `ACCESS_KEY` / `SECRET_KEY`
    /// is set.
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_body_size == 0 {
            return Err(CoreError::Config("MAX_BODY_SIZE must be positive".to_owned()));
        }
        if self.principal.trim().is_empty() {
            return Err(CoreError::Config("PRINCIPAL must not be empty".to_owned()));
        }
        if self.access_key.is_some() != self.secret_key.is_some() {
            return Err(CoreError::Config(
                "ACCESS_KEY and SECRET_KEY must be set together".to_owned(),
            ));
        }
        Ok(())
    }
}
