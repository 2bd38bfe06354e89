//! Error types for the hmacgate core.

/// Core error type for principal storage and configuration.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The access key is already bound to another principal.
    #[error("access key already in use: {0}")]
    DuplicateKey(String),

    /// The principal already owns a credential.
    #[error("principal already has a credential: {0}")]
    PrincipalExists(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
