use thiserror::Error;

/// Token minting and verification errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// No signing secret was configured
    #[error("Token secret is missing or empty")]
    MissingSecret,

    /// Malformed JWT - cannot be decoded
    #[error("Invalid token format: {0}")]
    InvalidTokenFormat(String),

    /// Signature verification failed
    #[error("Invalid signature")]
    InvalidSignature,

    /// Signing failed
    #[error("Signing failed: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidToken => {
                AuthError::InvalidTokenFormat("Invalid JWT structure".into())
            }
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            _ => AuthError::InvalidTokenFormat(format!("JWT error: {}", err)),
        }
    }
}
