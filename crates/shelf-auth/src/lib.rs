//! # Shelf Auth - Access Token Minting
//!
//! Issues and verifies the signed access tokens the repository hands to
//! seeded accounts. Tokens are HS256 JWTs over a shared secret supplied via
//! configuration; they carry the user id and do not expire.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

mod error;

pub use error::AuthError;

/// JWT claims structure
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the user id the token was minted for
    pub sub: String,
    /// Issued at (seconds since epoch)
    pub iat: u64,
}

/// Mint an access token for `user_id`.
pub fn issue_token(secret: &str, user_id: &str) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let claims = TokenClaims { sub: user_id.to_string(), iat: Utc::now().timestamp() as u64 };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Signing(e.to_string()))
}

/// Verify a token's signature and return its claims.
pub fn verify_token(secret: &str, token: &str) -> Result<TokenClaims, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    // Tokens carry no exp claim; signature is the only thing checked.
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.required_spec_claims = Default::default();

    decode::<TokenClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(AuthError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify_round_trip() {
        let token = issue_token("secret", "root").unwrap();
        let claims = verify_token("secret", &token).unwrap();
        assert_eq!(claims.sub, "root");
        assert!(claims.iat > 0);
    }

    #[test]
    fn test_issue_requires_secret() {
        let result = issue_token("", "root");
        assert!(matches!(result, Err(AuthError::MissingSecret)));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let token = issue_token("secret", "root").unwrap();
        let result = verify_token("other-secret", &token);
        assert!(matches!(result, Err(AuthError::InvalidSignature)));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let result = verify_token("secret", "not-a-token");
        assert!(matches!(result, Err(AuthError::InvalidTokenFormat(_))));
    }
}
