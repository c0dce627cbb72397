pub mod password;
pub mod revocation;

pub use password::{generate_salt, hash_password, verify_password};
pub use revocation::{InMemoryRevocations, RevocationStore};

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("Token expired")]
    Expired,

    #[error("Token revoked")]
    Revoked,

    #[error("Failed to generate token: {0}")]
    Generation(String),
}

/// Claims carried by every bearer token. `jti` is the revocation key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Issues, verifies, revokes and refreshes signed bearer tokens.
///
/// A token is valid iff its signature checks out, the current time is before
/// `exp`, and its `jti` has not been entered into the revocation store.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifespan: Duration,
    revocations: Arc<dyn RevocationStore>,
}

impl TokenService {
    pub fn new(secret: &str, lifespan: Duration, revocations: Arc<dyn RevocationStore>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0; // expiry is exact, no grace window

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifespan,
            revocations,
        }
    }

    /// Generates a signed token for `subject` with a fresh jti. No side effects.
    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + self.lifespan).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Generation(e.to_string()))
    }

    /// Checks signature, expiry, and revocation, in that order.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Invalid(e.to_string()),
                }
            })?;

        if self.revocations.is_revoked(&data.claims.jti) {
            return Err(TokenError::Revoked);
        }

        Ok(data.claims)
    }

    /// Enters the token's jti into the revocation store. Idempotent; an
    /// already-expired token is accepted since revoking it changes nothing.
    pub fn revoke(&self, token: &str) -> Result<(), TokenError> {
        let mut validation = self.validation.clone();
        validation.validate_exp = false;

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;

        self.revocations
            .revoke(&data.claims.jti, data.claims.exp);
        Ok(())
    }

    /// Issues a new token for the same subject if the old one still verifies.
    /// The old token stays valid until it expires or is revoked explicitly.
    pub fn refresh(&self, token: &str) -> Result<String, TokenError> {
        let claims = self.verify(token)?;
        self.issue(&claims.sub)
    }

    /// Drops revocation entries whose token has expired anyway.
    pub fn prune_revocations(&self) {
        self.revocations.prune(Utc::now().timestamp());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(lifespan: Duration) -> TokenService {
        TokenService::new(
            "test-secret-key-at-least-32-chars-long",
            lifespan,
            Arc::new(InMemoryRevocations::new()),
        )
    }

    #[test]
    fn issue_then_verify_resolves_subject() {
        let svc = service(Duration::hours(1));
        let token = svc.issue("alice").unwrap();

        let claims = svc.verify(&token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert!(claims.exp > claims.iat);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn tampered_token_is_invalid() {
        let svc = service(Duration::hours(1));
        let token = svc.issue("alice").unwrap();
        let mut tampered = token.clone();
        tampered.push('x');

        assert!(matches!(svc.verify(&tampered), Err(TokenError::Invalid(_))));
        assert!(matches!(svc.verify("not-a-jwt"), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn expired_token_fails_with_expired() {
        let svc = service(Duration::seconds(-1));
        let token = svc.issue("alice").unwrap();

        assert!(matches!(svc.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn revoked_token_fails_with_revoked() {
        let svc = service(Duration::hours(1));
        let token = svc.issue("alice").unwrap();
        assert!(svc.verify(&token).is_ok());

        svc.revoke(&token).unwrap();
        assert!(matches!(svc.verify(&token), Err(TokenError::Revoked)));

        // Revoking again is a no-op, not an error
        svc.revoke(&token).unwrap();
        assert!(matches!(svc.verify(&token), Err(TokenError::Revoked)));
    }

    #[test]
    fn revoking_one_token_leaves_others_valid() {
        let svc = service(Duration::hours(1));
        let first = svc.issue("alice").unwrap();
        let second = svc.issue("alice").unwrap();

        svc.revoke(&first).unwrap();
        assert!(matches!(svc.verify(&first), Err(TokenError::Revoked)));
        assert!(svc.verify(&second).is_ok());
    }

    #[test]
    fn refresh_keeps_subject_and_old_token_valid() {
        let svc = service(Duration::hours(1));
        let old = svc.issue("bob").unwrap();

        let new = svc.refresh(&old).unwrap();
        assert_eq!(svc.verify(&new).unwrap().sub, "bob");

        // Refresh does not revoke the original token
        assert!(svc.verify(&old).is_ok());
    }

    #[test]
    fn refresh_of_revoked_token_fails() {
        let svc = service(Duration::hours(1));
        let token = svc.issue("bob").unwrap();
        svc.revoke(&token).unwrap();

        assert!(matches!(svc.refresh(&token), Err(TokenError::Revoked)));
    }
}
