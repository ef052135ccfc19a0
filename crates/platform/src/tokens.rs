//! Bearer-token codec (HS256 JWT) and password-reset tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use pressflow_core::{PressflowError, PressflowResult};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// JWT claims: the account id plus issue/expiry timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 token codec configured with the signing secret and expiry.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str, expiry_days: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiry: Duration::days(expiry_days),
        }
    }

    /// Issue a signed token for an account id.
    pub fn issue(&self, account_id: Uuid) -> PressflowResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: account_id,
            iat: now.timestamp(),
            exp: (now + self.expiry).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| PressflowError::Internal(anyhow::anyhow!("token encode: {e}")))
    }

    /// Verify signature and expiry, returning the embedded account id.
    pub fn verify(&self, token: &str) -> PressflowResult<Uuid> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| PressflowError::Unauthenticated("invalid or expired token".into()))?;
        Ok(data.claims.sub)
    }
}

/// Generate a raw password-reset token (hex) and the SHA-256 hash stored
/// alongside the account. Only the hash ever touches the store.
pub fn generate_reset_token() -> (String, String) {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    let raw = hex::encode(bytes);
    (hash_reset_token(&raw), raw)
}

/// Hash a raw reset token for lookup.
pub fn hash_reset_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let codec = TokenCodec::new("test-secret", 1);
        let id = Uuid::new_v4();
        let token = codec.issue(id).unwrap();
        assert_eq!(codec.verify(&token).unwrap(), id);
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let codec = TokenCodec::new("secret-a", 1);
        let other = TokenCodec::new("secret-b", 1);
        let token = codec.issue(Uuid::new_v4()).unwrap();
        assert!(matches!(
            other.verify(&token),
            Err(PressflowError::Unauthenticated(_))
        ));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let codec = TokenCodec::new("secret", 1);
        assert!(codec.verify("not.a.jwt").is_err());
    }

    #[test]
    fn test_reset_token_hash_is_stable() {
        let (hash, raw) = generate_reset_token();
        assert_eq!(raw.len(), 64);
        assert_eq!(hash_reset_token(&raw), hash);
        assert_ne!(hash, raw);
    }
}
