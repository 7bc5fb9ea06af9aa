use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::{config::JwtConfig, state::AppState};

/// Token payload. `sub` is optional in the wire type so that a signed
/// token missing its subject is detectable rather than a parse error.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub exp: usize,
    pub iat: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is not structurally valid")]
    Malformed,
    #[error("token signature does not match")]
    BadSignature,
    #[error("token is expired")]
    Expired,
    #[error("token has no subject claim")]
    MissingSubject,
}

/// HS256 signing/verification keys, built from the config-injected
/// secret at startup. The secret lives for the whole process; rotating
/// it invalidates every outstanding token.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            ttl_minutes,
        } = state.config.jwt.clone();
        Self::new(&secret, Duration::from_secs((ttl_minutes as u64) * 60))
    }
}

impl JwtKeys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Issue a token for `user_id` with the configured TTL.
    pub fn sign(&self, user_id: i64) -> anyhow::Result<String> {
        self.sign_with_ttl(user_id, self.ttl.as_secs() as i64)
    }

    /// Issue a token expiring `ttl_seconds` from now. Negative values
    /// produce an already-expired token, which the tests rely on.
    pub fn sign_with_ttl(&self, user_id: i64, ttl_seconds: i64) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(ttl_seconds);
        let claims = Claims {
            sub: Some(user_id.to_string()),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    /// Verify signature and expiry, returning the subject user id.
    pub fn verify(&self, token: &str) -> Result<i64, TokenError> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            }
        })?;
        // jsonwebtoken only rejects once exp < now; a token is already
        // expired at the exact expiry instant.
        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        if data.claims.exp <= now {
            return Err(TokenError::Expired);
        }
        let sub = data.claims.sub.ok_or(TokenError::MissingSubject)?;
        sub.parse::<i64>().map_err(|_| TokenError::Malformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str) -> JwtKeys {
        JwtKeys::new(secret, Duration::from_secs(30 * 60))
    }

    #[test]
    fn sign_and_verify_roundtrip() {
        let keys = make_keys("dev-secret");
        let token = keys.sign(42).expect("sign");
        assert_eq!(keys.verify(&token).expect("verify"), 42);
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = make_keys("dev-secret");
        let token = keys.sign_with_ttl(42, -120).expect("sign");
        assert_eq!(keys.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn token_is_expired_at_the_expiry_instant() {
        let keys = make_keys("dev-secret");
        let token = keys.sign_with_ttl(42, 0).expect("sign");
        assert_eq!(keys.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn wrong_secret_fails_signature_check() {
        let keys = make_keys("secret-one");
        let other = make_keys("secret-two");
        let token = keys.sign(42).expect("sign");
        assert_eq!(other.verify(&token), Err(TokenError::BadSignature));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let keys = make_keys("dev-secret");
        let token = keys.sign(42).expect("sign");
        // Change one character inside the signature segment.
        let dot = token.rfind('.').expect("token has a signature segment");
        let mut chars: Vec<char> = token.chars().collect();
        let target = dot + 1;
        chars[target] = if chars[target] == 'A' { 'B' } else { 'A' };
        let tampered: String = chars.into_iter().collect();
        let err = keys.verify(&tampered).unwrap_err();
        assert!(matches!(
            err,
            TokenError::BadSignature | TokenError::Malformed
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        let keys = make_keys("dev-secret");
        assert_eq!(keys.verify("not.a.token"), Err(TokenError::Malformed));
        assert_eq!(keys.verify(""), Err(TokenError::Malformed));
    }

    #[test]
    fn missing_subject_is_detected() {
        let keys = make_keys("dev-secret");
        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        let claims = Claims {
            sub: None,
            iat: now,
            exp: now + 600,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");
        assert_eq!(keys.verify(&token), Err(TokenError::MissingSubject));
    }

    #[test]
    fn non_integer_subject_is_malformed() {
        let keys = make_keys("dev-secret");
        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        let claims = Claims {
            sub: Some("not-a-number".into()),
            iat: now,
            exp: now + 600,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");
        assert_eq!(keys.verify(&token), Err(TokenError::Malformed));
    }
}
