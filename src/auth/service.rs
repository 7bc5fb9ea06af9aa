use tracing::warn;

use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::error::ApiError;
use crate::store::{StoreError, User, UserStore};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Email already registered")]
    EmailTaken,

    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Could not validate credentials")]
    Unauthenticated,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::EmailTaken => ApiError::Conflict(e.to_string()),
            AuthError::InvalidCredentials | AuthError::Unauthenticated => {
                ApiError::Unauthorized(e.to_string())
            }
            AuthError::Internal(inner) => ApiError::Internal(inner),
        }
    }
}

fn store_err(e: StoreError) -> AuthError {
    match e {
        StoreError::Duplicate => AuthError::EmailTaken,
        StoreError::Other(inner) => AuthError::Internal(inner),
    }
}

/// Create an account. Does not log the caller in; a signup is followed
/// by an explicit login.
pub async fn signup(
    users: &dyn UserStore,
    email: &str,
    password: &str,
) -> Result<User, AuthError> {
    if users
        .find_by_email(email)
        .await
        .map_err(store_err)?
        .is_some()
    {
        warn!(email = %email, "signup email already registered");
        return Err(AuthError::EmailTaken);
    }

    let hash = hash_password(password)?;

    // The pre-check above can race a concurrent signup; the store's
    // unique index is authoritative and also surfaces as EmailTaken.
    users.insert_user(email, &hash).await.map_err(store_err)
}

/// Verify credentials and issue a bearer token. Unknown email and wrong
/// password are deliberately the same failure, so responses never reveal
/// whether an email is registered.
pub async fn login(
    users: &dyn UserStore,
    keys: &JwtKeys,
    email: &str,
    password: &str,
) -> Result<String, AuthError> {
    let user = match users.find_by_email(email).await.map_err(store_err)? {
        Some(u) => u,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(AuthError::InvalidCredentials);
        }
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AuthError::InvalidCredentials);
    }

    Ok(keys.sign(user.id)?)
}

/// Resolve a presented token to its user. Decode failures, a missing
/// user and an inactive user all collapse into `Unauthenticated`.
pub async fn resolve_current_user(
    users: &dyn UserStore,
    keys: &JwtKeys,
    token: &str,
) -> Result<User, AuthError> {
    let user_id = keys.verify(token).map_err(|e| {
        warn!(error = %e, "token rejected");
        AuthError::Unauthenticated
    })?;

    let user = users
        .find_by_id(user_id)
        .await
        .map_err(store_err)?
        .ok_or(AuthError::Unauthenticated)?;

    if !user.is_active {
        warn!(user_id = %user.id, "inactive user presented a valid token");
        return Err(AuthError::Unauthenticated);
    }

    Ok(user)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::store::MemStore;

    fn make_keys() -> JwtKeys {
        JwtKeys::new("test-secret", Duration::from_secs(30 * 60))
    }

    #[tokio::test]
    async fn signup_then_login_then_resolve() {
        let store = MemStore::new();
        let keys = make_keys();

        let user = signup(&store, "a@x.com", "secret123").await.expect("signup");
        assert!(user.is_active);
        assert_ne!(user.password_hash, "secret123");

        let token = login(&store, &keys, "a@x.com", "secret123")
            .await
            .expect("login");
        let resolved = resolve_current_user(&store, &keys, &token)
            .await
            .expect("resolve");
        assert_eq!(resolved.id, user.id);
        assert_eq!(resolved.email, "a@x.com");
    }

    #[tokio::test]
    async fn duplicate_signup_is_email_taken() {
        let store = MemStore::new();
        signup(&store, "a@x.com", "secret123").await.expect("signup");
        let err = signup(&store, "a@x.com", "other-pass").await.unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let store = MemStore::new();
        let keys = make_keys();
        signup(&store, "a@x.com", "secret123").await.expect("signup");

        let wrong_password = login(&store, &keys, "a@x.com", "bad-pass").await.unwrap_err();
        let unknown_email = login(&store, &keys, "nobody@x.com", "secret123")
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_email, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn resolve_rejects_garbage_token() {
        let store = MemStore::new();
        let keys = make_keys();
        let err = resolve_current_user(&store, &keys, "garbage").await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }

    #[tokio::test]
    async fn resolve_rejects_expired_token() {
        let store = MemStore::new();
        let keys = make_keys();
        let user = signup(&store, "a@x.com", "secret123").await.expect("signup");
        let token = keys.sign_with_ttl(user.id, -60).expect("sign");
        let err = resolve_current_user(&store, &keys, &token).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }

    #[tokio::test]
    async fn resolve_rejects_inactive_user() {
        let store = MemStore::new();
        let keys = make_keys();
        let user = signup(&store, "a@x.com", "secret123").await.expect("signup");
        let token = login(&store, &keys, "a@x.com", "secret123")
            .await
            .expect("login");
        store.set_active(user.id, false);
        let err = resolve_current_user(&store, &keys, &token).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }

    #[tokio::test]
    async fn resolve_rejects_token_for_missing_user() {
        let store = MemStore::new();
        let keys = make_keys();
        let token = keys.sign(9999).expect("sign");
        let err = resolve_current_user(&store, &keys, &token).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }
}
