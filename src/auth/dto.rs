use serde::{Deserialize, Serialize};

use crate::store::User;

/// Request body for account creation.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

/// Login form, OAuth2 password-grant style: the `username` field
/// carries the email.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Public view of a user. The hash never appears here.
#[derive(Debug, Serialize)]
pub struct UserOut {
    pub id: i64,
    pub email: String,
    pub is_active: bool,
}

impl From<User> for UserOut {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            is_active: u.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_out_never_includes_hash() {
        let out = UserOut::from(User {
            id: 1,
            email: "a@x.com".into(),
            password_hash: "$argon2id$v=19$notthehash".into(),
            is_active: true,
        });
        let json = serde_json::to_string(&out).unwrap();
        assert!(json.contains("a@x.com"));
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
    }
}
