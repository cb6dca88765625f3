use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// The only capability a token can currently grant.
pub const AUTH_ACCESS: &str = "auth";

/// One active session of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub access: String,
    pub token: String,
}

impl AuthToken {
    pub fn auth(token: String) -> Self {
        Self {
            access: AUTH_ACCESS.to_string(),
            token,
        }
    }
}

/// A stored account. Not `Serialize`; clients only ever see [`PublicUser`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// bcrypt hash of the password.
    pub password: String,
    /// Active sessions in issue order.
    pub tokens: Vec<AuthToken>,
}

impl User {
    pub fn new(email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            password: password_hash,
            tokens: Vec::new(),
        }
    }

    pub fn has_token(&self, token: &str) -> bool {
        self.tokens
            .iter()
            .any(|t| t.access == AUTH_ACCESS && t.token == token)
    }

    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            email: self.email.clone(),
        }
    }
}

/// The sanitized view of a user returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicUser {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub email: String,
}

/// Body of `POST /users` and `POST /users/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct UserInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String, // plaintext; hashed before it reaches the store
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_input_validation() {
        let input = UserInput {
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(input.validate().is_ok());

        let input = UserInput {
            email: "invalid-email".to_string(),
            password: "password123".to_string(),
        };
        assert!(input.validate().is_err());

        let input = UserInput {
            email: "test@example.com".to_string(),
            password: "short".to_string(),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_has_token_requires_auth_access() {
        let mut user = User::new("a@example.com".into(), "hash".into());
        user.tokens.push(AuthToken::auth("one".into()));
        user.tokens.push(AuthToken {
            access: "reset".into(),
            token: "two".into(),
        });

        assert!(user.has_token("one"));
        assert!(!user.has_token("two"));
        assert!(!user.has_token("three"));
    }

    #[test]
    fn test_public_view_hides_secrets() {
        let mut user = User::new("a@example.com".into(), "$2b$04$hash".into());
        user.tokens.push(AuthToken::auth("secret-token".into()));

        let value = serde_json::to_value(user.to_public()).unwrap();
        assert_eq!(
            value,
            json!({ "_id": user.id.to_string(), "email": "a@example.com" })
        );
    }
}
