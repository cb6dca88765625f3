use crate::error::AppError;
use crate::models::AUTH_ACCESS;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Represents the claims encoded within an auth token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject of the token, the user's id.
    pub sub: Uuid,
    /// Capability granted by the token.
    pub access: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Random id, distinguishes tokens issued within the same second.
    pub jti: Uuid,
}

/// HS256 keys for issuing and checking auth tokens.
///
/// Tokens carry no expiry: a token stays valid until it is removed from the
/// user's token list, so signature verification alone never authenticates a request.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenKeys {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::new();

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issues a new `auth` token for `user_id`.
    ///
    /// # Returns
    /// The encoded token, or `AppError::InternalServerError` if encoding fails.
    pub fn generate_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let claims = Claims {
            sub: user_id,
            access: AUTH_ACCESS.to_string(),
            iat: chrono::Utc::now().timestamp(),
            jti: Uuid::new_v4(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Verifies the signature of `token` and decodes its claims.
    ///
    /// Returns `AppError::Unauthorized` if the token is malformed, signed with another
    /// secret, or grants something other than `auth`.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)?.claims;

        if claims.access != AUTH_ACCESS {
            return Err(AppError::Unauthorized("Token does not grant auth access".into()));
        }
        Ok(claims)
    }
}
