pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use actix_web::http::header::HeaderMap;

use crate::error::AppError;
use crate::models::User;
use crate::store::Store;

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenKeys};

/// Request and response header carrying the auth token.
pub const AUTH_HEADER: &str = "x-auth";

/// Everything the handlers and the middleware need to issue and check credentials.
/// Registered once as `web::Data<AuthSettings>`.
#[derive(Clone)]
pub struct AuthSettings {
    pub keys: TokenKeys,
    /// bcrypt work factor for new password hashes.
    pub hash_cost: u32,
}

impl AuthSettings {
    pub fn new(secret: &str, hash_cost: u32) -> Self {
        Self {
            keys: TokenKeys::new(secret),
            hash_cost,
        }
    }
}

/// Outcome of resolving a request's token against the store.
#[derive(Debug, Clone)]
pub enum AuthState {
    Authenticated { user: User, token: String },
    Unauthenticated,
}

/// Reads the raw token from the `x-auth` header.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTH_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

/// Resolves `token` to the user holding it.
///
/// Only store failures are errors; a missing, forged or revoked token is
/// `AuthState::Unauthenticated`.
pub async fn resolve(
    store: &dyn Store,
    settings: &AuthSettings,
    token: Option<String>,
) -> Result<AuthState, AppError> {
    let Some(token) = token else {
        return Ok(AuthState::Unauthenticated);
    };

    let claims = match settings.keys.verify_token(&token) {
        Ok(claims) => claims,
        Err(err) => {
            log::debug!("{}", err);
            return Ok(AuthState::Unauthenticated);
        }
    };

    match store.find_user_by_token(claims.sub, &token).await? {
        Some(user) => Ok(AuthState::Authenticated { user, token }),
        None => {
            log::debug!("token for user {} is not active", claims.sub);
            Ok(AuthState::Unauthenticated)
        }
    }
}
