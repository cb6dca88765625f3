use crate::{
    auth::{hash_password, verify_password, AuthSettings, AuthenticatedUser, AUTH_HEADER},
    error::AppError,
    models::{AuthToken, User, UserInput},
    store::Store,
};
use actix_web::{delete, get, post, web, HttpResponse, Responder};
use validator::Validate;

/// Unknown emails and wrong passwords share one answer so that accounts cannot be enumerated.
fn invalid_credentials() -> AppError {
    AppError::BadRequest("Invalid credentials".into())
}

/// Register a new user
///
/// Creates the account with its first session token. The token is returned in the
/// `x-auth` header, the body holds `{ "_id", "email" }`.
///
/// ## Responses:
/// - `200 OK`: the new user.
/// - `400 Bad Request`: invalid email, password shorter than 6 characters, or an
///   email that is already registered.
#[post("")]
pub async fn register(
    store: web::Data<dyn Store>,
    settings: web::Data<AuthSettings>,
    register_data: web::Json<UserInput>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;
    let input = register_data.into_inner();

    let password_hash = hash_password(&input.password, settings.hash_cost)?;
    let mut user = User::new(input.email, password_hash);

    let token = settings.keys.generate_token(user.id)?;
    user.tokens.push(AuthToken::auth(token.clone()));

    let user = store.insert_user(user).await?;

    log::info!("registered user {}", user.id);
    Ok(HttpResponse::Ok()
        .insert_header((AUTH_HEADER, token))
        .json(user.to_public()))
}

/// Login user
///
/// Verifies the credentials and opens a new session; earlier sessions stay valid.
///
/// ## Responses:
/// - `200 OK`: `{ "_id", "email" }` with the new token in `x-auth`.
/// - `400 Bad Request`: unknown email or wrong password. No token is issued.
#[post("/login")]
pub async fn login(
    store: web::Data<dyn Store>,
    settings: web::Data<AuthSettings>,
    login_data: web::Json<UserInput>,
) -> Result<impl Responder, AppError> {
    login_data
        .validate()
        .map_err(|_| invalid_credentials())?;

    let user = store
        .find_user_by_email(&login_data.email)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !verify_password(&login_data.password, &user.password)? {
        log::debug!("password mismatch for user {}", user.id);
        return Err(invalid_credentials());
    }

    let token = settings.keys.generate_token(user.id)?;
    if !store
        .push_token(user.id, AuthToken::auth(token.clone()))
        .await?
    {
        return Err(invalid_credentials());
    }

    log::info!("user {} logged in", user.id);
    Ok(HttpResponse::Ok()
        .insert_header((AUTH_HEADER, token))
        .json(user.to_public()))
}

/// Current user
///
/// Returns `{ "_id", "email" }` of the token's owner.
#[get("")]
pub async fn me(authenticated: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().json(authenticated.user.to_public())
}

/// Logout
///
/// Revokes only the token presented with this request.
#[delete("/token")]
pub async fn logout(
    store: web::Data<dyn Store>,
    authenticated: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let AuthenticatedUser { user, token } = authenticated;
    if !store.pull_token(user.id, &token).await? {
        // Revoked concurrently by another request with the same token.
        return Err(AppError::Unauthorized("Token already revoked".into()));
    }

    log::info!("user {} logged out", user.id);
    Ok(HttpResponse::Ok().finish())
}
