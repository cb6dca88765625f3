pub mod health;
pub mod todos;
pub mod users;

use actix_web::web;

use crate::auth::{AuthMiddleware, AuthSettings};
use crate::error::AppError;
use crate::store::Store;

/// Registers application state and every route.
///
/// ```ignore
/// App::new().configure(routes::app(store, settings))
/// ```
pub fn app(
    store: web::Data<dyn Store>,
    settings: web::Data<AuthSettings>,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(store)
            .app_data(settings)
            .app_data(json_config())
            .service(health::health);
        config(cfg);
    }
}

/// Route table. Expects the store and auth settings to be registered as app data.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/todos")
            .wrap(AuthMiddleware::optional())
            .service(todos::get_todos)
            .service(todos::create_todo)
            .service(todos::get_todo)
            .service(todos::update_todo)
            .service(todos::delete_todo),
    )
    .service(
        web::scope("/users")
            .service(users::register)
            .service(users::login)
            .service(
                web::scope("/me")
                    .wrap(AuthMiddleware::required())
                    .service(users::me)
                    .service(users::logout),
            ),
    );
}

/// Malformed JSON bodies go through `AppError` like every other client error.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid request body: {}", err)).into()
    })
}
