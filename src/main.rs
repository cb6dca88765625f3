use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use std::io;
use std::sync::Arc;

use todo_api::auth::{AuthSettings, AUTH_HEADER};
use todo_api::config::Config;
use todo_api::routes;
use todo_api::store::{MemoryStore, PgStore, Store};

fn startup_error(err: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

async fn open_store(config: &Config) -> Result<Arc<dyn Store>, todo_api::AppError> {
    match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url).await?;
            store.migrate().await?;
            log::info!("using PostgreSQL store");
            Ok(Arc::new(store))
        }
        None => {
            log::warn!("DATABASE_URL not set, data is kept in memory only");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(startup_error)?;
    let store = web::Data::from(open_store(&config).await.map_err(startup_error)?);
    let settings = web::Data::new(AuthSettings::new(&config.jwt_secret, config.bcrypt_cost));

    log::info!("Starting todo-api server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .expose_headers([AUTH_HEADER])
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::app(store.clone(), settings.clone()))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
