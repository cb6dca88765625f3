#![doc = "The `todo_api` library crate."]
#![doc = ""]
#![doc = "Domain models, stores, token authentication, routing configuration and error"]
#![doc = "handling for the todo API. The binary (`main.rs`) only reads configuration,"]
#![doc = "picks a store and runs the server built from `routes::app`."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;

pub use crate::error::AppError;
