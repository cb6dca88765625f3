use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

use crate::store::Store;

/// Liveness check
///
/// Reports which store backend the process runs on (`memory` or `postgres`) next to
/// the server time. Does not touch the store itself.
#[get("/health")]
pub async fn health(store: web::Data<dyn Store>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "store": store.backend(),
        "timestamp": Utc::now()
    }))
}
