use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{now_millis, Todo, TodoInput, TodoPatch},
    store::Store,
};
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// A path segment that is not a UUID cannot name a todo, so it is reported as 404.
fn parse_todo_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("Todo {} not found", raw)))
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Todo {} not found", id))
}

/// Creates a new todo.
///
/// ## Request Body:
/// - `text`: the todo text; must not be blank. Stored trimmed.
///
/// When the request carries a valid `x-auth` token the todo records its creator.
///
/// ## Responses:
/// - `200 OK`: the created todo.
/// - `400 Bad Request`: `text` missing, not a string, or blank.
#[post("")]
pub async fn create_todo(
    store: web::Data<dyn Store>,
    todo_data: web::Json<TodoInput>,
    creator: Option<AuthenticatedUser>,
) -> Result<impl Responder, AppError> {
    todo_data.validate()?;

    let creator = creator.map(|authenticated| authenticated.user.id);
    let todo = store
        .insert_todo(Todo::new(todo_data.into_inner(), creator))
        .await?;

    log::info!("created todo {}", todo.id);
    Ok(HttpResponse::Ok().json(todo))
}

/// Lists every todo as `{ "todos": [...] }`.
#[get("")]
pub async fn get_todos(store: web::Data<dyn Store>) -> Result<impl Responder, AppError> {
    let todos = store.list_todos().await?;
    Ok(HttpResponse::Ok().json(json!({ "todos": todos })))
}

/// Fetches a single todo as `{ "todo": {...} }`.
///
/// ## Responses:
/// - `200 OK`: the todo.
/// - `404 Not Found`: the id is not a UUID or no todo has it.
#[get("/{id}")]
pub async fn get_todo(
    store: web::Data<dyn Store>,
    todo_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let id = parse_todo_id(&todo_id)?;
    let todo = store.find_todo(id).await?.ok_or_else(|| not_found(id))?;
    Ok(HttpResponse::Ok().json(json!({ "todo": todo })))
}

/// Applies a partial update.
///
/// ## Request Body:
/// Any subset of:
/// - `text`: replacement text; must not be blank.
/// - `completed`: `true` stamps `completedAt` with the current time unless the todo
///   was already completed; `false` clears `completedAt`.
///
/// ## Responses:
/// - `200 OK`: `{ "todo": {...} }` with the updated todo.
/// - `400 Bad Request`: blank `text` or a body that does not parse.
/// - `404 Not Found`: the id is not a UUID or no todo has it, whatever the body.
#[patch("/{id}")]
pub async fn update_todo(
    store: web::Data<dyn Store>,
    todo_id: web::Path<String>,
    body: web::Bytes,
) -> Result<impl Responder, AppError> {
    let id = parse_todo_id(&todo_id)?;
    store.find_todo(id).await?.ok_or_else(|| not_found(id))?;

    // The id must resolve before the body is looked at.
    let patch_data: TodoPatch = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e)))?;
    patch_data.validate()?;

    let todo = store
        .update_todo(id, &patch_data, now_millis())
        .await?
        .ok_or_else(|| not_found(id))?;

    log::debug!("updated todo {}", todo.id);
    Ok(HttpResponse::Ok().json(json!({ "todo": todo })))
}

/// Deletes a todo and returns it as `{ "todo": {...} }`.
///
/// Deleting an id that does not exist is a 404, not a silent success.
#[delete("/{id}")]
pub async fn delete_todo(
    store: web::Data<dyn Store>,
    todo_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let id = parse_todo_id(&todo_id)?;
    let todo = store.delete_todo(id).await?.ok_or_else(|| not_found(id))?;

    log::info!("deleted todo {}", todo.id);
    Ok(HttpResponse::Ok().json(json!({ "todo": todo })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_todo_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_todo_id(&id.to_string()).unwrap(), id);

        for raw in ["123", "", "not-a-uuid", "5c8a1d5b0190b214360dc031"] {
            assert!(matches!(parse_todo_id(raw), Err(AppError::NotFound(_))));
        }
    }
}
