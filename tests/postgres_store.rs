//! Runs `PgStore` against a real database. Every test returns early when
//! `DATABASE_URL` is not set.

use dotenv::dotenv;
use pretty_assertions::assert_eq;
use todo_api::models::{AuthToken, Todo, TodoInput, TodoPatch, User};
use todo_api::store::{PgStore, Store, TodoStore, UserStore};
use todo_api::AppError;
use uuid::Uuid;

async fn connect() -> Option<PgStore> {
    dotenv().ok();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping PostgreSQL store test");
        return None;
    };

    let store = PgStore::connect(&database_url)
        .await
        .expect("Failed to connect to DATABASE_URL");
    store.migrate().await.expect("Failed to run migrations");
    Some(store)
}

fn unique_email() -> String {
    format!("{}@example.com", Uuid::new_v4().simple())
}

fn completed(value: bool) -> TodoPatch {
    TodoPatch {
        text: None,
        completed: Some(value),
    }
}

#[actix_rt::test]
async fn test_update_todo_completion_rules() {
    let Some(store) = connect().await else { return };
    assert_eq!(store.backend(), "postgres");

    let todo = store
        .insert_todo(Todo::new(TodoInput { text: "  walk the dog ".into() }, None))
        .await
        .unwrap();
    assert_eq!(todo.text, "walk the dog");
    assert_eq!(todo.completed_at, None);

    let done = store.update_todo(todo.id, &completed(true), 1_000).await.unwrap().unwrap();
    assert!(done.completed);
    assert_eq!(done.completed_at, Some(1_000));

    // Completing again keeps the first timestamp.
    let again = store.update_todo(todo.id, &completed(true), 2_000).await.unwrap().unwrap();
    assert_eq!(again.completed_at, Some(1_000));

    // Text-only patches leave the completion state alone.
    let renamed = TodoPatch {
        text: Some(" feed the cat ".into()),
        completed: None,
    };
    let renamed = store.update_todo(todo.id, &renamed, 3_000).await.unwrap().unwrap();
    assert_eq!(renamed.text, "feed the cat");
    assert!(renamed.completed);
    assert_eq!(renamed.completed_at, Some(1_000));

    let undone = store.update_todo(todo.id, &completed(false), 4_000).await.unwrap().unwrap();
    assert!(!undone.completed);
    assert_eq!(undone.completed_at, None);
    assert_eq!(store.find_todo(todo.id).await.unwrap(), Some(undone));

    assert_eq!(
        store.update_todo(Uuid::new_v4(), &completed(true), 0).await.unwrap(),
        None
    );
}

#[actix_rt::test]
async fn test_delete_todo_returns_removed_row() {
    let Some(store) = connect().await else { return };

    let todo = store
        .insert_todo(Todo::new(TodoInput { text: "to be removed".into() }, None))
        .await
        .unwrap();

    assert_eq!(store.delete_todo(todo.id).await.unwrap(), Some(todo.clone()));
    assert_eq!(store.delete_todo(todo.id).await.unwrap(), None);
    assert_eq!(store.find_todo(todo.id).await.unwrap(), None);
}

#[actix_rt::test]
async fn test_duplicate_email_is_conflict() {
    let Some(store) = connect().await else { return };
    let email = unique_email();

    let mut first = User::new(email.clone(), "hash".into());
    first.tokens.push(AuthToken::auth("initial".into()));
    let first = store.insert_user(first).await.unwrap();

    let result = store.insert_user(User::new(email.clone(), "other".into())).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    // The failed insert must not leave anything behind.
    let stored = store.find_user_by_email(&email).await.unwrap().unwrap();
    assert_eq!(stored.id, first.id);
    assert_eq!(stored.password, "hash");
    assert_eq!(stored.tokens.len(), 1);
}

#[actix_rt::test]
async fn test_token_order_and_revocation() {
    let Some(store) = connect().await else { return };

    let user = store
        .insert_user(User::new(unique_email(), "hash".into()))
        .await
        .unwrap();

    assert!(store.push_token(user.id, AuthToken::auth("one".into())).await.unwrap());
    assert!(store.push_token(user.id, AuthToken::auth("two".into())).await.unwrap());
    assert!(store.push_token(user.id, AuthToken::auth("three".into())).await.unwrap());

    let tokens: Vec<String> = store
        .find_user(user.id)
        .await
        .unwrap()
        .unwrap()
        .tokens
        .into_iter()
        .map(|t| t.token)
        .collect();
    assert_eq!(tokens, vec!["one", "two", "three"]);

    assert!(store.pull_token(user.id, "two").await.unwrap());
    assert!(!store.pull_token(user.id, "two").await.unwrap());

    let tokens: Vec<String> = store
        .find_user(user.id)
        .await
        .unwrap()
        .unwrap()
        .tokens
        .into_iter()
        .map(|t| t.token)
        .collect();
    assert_eq!(tokens, vec!["one", "three"]);

    assert!(store.find_user_by_token(user.id, "one").await.unwrap().is_some());
    assert!(store.find_user_by_token(user.id, "two").await.unwrap().is_none());

    assert!(!store
        .push_token(Uuid::new_v4(), AuthToken::auth("orphan".into()))
        .await
        .unwrap());
}
