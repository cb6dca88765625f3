#![allow(dead_code)]

use actix_web::web;
use std::sync::Arc;
use todo_api::auth::{hash_password, AuthSettings};
use todo_api::models::{AuthToken, Todo, User};
use todo_api::store::{MemoryStore, Store, TodoStore, UserStore};
use uuid::Uuid;

pub const TEST_SECRET: &str = "abc123";
/// Lowest cost bcrypt accepts; keeps the suite fast.
pub const TEST_HASH_COST: u32 = 4;

pub struct SeededUser {
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub token: Option<String>,
}

/// A fresh store seeded with two todos and two users. The first user holds one
/// active token, the second none.
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub settings: web::Data<AuthSettings>,
    pub todos: Vec<Todo>,
    pub users: Vec<SeededUser>,
}

impl TestContext {
    pub async fn new() -> TestContext {
        let store = Arc::new(MemoryStore::new());
        let settings = AuthSettings::new(TEST_SECRET, TEST_HASH_COST);

        let todos = vec![
            Todo {
                id: Uuid::new_v4(),
                text: "First test todo".to_string(),
                completed: false,
                completed_at: None,
                creator: None,
            },
            Todo {
                id: Uuid::new_v4(),
                text: "Second test todo".to_string(),
                completed: true,
                completed_at: Some(333),
                creator: None,
            },
        ];
        for todo in &todos {
            store.insert_todo(todo.clone()).await.expect("seed todo");
        }

        let mut users = Vec::new();
        for (index, (email, password)) in [
            ("andrew@example.com", "userOnePass"),
            ("jen@example.com", "userTwoPass"),
        ]
        .into_iter()
        .enumerate()
        {
            let mut user = User::new(
                email.to_string(),
                hash_password(password, TEST_HASH_COST).expect("hash seed password"),
            );
            let token = if index == 0 {
                let token = settings.keys.generate_token(user.id).expect("seed token");
                user.tokens.push(AuthToken::auth(token.clone()));
                Some(token)
            } else {
                None
            };
            store.insert_user(user.clone()).await.expect("seed user");
            users.push(SeededUser {
                id: user.id,
                email: email.to_string(),
                password: password.to_string(),
                token,
            });
        }

        TestContext {
            store,
            settings: web::Data::new(settings),
            todos,
            users,
        }
    }

    pub fn store_data(&self) -> web::Data<dyn Store> {
        let store: Arc<dyn Store> = self.store.clone();
        web::Data::from(store)
    }

    pub fn token_of(&self, index: usize) -> String {
        self.users[index]
            .token
            .clone()
            .expect("seeded user has a token")
    }

    pub async fn user(&self, id: Uuid) -> User {
        self.store
            .find_user(id)
            .await
            .expect("store lookup")
            .expect("user exists")
    }
}
