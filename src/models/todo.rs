use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Rejects text that is empty once surrounding whitespace is removed.
fn validate_not_blank(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Payload for creating a todo.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TodoInput {
    /// Must contain at least one non-whitespace character.
    #[validate(custom = "validate_not_blank")]
    pub text: String,
}

/// Partial update of a todo. Absent fields are left untouched, unknown
/// fields in the request body are ignored.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct TodoPatch {
    #[validate(custom = "validate_not_blank")]
    pub text: Option<String>,
    pub completed: Option<bool>,
}

/// A todo as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Todo {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub text: String,
    pub completed: bool,
    /// Epoch milliseconds; `Some` exactly when `completed` is true.
    #[serde(rename = "completedAt")]
    pub completed_at: Option<i64>,
    /// The user whose token accompanied the create request, if any.
    #[serde(rename = "_creator", default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<Uuid>,
}

impl Todo {
    /// Creates an open todo with a fresh id and trimmed text.
    pub fn new(input: TodoInput, creator: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: input.text.trim().to_string(),
            completed: false,
            completed_at: None,
            creator,
        }
    }

    /// Merges `patch` into this todo, keeping `completed` and `completed_at`
    /// consistent. `now_ms` is used only when the todo becomes completed.
    pub fn apply(&mut self, patch: &TodoPatch, now_ms: i64) {
        if let Some(text) = &patch.text {
            self.text = text.trim().to_string();
        }

        match patch.completed {
            Some(true) => {
                if !(self.completed && self.completed_at.is_some()) {
                    self.completed_at = Some(now_ms);
                }
                self.completed = true;
            }
            Some(false) => {
                self.completed = false;
                self.completed_at = None;
            }
            None => {}
        }
    }
}

/// Current time in epoch milliseconds, the unit of `completedAt`.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
