pub mod todo;
pub mod user;

pub use todo::{now_millis, Todo, TodoInput, TodoPatch};
pub use user::{AuthToken, PublicUser, User, UserInput, AUTH_ACCESS};
