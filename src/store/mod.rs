use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub mod memory;
pub mod postgres;

pub use memory::MemStore;
pub use postgres::PgStore;

/// Account record. The hash never leaves the process in JSON.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub done: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint was violated (currently only users.email).
    #[error("unique constraint violated")]
    Duplicate,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;
    /// Inserts with `is_active = true`. `Duplicate` when the email is taken.
    async fn insert_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError>;
}

#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn insert_todo(&self, title: &str, done: bool) -> Result<Todo, StoreError>;
    async fn list_todos(&self) -> Result<Vec<Todo>, StoreError>;
    async fn get_todo(&self, id: i64) -> Result<Option<Todo>, StoreError>;
    /// Partial update; `None` fields keep their stored value.
    async fn update_todo(
        &self,
        id: i64,
        title: Option<&str>,
        done: Option<bool>,
    ) -> Result<Option<Todo>, StoreError>;
    /// Returns whether a row was actually deleted.
    async fn delete_todo(&self, id: i64) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn insert_note(&self, title: &str, body: &str) -> Result<Note, StoreError>;
    async fn list_notes(&self) -> Result<Vec<Note>, StoreError>;
    async fn get_note(&self, id: i64) -> Result<Option<Note>, StoreError>;
}
