use std::sync::Mutex;

use async_trait::async_trait;

use super::{Note, NoteStore, StoreError, Todo, TodoStore, User, UserStore};

/// In-memory store used by the test suite and for running the service
/// without Postgres. Same uniqueness discipline as the real schema.
#[derive(Default)]
pub struct MemStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    next_user_id: i64,
    next_todo_id: i64,
    next_note_id: i64,
    users: Vec<User>,
    todos: Vec<Todo>,
    notes: Vec<Note>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("store mutex poisoned")
    }

    /// Flip a user's active flag, standing in for the administrative
    /// action that deactivates accounts in production.
    pub fn set_active(&self, id: i64, active: bool) {
        let mut inner = self.lock();
        if let Some(user) = inner.users.iter_mut().find(|u| u.id == id) {
            user.is_active = active;
        }
    }
}

#[async_trait]
impl UserStore for MemStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut inner = self.lock();
        if inner.users.iter().any(|u| u.email == email) {
            return Err(StoreError::Duplicate);
        }
        inner.next_user_id += 1;
        let user = User {
            id: inner.next_user_id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            is_active: true,
        };
        inner.users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl TodoStore for MemStore {
    async fn insert_todo(&self, title: &str, done: bool) -> Result<Todo, StoreError> {
        let mut inner = self.lock();
        inner.next_todo_id += 1;
        let todo = Todo {
            id: inner.next_todo_id,
            title: title.to_string(),
            done,
        };
        inner.todos.push(todo.clone());
        Ok(todo)
    }

    async fn list_todos(&self) -> Result<Vec<Todo>, StoreError> {
        Ok(self.lock().todos.clone())
    }

    async fn get_todo(&self, id: i64) -> Result<Option<Todo>, StoreError> {
        Ok(self.lock().todos.iter().find(|t| t.id == id).cloned())
    }

    async fn update_todo(
        &self,
        id: i64,
        title: Option<&str>,
        done: Option<bool>,
    ) -> Result<Option<Todo>, StoreError> {
        let mut inner = self.lock();
        let Some(todo) = inner.todos.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        if let Some(title) = title {
            todo.title = title.to_string();
        }
        if let Some(done) = done {
            todo.done = done;
        }
        Ok(Some(todo.clone()))
    }

    async fn delete_todo(&self, id: i64) -> Result<bool, StoreError> {
        let mut inner = self.lock();
        let before = inner.todos.len();
        inner.todos.retain(|t| t.id != id);
        Ok(inner.todos.len() < before)
    }
}

#[async_trait]
impl NoteStore for MemStore {
    async fn insert_note(&self, title: &str, body: &str) -> Result<Note, StoreError> {
        let mut inner = self.lock();
        inner.next_note_id += 1;
        let note = Note {
            id: inner.next_note_id,
            title: title.to_string(),
            body: body.to_string(),
        };
        inner.notes.push(note.clone());
        Ok(note)
    }

    async fn list_notes(&self) -> Result<Vec<Note>, StoreError> {
        Ok(self.lock().notes.clone())
    }

    async fn get_note(&self, id: i64) -> Result<Option<Note>, StoreError> {
        Ok(self.lock().notes.iter().find(|n| n.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_user_rejects_duplicate_email() {
        let store = MemStore::new();
        store.insert_user("a@x.com", "hash").await.expect("first insert");
        let err = store.insert_user("a@x.com", "hash2").await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate));
    }

    #[tokio::test]
    async fn email_lookup_is_case_sensitive() {
        let store = MemStore::new();
        store.insert_user("A@x.com", "hash").await.expect("insert");
        assert!(store.find_by_email("a@x.com").await.unwrap().is_none());
        assert!(store.find_by_email("A@x.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn todo_update_keeps_unset_fields() {
        let store = MemStore::new();
        let todo = store.insert_todo("write tests", false).await.unwrap();
        let updated = store
            .update_todo(todo.id, None, Some(true))
            .await
            .unwrap()
            .expect("todo exists");
        assert_eq!(updated.title, "write tests");
        assert!(updated.done);
    }

    #[tokio::test]
    async fn delete_reports_missing_rows() {
        let store = MemStore::new();
        let todo = store.insert_todo("x", false).await.unwrap();
        assert!(store.delete_todo(todo.id).await.unwrap());
        assert!(!store.delete_todo(todo.id).await.unwrap());
    }
}
