use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::instrument;

use crate::{error::ApiError, state::AppState, store::Todo};

use super::dto::{CreateTodo, UpdateTodo};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/todos", get(list_todos))
        .route("/todos/:id", get(get_todo))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/todos", post(create_todo))
        .route("/todos/:id", patch(update_todo).delete(delete_todo))
}

fn check_title(title: &str) -> Result<(), ApiError> {
    if title.is_empty() || title.chars().count() > 200 {
        return Err(ApiError::validation(
            "title must be between 1 and 200 characters",
        ));
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn create_todo(
    State(state): State<AppState>,
    Json(payload): Json<CreateTodo>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    check_title(&payload.title)?;
    let todo = state
        .todos
        .insert_todo(&payload.title, payload.done)
        .await
        .map_err(anyhow::Error::from)?;
    Ok((StatusCode::CREATED, Json(todo)))
}

#[instrument(skip(state))]
pub async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = state.todos.list_todos().await.map_err(anyhow::Error::from)?;
    Ok(Json(todos))
}

#[instrument(skip(state))]
pub async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Todo>, ApiError> {
    let todo = state
        .todos
        .get_todo(id)
        .await
        .map_err(anyhow::Error::from)?
        .ok_or_else(|| ApiError::not_found("Todo not found"))?;
    Ok(Json(todo))
}

#[instrument(skip(state, payload))]
pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTodo>,
) -> Result<Json<Todo>, ApiError> {
    if let Some(title) = payload.title.as_deref() {
        check_title(title)?;
    }
    let todo = state
        .todos
        .update_todo(id, payload.title.as_deref(), payload.done)
        .await
        .map_err(anyhow::Error::from)?
        .ok_or_else(|| ApiError::not_found("Todo not found"))?;
    Ok(Json(todo))
}

#[instrument(skip(state))]
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = state
        .todos
        .delete_todo(id)
        .await
        .map_err(anyhow::Error::from)?;
    if !deleted {
        return Err(ApiError::not_found("Todo not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
