use axum::{
    extract::{Path, State},
    Json,
};
use tracing::instrument;

use crate::{error::ApiError, state::AppState, store::Note};

use super::dto::CreateNote;

#[instrument(skip(state, payload))]
pub async fn create_note(
    State(state): State<AppState>,
    Json(payload): Json<CreateNote>,
) -> Result<Json<Note>, ApiError> {
    let note = state
        .notes
        .insert_note(&payload.title, &payload.body)
        .await
        .map_err(anyhow::Error::from)?;
    Ok(Json(note))
}

#[instrument(skip(state))]
pub async fn list_notes(State(state): State<AppState>) -> Result<Json<Vec<Note>>, ApiError> {
    let notes = state.notes.list_notes().await.map_err(anyhow::Error::from)?;
    Ok(Json(notes))
}

#[instrument(skip(state))]
pub async fn get_note(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Note>, ApiError> {
    let note = state
        .notes
        .get_note(id)
        .await
        .map_err(anyhow::Error::from)?
        .ok_or_else(|| ApiError::not_found("Note not found"))?;
    Ok(Json(note))
}
