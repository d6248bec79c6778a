//! JSON API over the note store.

use super::{
    db_ops,
    errors::{NoteError, ServerError},
    extractors::ApiJson,
    models::{AppState, CreateNote, Note, UpdateNote},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

pub async fn pong() -> impl IntoResponse {
    "pong"
}

/// Ids arrive as raw path segments so that a malformed id is reported as a
/// validation error in our own error format.
pub fn parse_id(raw: &str) -> Result<i64, NoteError> {
    raw.trim()
        .parse()
        .map_err(|_| NoteError::InvalidId(raw.to_string()))
}

pub async fn list_notes(
    State(AppState { db }): State<AppState>,
) -> Result<Json<Vec<Note>>, ServerError> {
    Ok(Json(db_ops::list_active(&db).await?))
}

pub async fn list_archived_notes(
    State(AppState { db }): State<AppState>,
) -> Result<Json<Vec<Note>>, ServerError> {
    Ok(Json(db_ops::list_archived(&db).await?))
}

pub async fn create_note(
    State(AppState { db }): State<AppState>,
    ApiJson(request): ApiJson<CreateNote>,
) -> Result<impl IntoResponse, ServerError> {
    let new_note = request.validate()?;
    let note = db_ops::create_note(&db, new_note).await?;

    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn update_note(
    State(AppState { db }): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<UpdateNote>,
) -> Result<Json<Note>, ServerError> {
    let id = parse_id(&id)?;
    let patch = patch.validate()?;

    Ok(Json(db_ops::update_note(&db, id, &patch).await?))
}

pub async fn delete_note(
    State(AppState { db }): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    let id = parse_id(&id)?;
    db_ops::delete_note(&db, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
