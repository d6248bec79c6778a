use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NoteError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid note ID")]
    InvalidId(String),

    #[error("Note not found")]
    NotFound(i64),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("checklist encoding error: {0}")]
    Checklist(#[from] serde_json::Error),

    #[error("stored timestamp {0} is out of range")]
    Timestamp(i64),
}

pub type Result<T> = std::result::Result<T, NoteError>;

#[derive(Debug)]
pub struct ServerError(pub NoteError);

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            NoteError::Validation(_) | NoteError::InvalidId(_) => {
                StatusCode::BAD_REQUEST
            }
            NoteError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = ?self.0, "request failed");
            "Something went wrong".to_string()
        } else {
            tracing::debug!(error = %self.0, %status, "request rejected");
            self.0.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

// Anything that converts into a `NoteError` converts into a `ServerError`,
// so handlers can use `?` on db_ops and validation results directly.
impl<E> From<E> for ServerError
where
    E: Into<NoteError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
