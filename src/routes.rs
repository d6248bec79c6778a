use super::{controllers, middleware, models, views};
use axum::{
    middleware::from_fn,
    routing::{get, post, put, Router},
};
use tower_http::trace::TraceLayer;

/// JSON API.
#[rustfmt::skip]
fn api_routes() -> Router<models::AppState> {
    Router::new()
        .route("/notes", get(controllers::list_notes).post(controllers::create_note))
        .route("/notes/archived", get(controllers::list_archived_notes))
        .route("/notes/:id", put(controllers::update_note).delete(controllers::delete_note))
}

/// Pages and htmx fragments.
#[rustfmt::skip]
fn ui_routes() -> Router<models::AppState> {
    Router::new()
        .route("/", get(views::home))
        .route("/archive", get(views::archive))
        .route("/ui/notes", get(views::note_grid).post(views::create_note))
        .route("/ui/archived", get(views::archived_grid))
        .route("/ui/create-form", get(views::create_form))
        .route("/ui/create-form/close", post(views::close_create_form))
        .route("/ui/notes/:id", post(views::save_edit).delete(views::delete_note))
        .route("/ui/notes/:id/edit", get(views::edit_dialog))
        .route("/ui/notes/:id/pin", post(views::toggle_pin))
        .route("/ui/notes/:id/archive", post(views::archive_note))
        .route("/ui/notes/:id/unarchive", post(views::unarchive_note))
        .route("/ui/notes/:id/items/toggle", post(views::toggle_item))
        .layer(from_fn(middleware::html_headers))
}

pub fn app(state: models::AppState) -> Router {
    Router::new()
        .merge(api_routes())
        .merge(ui_routes())
        .route("/ping", get(controllers::pong))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
