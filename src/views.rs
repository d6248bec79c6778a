//! HTML views. Every mutation answers with an `Hx-Trigger: reload-notes`
//! header and lets the grids refetch themselves.

use super::{
    components::{
        ArchivePage, ArchivedGrid, Component, CreateNoteForm, EditNoteDialog,
        Home, NoteGrid, Page,
    },
    controllers::parse_id,
    db_ops,
    errors::{NoteError, ServerError},
    htmx,
    models::{AppState, ChecklistItem, Color, CreateNote, Note, NoteBody, UpdateNote},
};
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::IntoResponse,
    Form,
};
use serde::Deserialize;

fn page_or_fragment(
    headers: &HeaderMap,
    title: &str,
    body: impl Component + 'static,
) -> String {
    if htmx::is_htmx_request(headers) {
        body.render()
    } else {
        Page {
            title: title.to_string(),
            children: Box::new(body),
        }
        .render()
    }
}

fn reload() -> (HeaderMap, &'static str) {
    (htmx::trigger(htmx::RELOAD_NOTES), "")
}

pub async fn home(headers: HeaderMap) -> impl IntoResponse {
    page_or_fragment(&headers, "Notes", Home)
}

pub async fn archive(headers: HeaderMap) -> impl IntoResponse {
    page_or_fragment(&headers, "Archive", ArchivePage)
}

#[derive(Deserialize)]
pub struct SearchParams {
    q: Option<String>,
}
pub async fn note_grid(
    State(AppState { db }): State<AppState>,
    Query(SearchParams { q }): Query<SearchParams>,
) -> Result<impl IntoResponse, ServerError> {
    let query = q.unwrap_or_default();
    let notes: Vec<Note> = db_ops::list_active(&db)
        .await?
        .into_iter()
        .filter(|n| n.matches_search(&query))
        .collect();

    Ok(NoteGrid {
        notes: &notes,
        query: &query,
    }
    .render())
}

pub async fn archived_grid(
    State(AppState { db }): State<AppState>,
) -> Result<impl IntoResponse, ServerError> {
    let notes = db_ops::list_archived(&db).await?;

    Ok(ArchivedGrid { notes: &notes }.render())
}

#[derive(Deserialize)]
pub struct CreateFormParams {
    expanded: Option<bool>,
}
pub async fn create_form(
    Query(CreateFormParams { expanded }): Query<CreateFormParams>,
) -> impl IntoResponse {
    CreateNoteForm {
        expanded: expanded.unwrap_or(false),
        ..Default::default()
    }
    .render()
}

/// Shared by the create form and the edit dialog. For checklists, `content`
/// holds one item per line.
#[derive(Debug, Deserialize)]
pub struct NoteForm {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    color: Option<String>,
    checklist: Option<String>,
}

/// Close only folds the form up when nothing has been typed; a draft stays
/// open.
pub async fn close_create_form(Form(form): Form<NoteForm>) -> impl IntoResponse {
    let title = form.title.trim();
    let content = form.content.trim();
    if title.is_empty() && content.is_empty() {
        return CreateNoteForm::collapsed().render();
    }
    CreateNoteForm {
        expanded: true,
        title,
        content,
        color: Color::parse_lenient(form.color.as_deref().unwrap_or("")),
        checklist: form.checklist.is_some(),
        error: None,
    }
    .render()
}

pub async fn create_note(
    State(AppState { db }): State<AppState>,
    Form(form): Form<NoteForm>,
) -> Result<impl IntoResponse, ServerError> {
    let title = form.title.trim();
    let content = form.content.trim();
    let color = Color::parse_lenient(form.color.as_deref().unwrap_or(""));
    let checklist = form.checklist.is_some();

    // An untouched form just folds back up.
    if title.is_empty() && content.is_empty() {
        return Ok((HeaderMap::new(), CreateNoteForm::collapsed().render()));
    }

    let request = if checklist {
        CreateNote::checklist(title, ChecklistItem::from_lines(content, &[]))
    } else {
        CreateNote::text(title, content)
    };
    let request = CreateNote {
        color: Some(color),
        ..request
    };

    match request.validate() {
        Ok(new_note) => {
            db_ops::create_note(&db, new_note).await?;
            Ok((
                htmx::trigger(htmx::RELOAD_NOTES),
                CreateNoteForm::collapsed().render(),
            ))
        }
        Err(NoteError::Validation(msg)) => Ok((
            HeaderMap::new(),
            CreateNoteForm {
                expanded: true,
                title,
                content,
                color,
                checklist,
                error: Some(&msg),
            }
            .render(),
        )),
        Err(e) => Err(e.into()),
    }
}

pub async fn edit_dialog(
    State(AppState { db }): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let note = db_ops::get_note(&db, parse_id(&id)?).await?;

    Ok(EditNoteDialog {
        note: &note,
        error: None,
    }
    .render())
}

pub async fn save_edit(
    State(AppState { db }): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<NoteForm>,
) -> Result<impl IntoResponse, ServerError> {
    let mut note = db_ops::get_note(&db, parse_id(&id)?).await?;
    let content = form.content.trim();
    let color = Color::parse_lenient(form.color.as_deref().unwrap_or(""));

    let body = match note.checklist_items() {
        Some(existing) => NoteBody::Checklist {
            items: ChecklistItem::from_lines(content, existing),
            content: note.content().map(String::from),
        },
        None => NoteBody::Text {
            content: (!content.is_empty()).then(|| content.to_string()),
        },
    };
    let patch = match &body {
        NoteBody::Checklist { items, .. } => UpdateNote {
            checklist_items: Some(items.clone()),
            ..Default::default()
        },
        NoteBody::Text { content } => UpdateNote {
            content: Some(content.clone()),
            ..Default::default()
        },
    };
    let patch = UpdateNote {
        title: Some(form.title.clone()),
        color: Some(color),
        ..patch
    };

    match patch.validate() {
        Ok(patch) => {
            db_ops::update_note(&db, note.id, &patch).await?;
            Ok(reload().into_response())
        }
        Err(NoteError::Validation(msg)) => {
            // Re-show what was typed alongside the error.
            note.title = form.title.clone();
            note.color = color;
            note.body = body;
            Ok(EditNoteDialog {
                note: &note,
                error: Some(&msg),
            }
            .render()
            .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn toggle_pin(
    State(AppState { db }): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let note = db_ops::get_note(&db, parse_id(&id)?).await?;
    db_ops::update_note(&db, note.id, &UpdateNote::pinned(!note.pinned))
        .await?;

    Ok(reload())
}

pub async fn archive_note(
    State(AppState { db }): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    db_ops::update_note(&db, parse_id(&id)?, &UpdateNote::archived(true))
        .await?;

    Ok(reload())
}

pub async fn unarchive_note(
    State(AppState { db }): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    db_ops::update_note(&db, parse_id(&id)?, &UpdateNote::archived(false))
        .await?;

    Ok(reload())
}

pub async fn delete_note(
    State(AppState { db }): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    db_ops::delete_note(&db, parse_id(&id)?).await?;

    Ok(reload())
}

#[derive(Deserialize)]
pub struct ToggleItemForm {
    item: String,
}
pub async fn toggle_item(
    State(AppState { db }): State<AppState>,
    Path(id): Path<String>,
    Form(ToggleItemForm { item }): Form<ToggleItemForm>,
) -> Result<impl IntoResponse, ServerError> {
    let note = db_ops::get_note(&db, parse_id(&id)?).await?;
    let items = note.toggled_item(&item).ok_or_else(|| {
        NoteError::Validation(format!("No checklist item {item}"))
    })?;
    db_ops::update_note(&db, note.id, &UpdateNote::checklist_items(items))
        .await?;

    Ok(reload())
}

#[cfg(test)]
mod tests {
    use crate::{
        db_ops,
        models::{AppState, ChecklistItem, CreateNote},
        routes,
    };
    use ammonia::clean_text;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
        Router,
    };
    use sqlx::SqlitePool;
    use tower::ServiceExt;

    struct Reply {
        status: StatusCode,
        trigger: Option<String>,
        content_type: Option<String>,
        body: String,
    }

    async fn app() -> (Router, SqlitePool) {
        let db = db_ops::test_pool().await;
        (routes::app(AppState { db: db.clone() }), db)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        form: Option<&str>,
    ) -> Reply {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Hx-Request", "true");
        let request = match form {
            Some(form) => builder
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request builds");
        let response = app.clone().oneshot(request).await.expect("response");
        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        };
        let trigger = header("hx-trigger");
        let content_type = header("content-type");
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body())
            .await
            .expect("body");
        Reply {
            status,
            trigger,
            content_type,
            body: String::from_utf8(bytes.to_vec()).expect("utf8"),
        }
    }

    async fn seed(db: &SqlitePool, req: CreateNote) -> i64 {
        db_ops::create_note(db, req.validate().unwrap())
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_full_page_vs_fragment() {
        let (app, _) = app().await;
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let page = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(page.contains("<html>"));
        assert!(page.contains("Take a note..."));

        let fragment = send(&app, Method::GET, "/", None).await;
        assert!(!fragment.body.contains("<html>"));
        assert_eq!(
            fragment.content_type.as_deref(),
            Some("text/html; charset=utf-8")
        );
    }

    #[tokio::test]
    async fn test_create_from_form() {
        let (app, db) = app().await;
        let reply = send(
            &app,
            Method::POST,
            "/ui/notes",
            Some("title=Groceries&content=milk%0Aeggs&color=blue&checklist=on"),
        )
        .await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.trigger.as_deref(), Some("reload-notes"));
        assert!(reply.body.contains("Take a note..."));

        let notes = db_ops::list_active(&db).await.unwrap();
        assert_eq!(notes.len(), 1);
        let items: Vec<&str> = notes[0]
            .checklist_items()
            .unwrap()
            .iter()
            .map(|i| i.text.as_str())
            .collect();
        assert_eq!(items, vec!["milk", "eggs"]);
        assert_eq!(notes[0].color.as_str(), "blue");
    }

    #[tokio::test]
    async fn test_blank_form_collapses_and_missing_title_errors() {
        let (app, db) = app().await;
        let reply =
            send(&app, Method::POST, "/ui/notes", Some("title=+&content=")).await;
        assert!(reply.trigger.is_none());
        assert!(reply.body.contains("Take a note..."));

        let reply = send(
            &app,
            Method::POST,
            "/ui/notes",
            Some("title=&content=just+a+body"),
        )
        .await;
        assert!(reply.trigger.is_none());
        assert!(reply.body.contains(&clean_text("Title is required")));
        assert!(reply.body.contains(&clean_text("just a body")));
        assert!(db_ops::list_active(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_close_keeps_a_draft_open() {
        let (app, db) = app().await;
        let reply = send(
            &app,
            Method::POST,
            "/ui/create-form/close",
            Some("title=&content=+&color=blue"),
        )
        .await;
        assert_eq!(reply.status, StatusCode::OK);
        assert!(!reply.body.contains("<form"));
        assert!(reply.body.contains("Take a note..."));

        let reply = send(
            &app,
            Method::POST,
            "/ui/create-form/close",
            Some("title=Half&content=written&color=blue"),
        )
        .await;
        assert!(reply.body.contains("<form"));
        assert!(reply.body.contains(r#"value="Half""#));
        assert!(reply.body.contains(">written</textarea>"));
        assert!(reply.body.contains(r#"value="blue" class="sr-only peer" checked"#));
        assert!(reply.trigger.is_none());
        assert!(db_ops::list_active(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_reaches_checklist_content() {
        let (app, db) = app().await;
        seed(
            &db,
            CreateNote {
                content: Some("passport".into()),
                ..CreateNote::checklist("Trip", vec![])
            },
        )
        .await;
        seed(
            &db,
            CreateNote::checklist(
                "Groceries",
                vec![ChecklistItem::new("passport photos")],
            ),
        )
        .await;

        let reply = send(&app, Method::GET, "/ui/notes?q=passport", None).await;
        assert!(reply.body.contains("Trip"));
        assert!(!reply.body.contains("Groceries"));
    }

    #[tokio::test]
    async fn test_grid_search_filters() {
        let (app, db) = app().await;
        seed(&db, CreateNote::text("Shopping", "oat milk")).await;
        seed(&db, CreateNote::text("Ideas", "a novel")).await;

        let reply = send(&app, Method::GET, "/ui/notes?q=MILK", None).await;
        assert!(reply.body.contains("Shopping"));
        assert!(!reply.body.contains("Ideas"));

        let reply = send(&app, Method::GET, "/ui/notes?q=", None).await;
        assert!(reply.body.contains("Shopping") && reply.body.contains("Ideas"));

        let reply = send(&app, Method::GET, "/ui/notes?q=zebra", None).await;
        assert!(reply.body.contains("No matching notes"));
    }

    #[tokio::test]
    async fn test_pin_archive_unarchive_delete() {
        let (app, db) = app().await;
        let id = seed(&db, CreateNote::text("Cycle", "")).await;

        let reply =
            send(&app, Method::POST, &format!("/ui/notes/{id}/pin"), None).await;
        assert_eq!(reply.trigger.as_deref(), Some("reload-notes"));
        assert!(db_ops::get_note(&db, id).await.unwrap().pinned);
        send(&app, Method::POST, &format!("/ui/notes/{id}/pin"), None).await;
        assert!(!db_ops::get_note(&db, id).await.unwrap().pinned);

        send(&app, Method::POST, &format!("/ui/notes/{id}/archive"), None).await;
        let reply = send(&app, Method::GET, "/ui/archived", None).await;
        assert!(reply.body.contains("Cycle"));
        assert!(reply.body.contains(&format!("/ui/notes/{id}/unarchive")));
        let reply = send(&app, Method::GET, "/ui/notes", None).await;
        assert!(reply.body.contains("No notes yet"));

        send(&app, Method::POST, &format!("/ui/notes/{id}/unarchive"), None)
            .await;
        assert!(!db_ops::get_note(&db, id).await.unwrap().archived);

        let reply =
            send(&app, Method::DELETE, &format!("/ui/notes/{id}"), None).await;
        assert_eq!(reply.trigger.as_deref(), Some("reload-notes"));
        assert!(db_ops::get_note(&db, id).await.is_err());
    }

    #[tokio::test]
    async fn test_edit_dialog_and_save() {
        let (app, db) = app().await;
        let id = seed(&db, CreateNote::text("Draft", "first")).await;

        let reply =
            send(&app, Method::GET, &format!("/ui/notes/{id}/edit"), None).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.body.contains("Draft"));

        let reply = send(
            &app,
            Method::POST,
            &format!("/ui/notes/{id}"),
            Some("title=Final&content=second&color=purple"),
        )
        .await;
        assert_eq!(reply.trigger.as_deref(), Some("reload-notes"));
        assert!(reply.body.is_empty());

        let note = db_ops::get_note(&db, id).await.unwrap();
        assert_eq!(note.title, "Final");
        assert_eq!(note.content(), Some("second"));
        assert_eq!(note.color.as_str(), "purple");

        let reply = send(
            &app,
            Method::POST,
            &format!("/ui/notes/{id}"),
            Some("title=&content=third"),
        )
        .await;
        assert!(reply.trigger.is_none());
        assert!(reply.body.contains(&clean_text("Title is required")));
        assert_eq!(db_ops::get_note(&db, id).await.unwrap().title, "Final");

        let reply =
            send(&app, Method::GET, "/ui/notes/12345/edit", None).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_toggle_checklist_item() {
        let (app, db) = app().await;
        let item = ChecklistItem::new("socks");
        let id =
            seed(&db, CreateNote::checklist("Packing", vec![item.clone()])).await;

        let reply = send(
            &app,
            Method::POST,
            &format!("/ui/notes/{id}/items/toggle"),
            Some(&format!("item={}", item.id)),
        )
        .await;
        assert_eq!(reply.trigger.as_deref(), Some("reload-notes"));
        let note = db_ops::get_note(&db, id).await.unwrap();
        assert!(note.checklist_items().unwrap()[0].checked);

        let reply = send(
            &app,
            Method::POST,
            &format!("/ui/notes/{id}/items/toggle"),
            Some("item=nope"),
        )
        .await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    }
}
