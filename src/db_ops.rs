use super::{
    errors::{NoteError, Result},
    models::{ChecklistItem, Color, NewNote, Note, NoteBody, UpdateNote},
};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::{
    query, query_as,
    sqlite::{
        SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions,
    },
    QueryBuilder, Sqlite,
};
use std::path::Path;

/// Statements are run one at a time by `migrate`; all of them are
/// idempotent.
const MIGRATIONS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS notes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        content TEXT,
        color TEXT NOT NULL DEFAULT 'yellow',
        pinned BOOLEAN NOT NULL DEFAULT 0,
        archived BOOLEAN NOT NULL DEFAULT 0,
        is_checklist BOOLEAN NOT NULL DEFAULT 0,
        checklist_items TEXT,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_notes_listing
        ON notes(archived, pinned, created_at)",
];

const COLUMNS: &str = "id, title, content, color, pinned, archived, \
    is_checklist, checklist_items, created_at, updated_at";

pub async fn connect(path: &Path) -> anyhow::Result<SqlitePool> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    Ok(SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?)
}

pub async fn migrate(db: &SqlitePool) -> Result<()> {
    for statement in MIGRATIONS {
        query(*statement).execute(db).await?;
    }
    Ok(())
}

/// Read access shared by every persisted model. `get` distinguishes "no such
/// row" (`Ok(None)`) from a failed query.
#[async_trait]
pub trait DbModel<GetQuery, ListQuery>: Sized {
    async fn get(db: &SqlitePool, query: &GetQuery) -> Result<Option<Self>>;
    async fn list(db: &SqlitePool, query: &ListQuery) -> Result<Vec<Self>>;
}

pub struct GetNoteQuery {
    pub id: i64,
}

pub struct ListNoteQuery {
    pub archived: bool,
}

#[derive(sqlx::FromRow)]
struct NoteRow {
    id: i64,
    title: String,
    content: Option<String>,
    color: String,
    pinned: bool,
    archived: bool,
    is_checklist: bool,
    checklist_items: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<NoteRow> for Note {
    type Error = NoteError;

    fn try_from(row: NoteRow) -> Result<Self> {
        let body = if row.is_checklist {
            let items: Vec<ChecklistItem> = match row.checklist_items.as_deref()
            {
                Some(raw) if !raw.trim().is_empty() => serde_json::from_str(raw)?,
                _ => vec![],
            };
            NoteBody::Checklist {
                items,
                content: row.content,
            }
        } else {
            NoteBody::Text {
                content: row.content,
            }
        };

        Ok(Note {
            id: row.id,
            title: row.title,
            color: Color::parse_lenient(&row.color),
            pinned: row.pinned,
            archived: row.archived,
            body,
            created_at: from_millis(row.created_at)?,
            updated_at: from_millis(row.updated_at)?,
        })
    }
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or(NoteError::Timestamp(ms))
}

#[async_trait]
impl DbModel<GetNoteQuery, ListNoteQuery> for Note {
    async fn get(db: &SqlitePool, query: &GetNoteQuery) -> Result<Option<Self>> {
        let row = query_as::<_, NoteRow>(&format!(
            "select {COLUMNS} from notes where id = ?"
        ))
        .bind(query.id)
        .fetch_optional(db)
        .await?;

        row.map(Note::try_from).transpose()
    }

    /// Active notes come back pinned-first then newest-first, which is
    /// `models::display_order` in SQL. Archived notes are newest-first.
    async fn list(db: &SqlitePool, query: &ListNoteQuery) -> Result<Vec<Self>> {
        let order = if query.archived {
            "created_at desc, id desc"
        } else {
            "pinned desc, created_at desc, id desc"
        };
        let rows = query_as::<_, NoteRow>(&format!(
            "select {COLUMNS} from notes where archived = ? order by {order}"
        ))
        .bind(query.archived)
        .fetch_all(db)
        .await?;

        rows.into_iter().map(Note::try_from).collect()
    }
}

pub async fn list_active(db: &SqlitePool) -> Result<Vec<Note>> {
    Note::list(db, &ListNoteQuery { archived: false }).await
}

pub async fn list_archived(db: &SqlitePool) -> Result<Vec<Note>> {
    Note::list(db, &ListNoteQuery { archived: true }).await
}

pub async fn get_note(db: &SqlitePool, id: i64) -> Result<Note> {
    Note::get(db, &GetNoteQuery { id })
        .await?
        .ok_or(NoteError::NotFound(id))
}

pub async fn create_note(db: &SqlitePool, note: NewNote) -> Result<Note> {
    let now = Utc::now().timestamp_millis();
    let (is_checklist, content, checklist_items) = match &note.body {
        NoteBody::Text { content } => (false, content.clone(), None),
        NoteBody::Checklist { items, content } => {
            (true, content.clone(), Some(serde_json::to_string(items)?))
        }
    };

    let row = query_as::<_, NoteRow>(&format!(
        "insert into notes
            (title, content, color, pinned, archived, is_checklist,
             checklist_items, created_at, updated_at)
        values (?, ?, ?, ?, ?, ?, ?, ?, ?)
        returning {COLUMNS}"
    ))
    .bind(note.title.as_str())
    .bind(content)
    .bind(note.color.as_str())
    .bind(note.pinned)
    .bind(note.archived)
    .bind(is_checklist)
    .bind(checklist_items)
    .bind(now)
    .bind(now)
    .fetch_one(db)
    .await?;

    let created = Note::try_from(row)?;
    tracing::debug!(id = created.id, checklist = is_checklist, "created note");
    Ok(created)
}

/// Apply only the fields present in `patch`. `updated_at` always moves
/// forward, even when two writes land in the same millisecond.
pub async fn update_note(
    db: &SqlitePool,
    id: i64,
    patch: &UpdateNote,
) -> Result<Note> {
    let now = Utc::now().timestamp_millis();
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new("update notes set updated_at = max(");
    qb.push_bind(now).push(", updated_at + 1)");

    if let Some(title) = &patch.title {
        qb.push(", title = ").push_bind(title.clone());
    }
    if let Some(content) = &patch.content {
        qb.push(", content = ").push_bind(content.clone());
    }
    if let Some(color) = patch.color {
        qb.push(", color = ").push_bind(color.as_str());
    }
    if let Some(pinned) = patch.pinned {
        qb.push(", pinned = ").push_bind(pinned);
    }
    if let Some(archived) = patch.archived {
        qb.push(", archived = ").push_bind(archived);
    }
    if let Some(items) = &patch.checklist_items {
        qb.push(", checklist_items = ")
            .push_bind(serde_json::to_string(items)?);
    }
    qb.push(" where id = ").push_bind(id);
    qb.push(format!(" returning {COLUMNS}"));

    let row = qb
        .build_query_as::<NoteRow>()
        .fetch_optional(db)
        .await?
        .ok_or(NoteError::NotFound(id))?;

    tracing::debug!(id, "updated note");
    Note::try_from(row)
}

/// Returns whether a row was removed. Deleting a missing note is not an
/// error.
pub async fn delete_note(db: &SqlitePool, id: i64) -> Result<bool> {
    let result = query("delete from notes where id = ?")
        .bind(id)
        .execute(db)
        .await?;
    let removed = result.rows_affected() > 0;
    tracing::debug!(id, removed, "deleted note");
    Ok(removed)
}

#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    use std::str::FromStr;

    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("in-memory url parses");
    // A single, never-recycled connection: every connection to :memory: is
    // its own database.
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("in-memory pool");
    migrate(&db).await.expect("migrations run");
    db
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateNote;

    async fn create(db: &SqlitePool, req: CreateNote) -> Note {
        create_note(db, req.validate().expect("valid")).await.expect("created")
    }

    fn item(id: &str, text: &str, checked: bool) -> ChecklistItem {
        ChecklistItem {
            id: id.into(),
            text: text.into(),
            checked,
        }
    }

    #[tokio::test]
    async fn test_create_applies_defaults_and_round_trips_text() {
        let db = test_pool().await;
        let content = "line one\n  line two with   spaces\t\n";
        let note = create(&db, CreateNote::text("Hello", content)).await;

        assert!(note.id > 0);
        assert_eq!(note.color, Color::Yellow);
        assert!(!note.pinned && !note.archived);
        assert_eq!(note.content(), Some(content));
        assert_eq!(note.created_at, note.updated_at);

        let fetched = get_note(&db, note.id).await.unwrap();
        assert_eq!(fetched, note);
    }

    #[tokio::test]
    async fn test_checklist_round_trips() {
        let db = test_pool().await;
        let items = vec![item("a", "milk", false), item("b", "eggs", true)];
        let note = create(&db, CreateNote::checklist("Shop", items.clone())).await;

        assert!(note.is_checklist());
        assert_eq!(note.checklist_items(), Some(items.as_slice()));
        assert_eq!(note.content(), None);

        let listed = list_active(&db).await.unwrap();
        assert_eq!(listed[0].checklist_items(), Some(items.as_slice()));
    }

    #[tokio::test]
    async fn test_checklist_keeps_its_content() {
        let db = test_pool().await;
        let note = create(
            &db,
            CreateNote {
                content: Some("passport".into()),
                ..CreateNote::checklist("Trip", vec![])
            },
        )
        .await;
        assert_eq!(note.content(), Some("passport"));

        let patch = UpdateNote {
            content: Some(Some("passport and tickets".into())),
            ..Default::default()
        };
        let updated = update_note(&db, note.id, &patch).await.unwrap();
        assert!(updated.is_checklist());
        assert_eq!(updated.content(), Some("passport and tickets"));
        assert_eq!(
            get_note(&db, note.id).await.unwrap().content(),
            Some("passport and tickets")
        );
    }

    #[tokio::test]
    async fn test_lists_partition_on_archived() {
        let db = test_pool().await;
        let active = create(&db, CreateNote::text("active", "")).await;
        let archived = create(
            &db,
            CreateNote {
                archived: Some(true),
                ..CreateNote::text("archived", "")
            },
        )
        .await;

        let active_ids: Vec<i64> =
            list_active(&db).await.unwrap().iter().map(|n| n.id).collect();
        let archived_ids: Vec<i64> =
            list_archived(&db).await.unwrap().iter().map(|n| n.id).collect();
        assert_eq!(active_ids, vec![active.id]);
        assert_eq!(archived_ids, vec![archived.id]);

        update_note(&db, active.id, &UpdateNote::archived(true))
            .await
            .unwrap();
        assert!(list_active(&db).await.unwrap().is_empty());
        assert_eq!(list_archived(&db).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_active_order_pinned_then_newest() {
        let db = test_pool().await;
        let pinned_old = create(
            &db,
            CreateNote {
                pinned: Some(true),
                ..CreateNote::text("pinned old", "")
            },
        )
        .await;
        let first = create(&db, CreateNote::text("first", "")).await;
        let second = create(&db, CreateNote::text("second", "")).await;

        let ids: Vec<i64> =
            list_active(&db).await.unwrap().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![pinned_old.id, second.id, first.id]);

        // and the comparator agrees with the query
        let mut sorted = list_active(&db).await.unwrap();
        sorted.reverse();
        sorted.sort_by(crate::models::display_order);
        let sorted_ids: Vec<i64> = sorted.iter().map(|n| n.id).collect();
        assert_eq!(sorted_ids, ids);
    }

    #[tokio::test]
    async fn test_partial_update_only_touches_supplied_fields() {
        let db = test_pool().await;
        let note = create(&db, CreateNote::text("Title", "Body")).await;

        let patch = UpdateNote {
            color: Some(Color::Green),
            ..Default::default()
        };
        let updated = update_note(&db, note.id, &patch).await.unwrap();

        assert_eq!(updated.color, Color::Green);
        assert_eq!(updated.title, note.title);
        assert_eq!(updated.content(), note.content());
        assert_eq!(updated.pinned, note.pinned);
        assert_eq!(updated.created_at, note.created_at);
        assert!(updated.updated_at > note.updated_at);

        // an empty patch still bumps updated_at
        let again = update_note(&db, note.id, &UpdateNote::default())
            .await
            .unwrap();
        assert!(again.updated_at > updated.updated_at);
    }

    #[tokio::test]
    async fn test_update_can_clear_content() {
        let db = test_pool().await;
        let note = create(&db, CreateNote::text("Title", "Body")).await;
        let patch = UpdateNote {
            content: Some(None),
            ..Default::default()
        };
        let updated = update_note(&db, note.id, &patch).await.unwrap();
        assert_eq!(updated.content(), None);
    }

    #[tokio::test]
    async fn test_update_checklist_items() {
        let db = test_pool().await;
        let note = create(
            &db,
            CreateNote::checklist("List", vec![item("a", "one", false)]),
        )
        .await;
        let toggled = note.toggled_item("a").unwrap();
        let updated = update_note(
            &db,
            note.id,
            &UpdateNote::checklist_items(toggled.clone()),
        )
        .await
        .unwrap();
        assert_eq!(updated.checklist_items(), Some(toggled.as_slice()));
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let db = test_pool().await;
        let result = update_note(&db, 404, &UpdateNote::pinned(true)).await;
        assert!(matches!(result, Err(NoteError::NotFound(404))));
        assert!(matches!(
            get_note(&db, 404).await,
            Err(NoteError::NotFound(404))
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_from_both_lists() {
        let db = test_pool().await;
        let active = create(&db, CreateNote::text("a", "")).await;
        let archived = create(
            &db,
            CreateNote {
                archived: Some(true),
                ..CreateNote::text("b", "")
            },
        )
        .await;

        assert!(delete_note(&db, active.id).await.unwrap());
        assert!(delete_note(&db, archived.id).await.unwrap());
        assert!(!delete_note(&db, archived.id).await.unwrap());

        let all: Vec<Note> = [
            list_active(&db).await.unwrap(),
            list_archived(&db).await.unwrap(),
        ]
        .concat();
        assert!(all.iter().all(|n| n.id != active.id && n.id != archived.id));
    }

    #[tokio::test]
    async fn test_unknown_color_in_storage_reads_as_default() {
        let db = test_pool().await;
        let note = create(&db, CreateNote::text("c", "")).await;
        query("update notes set color = 'ultraviolet' where id = ?")
            .bind(note.id)
            .execute(&db)
            .await
            .unwrap();
        assert_eq!(get_note(&db, note.id).await.unwrap().color, Color::Yellow);
    }

    #[tokio::test]
    async fn test_connect_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("notes.db");
        let db = connect(&path).await.unwrap();
        migrate(&db).await.unwrap();
        create(&db, CreateNote::text("persisted", "")).await;
        assert!(path.exists());
        assert_eq!(list_active(&db).await.unwrap().len(), 1);
    }
}
